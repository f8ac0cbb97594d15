use super::json::{lenient_bool, lenient_string, lenient_u64};
use serde::Serialize;
use serde_json::Value;

/// One SIM slot, physical or embedded, as reported in `mbb.sim`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimSlot {
    /// Slot number as reported by the modem, not the position in the list.
    pub slot: Option<u64>,
    pub active: bool,
    pub esim: bool,
    /// Service provider name.
    pub spn: Option<String>,
    pub iccid: Option<String>,
    pub rxbytes: Option<u64>,
    pub txbytes: Option<u64>,
    pub data_limited: Option<bool>,
    pub apn: Option<String>,
    pub asn: Option<String>,
    pub display_state: Option<String>,
}

impl SimSlot {
    pub fn from_json(sim: &Value) -> Self {
        Self {
            slot: lenient_u64(sim.get("slot")),
            active: lenient_bool(sim.get("active")),
            esim: lenient_bool(sim.get("esim")),
            spn: lenient_string(sim.get("spn")),
            iccid: lenient_string(sim.get("iccid")),
            rxbytes: lenient_u64(sim.get("rxbytes")),
            txbytes: lenient_u64(sim.get("txbytes")),
            data_limited: sim.get("data_limited").and_then(Value::as_bool),
            apn: lenient_string(sim.pointer("/current_apn/apn")),
            asn: lenient_string(sim.get("asn")),
            display_state: lenient_string(sim.get("display_state")),
        }
    }

    /// Human readable slot name, e.g. `eSIM Slot 2`. Falls back to the list
    /// position when the modem does not report a slot number.
    pub fn label(&self, index: usize) -> String {
        let slot = self.slot.unwrap_or(index as u64 + 1);
        if self.esim {
            format!("eSIM Slot {slot}")
        } else {
            format!("SIM Slot {slot}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_projects_a_full_sim_record() {
        let sim = SimSlot::from_json(&json!({
            "slot": 1,
            "active": true,
            "esim": false,
            "spn": "T-Mobile",
            "iccid": "8901260000000000001",
            "rxbytes": "123456789",
            "txbytes": 98765,
            "data_limited": false,
            "current_apn": { "apn": "fast.t-mobile.com" },
            "asn": 21928,
            "display_state": "Active",
        }));

        assert_eq!(
            sim,
            SimSlot {
                slot: Some(1),
                active: true,
                esim: false,
                spn: Some("T-Mobile".into()),
                iccid: Some("8901260000000000001".into()),
                rxbytes: Some(123_456_789),
                txbytes: Some(98_765),
                data_limited: Some(false),
                apn: Some("fast.t-mobile.com".into()),
                asn: Some("21928".into()),
                display_state: Some("Active".into()),
            }
        );
    }

    #[test]
    fn it_tolerates_an_empty_sim_record() {
        assert_eq!(SimSlot::from_json(&json!({})), SimSlot::default());
        assert_eq!(
            SimSlot::from_json(&json!({ "current_apn": null })),
            SimSlot::default()
        );
    }

    #[test]
    fn it_labels_slots() {
        let physical = SimSlot {
            slot: Some(1),
            ..Default::default()
        };
        let embedded = SimSlot {
            slot: Some(2),
            esim: true,
            ..Default::default()
        };
        let unnumbered = SimSlot::default();

        assert_eq!(physical.label(0), "SIM Slot 1");
        assert_eq!(embedded.label(1), "eSIM Slot 2");
        assert_eq!(unnumbered.label(2), "SIM Slot 3");
    }
}
