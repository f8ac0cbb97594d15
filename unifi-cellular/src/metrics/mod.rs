//! Pure extraction of the published metrics from raw controller responses.

mod device;
mod json;
mod sim;
mod wan;

pub use device::{flatten_metrics, DeviceMetrics, DEFAULT_DEVICE_NAME};
pub use sim::SimSlot;
pub use wan::{detect_wan_interface, merge_wan_health, UplinkStats, WanHealth};

pub(crate) use wan::round_2dp;

use crate::{controller::Device, Error};
use serde::Serialize;
use serde_json::{Map, Value};

/// Returns the first cellular modem in the device list.
pub fn select_cellular_device(devices: &[Device]) -> Result<&Device, Error> {
    devices
        .iter()
        .find(|d| d.is_cellular())
        .ok_or(Error::DeviceNotFound)
}

/// Everything one poll cycle produced. Rebuilt from scratch on every poll and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    #[serde(flatten)]
    pub device: DeviceMetrics,
    #[serde(flatten)]
    pub wan: WanHealth,
}

impl Metrics {
    /// The published flat mapping from metric name to value.
    ///
    /// Every device key is always present (`null` when unknown), as is
    /// `wan_interface`. The `wan_*` statistics only appear when the associated
    /// uplink reported them. SIM slots appear as `sim_0`, `sim_1`, ...
    pub fn to_mapping(&self) -> serde_json::Result<Map<String, Value>> {
        let Value::Object(mut mapping) = serde_json::to_value(self)? else {
            return Err(serde::ser::Error::custom("metrics did not serialize to an object"));
        };

        for (index, sim) in self.device.sims.iter().enumerate() {
            mapping.insert(format!("sim_{index}"), serde_json::to_value(sim)?);
        }

        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_selects_the_cellular_device() {
        let devices = [
            Device::new(json!({ "type": "udm", "mac": "gw" })),
            Device::new(json!({ "type": "umbb", "mac": "modem" })),
            Device::new(json!({ "type": "uap", "mac": "ap" })),
        ];

        let device = select_cellular_device(&devices).unwrap();

        assert_eq!(device.mac(), Some("modem"));
    }

    #[test]
    fn it_fails_without_a_cellular_device() {
        let devices = [
            Device::new(json!({ "type": "udm" })),
            Device::new(json!({ "type": "usw" })),
        ];

        assert!(matches!(
            select_cellular_device(&devices),
            Err(Error::DeviceNotFound)
        ));
        assert!(matches!(
            select_cellular_device(&[]),
            Err(Error::DeviceNotFound)
        ));
    }

    #[test]
    fn mapping_has_every_key_and_no_absent_wan_stats() {
        let device = Device::new(json!({
            "type": "umbb",
            "mbb": { "sim": [{ "slot": 1, "iccid": "8901" }] }
        }));
        let metrics = Metrics {
            device: flatten_metrics(&device),
            wan: WanHealth::default(),
        };

        let mapping = metrics.to_mapping().unwrap();

        for key in [
            "device_name",
            "device_mac",
            "uptime",
            "internet",
            "mbb_state",
            "rsrp",
            "rsrq",
            "rssi",
            "snr",
            "signal_percent",
            "signal",
            "rat",
            "band",
            "channel",
            "cell_id",
            "mcc",
            "mnc",
            "registration_state",
            "cellular_ip",
            "mtu",
            "public_ip",
            "isp",
            "esim_eid",
            "sim_count",
            "wan_interface",
        ] {
            assert!(mapping.contains_key(key), "missing {key}");
        }
        assert_eq!(mapping["rsrp"], Value::Null);
        assert_eq!(mapping["wan_interface"], Value::Null);
        assert_eq!(mapping["sim_count"], json!(1));
        assert_eq!(mapping["sim_0"]["iccid"], json!("8901"));
        assert!(!mapping.contains_key("sims"));
        assert!(!mapping.contains_key("wan_availability"));
        assert!(!mapping.contains_key("wan_latency_avg"));
        assert!(!mapping.contains_key("wan_uptime"));
    }

    #[test]
    fn mapping_includes_wan_stats_when_reported() {
        let metrics = Metrics {
            device: flatten_metrics(&Device::new(json!({ "type": "umbb" }))),
            wan: WanHealth {
                wan_interface: Some("WAN2".into()),
                stats: Some(UplinkStats {
                    availability: 99.5,
                    latency_avg: None,
                    uptime: Some(60),
                }),
            },
        };

        let mapping = metrics.to_mapping().unwrap();

        assert_eq!(mapping["wan_interface"], json!("WAN2"));
        assert_eq!(mapping["wan_availability"], json!(99.5));
        assert_eq!(mapping["wan_latency_avg"], Value::Null);
        assert_eq!(mapping["wan_uptime"], json!(60));
    }
}
