use super::json::{lenient_f64, lenient_number, lenient_u64};
use crate::controller::{Device, HealthSubsystem};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

pub const WAN_SUBSYSTEM: &str = "wan";

/// The uplink carrying the cellular connection and its health, if known.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WanHealth {
    pub wan_interface: Option<String>,
    #[serde(flatten)]
    pub stats: Option<UplinkStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UplinkStats {
    /// Percentage, rounded to two decimals.
    #[serde(rename = "wan_availability")]
    pub availability: f64,
    /// Milliseconds, as reported.
    #[serde(rename = "wan_latency_avg")]
    pub latency_avg: Option<Number>,
    /// Seconds.
    #[serde(rename = "wan_uptime")]
    pub uptime: Option<u64>,
}

/// Finds the uplink (`WAN`, `WAN2`, ...) whose last known IP is the modem's IP.
///
/// The controller has no direct "this uplink is the modem" link, so the
/// association is inferred from IP equality across every device's
/// `last_wan_interfaces` table. Devices are scanned in list order and each table
/// in reported order; the first match wins. Two devices reporting the same IP under
/// different uplink names is not disambiguated any further.
pub fn detect_wan_interface(devices: &[Device], cellular_ip: &str) -> Option<String> {
    if cellular_ip.is_empty() {
        return None;
    }

    let found = devices
        .iter()
        .flat_map(Device::wan_interfaces)
        .find(|(_, ip)| *ip == cellular_ip)
        .map(|(name, _)| name.to_owned());

    debug!(cellular_ip, wan_interface = ?found, "wan interface detection");

    found
}

/// Looks up `wan_name` in the `wan` subsystem's uptime table.
///
/// Never fails. Whenever the uplink has no usable entry (including an empty health
/// list after a failed fetch), only the uplink name is returned. Sibling uplinks
/// are never looked at.
pub fn merge_wan_health(health: &[HealthSubsystem], wan_name: &str) -> WanHealth {
    let stats = health
        .iter()
        .filter(|s| s.subsystem == WAN_SUBSYSTEM)
        .find_map(|s| s.uptime_stats.get(wan_name))
        .and_then(Value::as_object)
        .filter(|uplink| !uplink.is_empty())
        .map(UplinkStats::from_json);

    WanHealth {
        wan_interface: Some(wan_name.to_owned()),
        stats,
    }
}

impl UplinkStats {
    fn from_json(uplink: &Map<String, Value>) -> Self {
        UplinkStats {
            availability: round_2dp(lenient_f64(uplink.get("availability")).unwrap_or(0.0)),
            latency_avg: lenient_number(uplink.get("latency_average")),
            uptime: lenient_u64(uplink.get("uptime")),
        }
    }
}

/// Rounds to two decimals, halfway cases to even (`0.125` becomes `0.12`).
pub(crate) fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
