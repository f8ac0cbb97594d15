use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Device `type` of the UniFi mobile broadband (cellular) modem.
pub const DEVICE_TYPE_MBB: &str = "umbb";

/// Response body shared by the `stat/*` endpoints: `{"data": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// A device record as reported by `stat/device`.
///
/// The controller reports dozens of device types with wildly different shapes, so
/// the record is kept as raw JSON and only projected where needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Device(Value);

impl Device {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn is_cellular(&self) -> bool {
        self.kind() == Some(DEVICE_TYPE_MBB)
    }

    pub fn mac(&self) -> Option<&str> {
        self.0.get("mac").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Looks up a nested field by JSON pointer, e.g. `/mbb/radio/rsrp`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer)
    }

    /// Entries of the device's `last_wan_interfaces` table as `(uplink, ip)`, in
    /// the order the controller reported them. Entries without an IP are skipped.
    pub fn wan_interfaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .get("last_wan_interfaces")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(Map::iter)
            .filter_map(|(name, intf)| {
                let ip = intf.get("ip").and_then(Value::as_str)?;
                Some((name.as_str(), ip))
            })
    }
}

/// One entry of `stat/health`.
///
/// `uptime_stats` stays raw JSON: uplink entries are read individually and
/// leniently, so one malformed uplink never hides the others.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthSubsystem {
    pub subsystem: String,
    #[serde(default)]
    pub uptime_stats: Map<String, Value>,
}

impl HealthSubsystem {
    /// Parses the raw `data` array leniently: entries that do not look like a
    /// subsystem record are dropped instead of failing the whole response.
    pub fn parse_all(raw: Vec<Value>) -> Vec<Self> {
        raw.into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()
    }
}
