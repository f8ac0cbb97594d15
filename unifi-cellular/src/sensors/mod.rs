//! Projection of [`Metrics`] onto named sensors for the host's presentation layer.
//!
//! Sensors are enumerated once, from the first successful poll. Each sensor then
//! reads its current state from whatever metrics are published at the time.

mod descriptions;

pub use descriptions::{
    MetricSensor, SimSensor, DEVICE_SENSORS, IP_GEO_SENSORS, RADIO_SENSORS, SIGNAL_SENSORS,
    SIM_SENSORS, WAN_SENSORS,
};

use crate::metrics::{Metrics, DEFAULT_DEVICE_NAME};
use serde::Serialize;
use url::Url;

pub const MANUFACTURER: &str = "Ubiquiti";
const UNKNOWN_MAC: &str = "unknown";

pub mod units {
    pub const DBM: &str = "dBm";
    pub const DB: &str = "dB";
    pub const PERCENTAGE: &str = "%";
    pub const SECONDS: &str = "s";
    pub const MILLISECONDS: &str = "ms";
    pub const BYTES: &str = "B";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Bool(bool),
    /// A controller-reported number, republished unchanged.
    Number(serde_json::Number),
    Int(i64),
    Count(u64),
    Float(f64),
    Text(String),
}

impl SensorValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Number(ref n) => n.as_f64(),
            Self::Int(v) => Some(v as f64),
            Self::Count(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    SignalStrength,
    Duration,
    DataSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

/// Static description of one sensor reading from a `T`.
pub struct SensorDescription<T: 'static> {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub icon: Option<&'static str>,
    pub value: fn(&T) -> Option<SensorValue>,
    /// Thresholds for the Excellent / Good / Fair cut-offs of the `rating` attribute.
    pub rating: Option<[f64; 3]>,
}

impl<T> SensorDescription<T> {
    pub const fn new(
        key: &'static str,
        name: &'static str,
        value: fn(&T) -> Option<SensorValue>,
    ) -> Self {
        Self {
            key,
            name,
            unit: None,
            device_class: None,
            state_class: None,
            icon: None,
            value,
            rating: None,
        }
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn device_class(mut self, device_class: DeviceClass) -> Self {
        self.device_class = Some(device_class);
        self
    }

    pub const fn state_class(mut self, state_class: StateClass) -> Self {
        self.state_class = Some(state_class);
        self
    }

    pub const fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub const fn rating(mut self, thresholds: [f64; 3]) -> Self {
        self.rating = Some(thresholds);
        self
    }

    fn read(&self, source: Option<&T>) -> SensorReading {
        let value = source.and_then(self.value);
        let rating = self
            .rating
            .map(|t| signal_rating(value.as_ref().and_then(SensorValue::as_f64), t));

        SensorReading {
            value,
            unit: self.unit,
            device_class: self.device_class,
            state_class: self.state_class,
            icon: self.icon,
            attributes: Attributes { rating },
        }
    }
}

/// Buckets a signal value: at or above `thresholds[0]` is Excellent, then Good, then
/// Fair, anything lower is Poor.
pub fn signal_rating(value: Option<f64>, thresholds: [f64; 3]) -> &'static str {
    let Some(value) = value else {
        return "N/A";
    };

    if value >= thresholds[0] {
        "Excellent"
    } else if value >= thresholds[1] {
        "Good"
    } else if value >= thresholds[2] {
        "Fair"
    } else {
        "Poor"
    }
}

/// One concrete sensor of the discovered device.
pub struct Sensor {
    pub unique_id: String,
    pub name: String,
    source: Source,
}

enum Source {
    Device(&'static MetricSensor),
    Sim {
        index: usize,
        description: &'static SimSensor,
    },
    Wan {
        interface: String,
        description: &'static MetricSensor,
    },
}

impl Sensor {
    pub fn key(&self) -> &'static str {
        match &self.source {
            Source::Device(d) | Source::Wan { description: d, .. } => d.key,
            Source::Sim { description, .. } => description.key,
        }
    }

    pub fn state(&self, metrics: &Metrics) -> SensorState {
        let reading = match &self.source {
            Source::Device(d) => d.read(Some(metrics)),
            Source::Sim { index, description } => {
                description.read(metrics.device.sims.get(*index))
            }
            // only meaningful while the modem is still on the uplink it was
            // enumerated with
            Source::Wan {
                interface,
                description,
            } => {
                let current = metrics.wan.wan_interface.as_deref() == Some(interface.as_str());
                description.read(current.then_some(metrics))
            }
        };

        SensorState {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            reading,
        }
    }
}

/// Instantiates every sensor the device in `metrics` supports.
pub fn enumerate(metrics: &Metrics) -> Vec<Sensor> {
    let mac = match metrics.device.device_mac.as_str() {
        "" => UNKNOWN_MAC,
        mac => mac,
    };

    let mut sensors: Vec<Sensor> = SIGNAL_SENSORS
        .iter()
        .chain(RADIO_SENSORS)
        .chain(DEVICE_SENSORS)
        .chain(IP_GEO_SENSORS)
        .map(|d| Sensor {
            unique_id: format!("{mac}_{}", d.key),
            name: d.name.to_owned(),
            source: Source::Device(d),
        })
        .collect();

    for (index, sim) in metrics.device.sims.iter().enumerate() {
        let label = sim.label(index);
        sensors.extend(SIM_SENSORS.iter().map(|d| Sensor {
            unique_id: format!("{mac}_sim{index}_{}", d.key),
            name: format!("{label} {}", d.name),
            source: Source::Sim {
                index,
                description: d,
            },
        }));
    }

    if let Some(interface) = &metrics.wan.wan_interface {
        let discriminator = interface.to_lowercase();
        sensors.extend(WAN_SENSORS.iter().map(|d| Sensor {
            unique_id: format!("{mac}_{discriminator}_{}", d.key),
            name: format!("{interface} {}", d.name),
            source: Source::Wan {
                interface: interface.clone(),
                description: d,
            },
        }));
    }

    sensors
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    #[serde(flatten)]
    pub reading: SensorReading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub value: Option<SensorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<DeviceClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<&'static str>,
}

/// Identity of the physical device all sensors belong to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: String,
    pub sw_version: Option<String>,
    pub configuration_url: String,
}

impl DeviceInfo {
    pub fn new(metrics: &Metrics, configuration_url: &Url) -> Self {
        let device = &metrics.device;
        let model = [&device.device_shortname, &device.device_model]
            .into_iter()
            .find(|m| !m.is_empty())
            .map_or(DEFAULT_DEVICE_NAME, String::as_str);

        Self {
            identifier: match device.device_mac.as_str() {
                "" => UNKNOWN_MAC.to_owned(),
                mac => mac.to_owned(),
            },
            name: device.device_name.clone(),
            manufacturer: MANUFACTURER,
            model: model.to_owned(),
            sw_version: Some(device.device_version.clone()).filter(|v| !v.is_empty()),
            configuration_url: configuration_url.as_str().trim_end_matches('/').to_owned(),
        }
    }
}
