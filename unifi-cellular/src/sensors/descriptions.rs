use super::{units, DeviceClass, SensorDescription, SensorValue, StateClass};
use serde_json::Number;
use crate::metrics::{round_2dp, Metrics, SimSlot};

pub type MetricSensor = SensorDescription<Metrics>;
pub type SimSensor = SensorDescription<SimSlot>;

const RSRP_THRESHOLDS: [f64; 3] = [-80.0, -95.0, -110.0];
const RSRQ_THRESHOLDS: [f64; 3] = [-5.0, -10.0, -15.0];
const SNR_THRESHOLDS: [f64; 3] = [20.0, 10.0, 3.0];

pub static SIGNAL_SENSORS: &[MetricSensor] = &[
    MetricSensor::new("rsrp", "RSRP", |m| number(m.device.rsrp.clone()))
        .unit(units::DBM)
        .device_class(DeviceClass::SignalStrength)
        .state_class(StateClass::Measurement)
        .rating(RSRP_THRESHOLDS),
    MetricSensor::new("rsrq", "RSRQ", |m| number(m.device.rsrq.clone()))
        .unit(units::DB)
        .state_class(StateClass::Measurement)
        .rating(RSRQ_THRESHOLDS),
    MetricSensor::new("rssi", "RSSI", |m| number(m.device.rssi.clone()))
        .unit(units::DBM)
        .device_class(DeviceClass::SignalStrength)
        .state_class(StateClass::Measurement),
    MetricSensor::new("snr", "SNR", |m| rounded(m.device.snr.as_ref()))
        .unit(units::DB)
        .state_class(StateClass::Measurement)
        .rating(SNR_THRESHOLDS),
    MetricSensor::new("signal_percent", "Signal Strength", |m| {
        number(m.device.signal_percent.clone())
    })
    .unit(units::PERCENTAGE)
    .state_class(StateClass::Measurement)
    .icon("mdi:signal-cellular-3"),
    MetricSensor::new("signal_level", "Signal Level", |m| int(m.device.signal))
        .state_class(StateClass::Measurement)
        .icon("mdi:signal-cellular-3"),
];

pub static RADIO_SENSORS: &[MetricSensor] = &[
    MetricSensor::new("rat", "Radio Access Technology", |m| text(&m.device.rat))
        .icon("mdi:antenna"),
    MetricSensor::new("rat_mode_active", "Active Radio Mode", |m| {
        text(&m.device.rat_mode_active)
    })
    .icon("mdi:antenna"),
    MetricSensor::new("rat_5g_uw", "5G Ultra Wideband", |m| flag(m.device.rat_5g_uw))
        .icon("mdi:signal-5g"),
    MetricSensor::new("band", "Band", |m| text(&m.device.band)).icon("mdi:radio-tower"),
    MetricSensor::new("channel", "Channel", |m| int(m.device.channel))
        .icon("mdi:radio-tower"),
    MetricSensor::new("rx_channel", "RX Channel", |m| int(m.device.rx_chan))
        .icon("mdi:radio-tower"),
    MetricSensor::new("tx_channel", "TX Channel", |m| int(m.device.tx_chan))
        .icon("mdi:radio-tower"),
    MetricSensor::new("cell_id", "Cell ID", |m| opt_text(m.device.cell_id.as_deref()))
        .icon("mdi:cellphone-marker"),
    MetricSensor::new("operator", "Operator", |m| text(&m.device.networkoperator))
        .icon("mdi:sim"),
    MetricSensor::new("mcc", "MCC", |m| opt_text(m.device.mcc.as_deref())).icon("mdi:earth"),
    MetricSensor::new("mnc", "MNC", |m| opt_text(m.device.mnc.as_deref())).icon("mdi:earth"),
    MetricSensor::new("country", "Country", |m| text(&m.device.mcc_cc2)).icon("mdi:earth"),
    MetricSensor::new("roaming", "Roaming", |m| flag(m.device.roaming))
        .icon("mdi:airplane"),
    MetricSensor::new("registration_state", "Registration State", |m| {
        opt_text(m.device.registration_state.as_deref())
    })
    .icon("mdi:check-network"),
];

pub static DEVICE_SENSORS: &[MetricSensor] = &[
    MetricSensor::new("connection_state", "Connection State", |m| {
        text(&m.device.mbb_state)
    })
    .icon("mdi:lan-connect"),
    MetricSensor::new("mbb_mode", "Mode", |m| text(&m.device.mbb_mode))
        .icon("mdi:swap-horizontal"),
    MetricSensor::new("internet", "Internet", |m| flag(m.device.internet)).icon("mdi:web"),
    MetricSensor::new("uptime", "Uptime", |m| count(Some(m.device.uptime)))
        .unit(units::SECONDS)
        .device_class(DeviceClass::Duration)
        .state_class(StateClass::Measurement),
    MetricSensor::new("imei", "IMEI", |m| text(&m.device.imei)).icon("mdi:barcode"),
];

pub static IP_GEO_SENSORS: &[MetricSensor] = &[
    MetricSensor::new("cellular_ip", "Cellular IP", |m| text(&m.device.cellular_ip))
        .icon("mdi:ip-network"),
    MetricSensor::new("cellular_gateway", "Cellular Gateway", |m| {
        text(&m.device.cellular_gateway)
    })
    .icon("mdi:ip-network"),
    MetricSensor::new("mtu", "MTU", |m| int(m.device.mtu))
        .state_class(StateClass::Measurement)
        .icon("mdi:resize"),
    MetricSensor::new("public_ip", "Public IP", |m| text(&m.device.public_ip))
        .icon("mdi:earth"),
    MetricSensor::new("isp", "ISP", |m| text(&m.device.isp)).icon("mdi:web"),
    MetricSensor::new("esim_eid", "eSIM EID", |m| text(&m.device.esim_eid)).icon("mdi:sim"),
];

/// Health of the uplink the modem was associated with. Only instantiated when an
/// association exists.
pub static WAN_SENSORS: &[MetricSensor] = &[
    MetricSensor::new("wan_availability", "Availability", |m| {
        m.wan.stats.as_ref().map(|s| SensorValue::Float(s.availability))
    })
    .unit(units::PERCENTAGE)
    .state_class(StateClass::Measurement)
    .icon("mdi:check-network"),
    MetricSensor::new("wan_latency_avg", "Average Latency", |m| {
        number(m.wan.stats.as_ref().and_then(|s| s.latency_avg.clone()))
    })
    .unit(units::MILLISECONDS)
    .state_class(StateClass::Measurement)
    .icon("mdi:timer-outline"),
    MetricSensor::new("wan_uptime", "Uptime", |m| {
        count(m.wan.stats.as_ref().and_then(|s| s.uptime))
    })
    .unit(units::SECONDS)
    .device_class(DeviceClass::Duration),
];

/// Instantiated once per SIM slot.
pub static SIM_SENSORS: &[SimSensor] = &[
    SimSensor::new("state", "State", |s| opt_text(s.display_state.as_deref())).icon("mdi:sim"),
    SimSensor::new("carrier", "Carrier", |s| opt_text(s.spn.as_deref())).icon("mdi:sim"),
    SimSensor::new("iccid", "ICCID", |s| opt_text(s.iccid.as_deref())).icon("mdi:sim"),
    SimSensor::new("active", "Active", |s| flag(s.active)).icon("mdi:sim"),
    SimSensor::new("esim", "eSIM", |s| flag(s.esim)).icon("mdi:sim"),
    SimSensor::new("rx_bytes", "Received", |s| nonzero(s.rxbytes))
        .unit(units::BYTES)
        .device_class(DeviceClass::DataSize)
        .state_class(StateClass::TotalIncreasing)
        .icon("mdi:download"),
    SimSensor::new("tx_bytes", "Sent", |s| nonzero(s.txbytes))
        .unit(units::BYTES)
        .device_class(DeviceClass::DataSize)
        .state_class(StateClass::TotalIncreasing)
        .icon("mdi:upload"),
    SimSensor::new("data_limited", "Data Limited", |s| s.data_limited.map(SensorValue::Bool))
        .icon("mdi:alert-circle"),
    SimSensor::new("apn", "APN", |s| opt_text(s.apn.as_deref()))
        .icon("mdi:access-point-network"),
    SimSensor::new("asn", "ASN", |s| opt_text(s.asn.as_deref())).icon("mdi:earth"),
];

fn float(value: Option<f64>) -> Option<SensorValue> {
    value.map(SensorValue::Float)
}

fn number(value: Option<Number>) -> Option<SensorValue> {
    value.map(SensorValue::Number)
}

/// Fractional values are rounded to two decimals; integers pass through.
fn rounded(value: Option<&Number>) -> Option<SensorValue> {
    let n = value?;
    match n.as_f64() {
        Some(f) if n.is_f64() => float(Some(round_2dp(f))),
        _ => number(Some(n.clone())),
    }
}

fn int(value: Option<i64>) -> Option<SensorValue> {
    value.map(SensorValue::Int)
}

fn count(value: Option<u64>) -> Option<SensorValue> {
    value.map(SensorValue::Count)
}

/// Byte counters the modem has not started yet read as zero; report them as unknown.
fn nonzero(value: Option<u64>) -> Option<SensorValue> {
    count(value.filter(|&v| v > 0))
}

fn flag(value: bool) -> Option<SensorValue> {
    Some(SensorValue::Bool(value))
}

fn text(value: &str) -> Option<SensorValue> {
    (!value.is_empty()).then(|| SensorValue::Text(value.to_owned()))
}

fn opt_text(value: Option<&str>) -> Option<SensorValue> {
    value.and_then(text)
}
