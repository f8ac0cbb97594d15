use super::{
    json::{lenient_bool, lenient_i64, lenient_number, lenient_string, string_or_empty},
    sim::SimSlot,
};
use crate::controller::Device;
use serde::Serialize;
use serde_json::{Number, Value};

pub const DEFAULT_DEVICE_NAME: &str = "UniFi Cellular";

/// Flat view of the cellular device record.
///
/// Textual fields default to an empty string and flags to `false`. Telemetry that
/// may legitimately be unknown (signal, channels, identifiers) stays `None`, so
/// that "unknown" is never confused with zero. Signal figures keep the number
/// exactly as the controller reported it, integer or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceMetrics {
    pub device_name: String,
    pub device_mac: String,
    pub device_ip: String,
    pub device_model: String,
    pub device_shortname: String,
    pub device_version: String,
    pub uptime: u64,
    pub internet: bool,

    pub mbb_state: String,
    pub mbb_mode: String,
    pub imei: String,

    pub rsrp: Option<Number>,
    pub rsrq: Option<Number>,
    pub rssi: Option<Number>,
    pub snr: Option<Number>,
    pub signal_percent: Option<Number>,
    pub signal: Option<i64>,

    pub rat: String,
    pub rat_mode_active: String,
    pub rat_5g_uw: bool,
    pub band: String,
    pub channel: Option<i64>,
    pub rx_chan: Option<i64>,
    pub tx_chan: Option<i64>,
    pub cell_id: Option<String>,
    pub networkoperator: String,
    pub mcc: Option<String>,
    pub mnc: Option<String>,
    pub mcc_cc2: String,
    pub roaming: bool,
    pub registration_state: Option<String>,

    pub cellular_ip: String,
    pub cellular_gateway: String,
    pub mtu: Option<i64>,
    pub public_ip: String,
    pub isp: String,

    pub esim_eid: String,

    pub sim_count: usize,
    /// Published as one `sim_{index}` entry per slot, see [`super::Metrics::to_mapping`].
    #[serde(skip)]
    pub sims: Vec<SimSlot>,
}

/// Projects the nested device record onto [`DeviceMetrics`].
///
/// Total: any of the `mbb` sub-blocks may be missing or malformed.
pub fn flatten_metrics(device: &Device) -> DeviceMetrics {
    let top = |key: &str| device.pointer(&format!("/{key}"));
    let radio = |key: &str| device.pointer(&format!("/mbb/radio/{key}"));
    let mbb = |key: &str| device.pointer(&format!("/mbb/{key}"));

    let sims: Vec<SimSlot> = device
        .pointer("/mbb/sim")
        .and_then(Value::as_array)
        .map(|sims| sims.iter().map(SimSlot::from_json).collect())
        .unwrap_or_default();

    DeviceMetrics {
        device_name: lenient_string(top("name"))
            .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_owned()),
        device_mac: string_or_empty(top("mac")),
        device_ip: string_or_empty(top("ip")),
        device_model: string_or_empty(top("model")),
        device_shortname: string_or_empty(top("shortname")),
        device_version: string_or_empty(top("version")),
        uptime: lenient_i64(top("uptime"))
            .and_then(|u| u64::try_from(u).ok())
            .unwrap_or(0),
        internet: lenient_bool(top("internet")),

        mbb_state: string_or_empty(mbb("state")),
        mbb_mode: string_or_empty(mbb("mode")),
        imei: string_or_empty(mbb("imei")),

        rsrp: lenient_number(radio("rsrp")),
        rsrq: lenient_number(radio("rsrq")),
        rssi: lenient_number(radio("rssi")),
        snr: lenient_number(radio("snr")),
        signal_percent: lenient_number(radio("signal_percent")),
        signal: lenient_i64(radio("signal")),

        rat: string_or_empty(radio("rat")),
        rat_mode_active: string_or_empty(radio("rat_mode_active")),
        rat_5g_uw: lenient_bool(radio("rat_5g_uw")),
        band: string_or_empty(radio("band")),
        channel: lenient_i64(radio("channel")),
        rx_chan: lenient_i64(radio("rx_chan")),
        tx_chan: lenient_i64(radio("tx_chan")),
        cell_id: lenient_string(radio("cell_id")),
        networkoperator: string_or_empty(radio("networkoperator")),
        mcc: lenient_string(radio("mcc")),
        mnc: lenient_string(radio("mnc")),
        mcc_cc2: string_or_empty(radio("mcc_cc2")),
        roaming: lenient_bool(radio("roaming")),
        registration_state: lenient_string(radio("registration_state")),

        cellular_ip: string_or_empty(device.pointer("/mbb/ip_settings/ipv4_address")),
        cellular_gateway: string_or_empty(
            device.pointer("/mbb/ip_settings/ipv4_gateway"),
        ),
        mtu: lenient_i64(device.pointer("/mbb/ip_settings/mtu")),
        public_ip: string_or_empty(device.pointer("/mbb/geo_info/address")),
        isp: string_or_empty(device.pointer("/mbb/geo_info/isp")),

        esim_eid: string_or_empty(device.pointer("/mbb/esim/eid")),

        sim_count: sims.len(),
        sims,
    }
}
