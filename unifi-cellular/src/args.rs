use std::path::PathBuf;

use clap::{
    builder::{styling::AnsiColor, Styles},
    Parser, Subcommand,
};
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::settings::DEFAULT_CONFIG_PATH;

/// Monitors a UniFi cellular modem (U-LTE / U5G) through the UniFi Network
/// controller and reports its signal, radio, SIM and WAN health as sensors.
///
/// Every setting can also be provided in the config file or through
/// `UNIFI_CELLULAR_<NAME>` environment variables. Command line arguments win over
/// environment variables, which win over the config file.
#[skip_serializing_none]
#[derive(Debug, Parser, Serialize)]
#[command(version, about, styles = clap_v3_styles())]
pub struct Args {
    /// The path to the config file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    #[serde(skip)]
    pub config: PathBuf,
    /// Controller address, e.g. `192.168.1.1` or `unifi.lan:8443`.
    #[arg(long)]
    pub host: Option<String>,
    /// Controller API key. Prefer `UNIFI_CELLULAR_API_KEY` over this flag.
    #[arg(long)]
    pub api_key: Option<String>,
    /// The UniFi site the modem is adopted in.
    #[arg(long)]
    pub site: Option<String>,
    /// Verify the controller's TLS certificate.
    #[arg(long)]
    pub verify_ssl: Option<bool>,
    /// Poll interval in seconds.
    #[arg(long)]
    pub scan_interval: Option<u64>,
    /// Per-request timeout in seconds.
    #[arg(long)]
    pub request_timeout: Option<u64>,
    /// Consecutive failed polls after which sensors are reported unavailable.
    #[arg(long)]
    pub unavailable_after: Option<u32>,
    /// Write the latest sensor states as JSON to this file.
    #[arg(long)]
    pub state_file: Option<PathBuf>,
    #[command(subcommand)]
    #[serde(skip)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Poll the controller until interrupted.
    Run,
    /// Check the configuration against the controller and report what was found.
    Validate,
    /// Run a single poll cycle and print the result as JSON.
    Snapshot {
        /// Print the raw metrics mapping instead of sensor states.
        #[arg(long)]
        raw: bool,
    },
}

fn clap_v3_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default())
        .usage(AnsiColor::Green.on_default())
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}
