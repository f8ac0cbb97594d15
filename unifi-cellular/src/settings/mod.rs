use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use figment::providers::Format as _;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

use crate::args::Args;

#[cfg(test)]
mod tests;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/unifi-cellular/config.toml";
pub const ENV_PREFIX: &str = "UNIFI_CELLULAR_";

pub const DEFAULT_HOST: &str = "192.168.1.1";
pub const DEFAULT_SITE: &str = "default";
pub const DEFAULT_VERIFY_SSL: bool = false;
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_UNAVAILABLE_AFTER: u32 = 3;

/// Everything needed to reach the controller and drive the poll loop.
///
/// Built either with [`Settings::get`] (service) or [`Settings::builder`] (tests and
/// embedding).
#[serde_as]
#[derive(Debug, Deserialize, bon::Builder)]
pub struct Settings {
    /// Controller address, optionally with port and scheme.
    #[builder(into, default = DEFAULT_HOST.to_owned())]
    pub host: String,
    pub api_key: SecretString,
    #[builder(into, default = DEFAULT_SITE.to_owned())]
    pub site: String,
    #[builder(default = DEFAULT_VERIFY_SSL)]
    pub verify_ssl: bool,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[builder(default = DEFAULT_SCAN_INTERVAL)]
    pub scan_interval: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    /// Consecutive failed refreshes after which sensors stop being reported.
    #[builder(default = DEFAULT_UNAVAILABLE_AFTER)]
    pub unavailable_after: u32,
    /// Where to write the latest sensor states as JSON, if anywhere.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Settings {
    /// Constructs `Settings` from a config file, environment variables, and command line
    /// arguments. Command line arguments always take precedence over environment variables, which
    /// in turn take precedence over the config file.
    pub fn get<P: AsRef<Path>>(
        args: &Args,
        config: P,
        env_prefix: &str,
    ) -> figment::error::Result<Settings> {
        let settings: Settings = figment::Figment::new()
            .merge(figment::providers::Serialized::defaults(Defaults::default()))
            .merge(figment::providers::Toml::file(config))
            .merge(figment::providers::Env::prefixed(env_prefix))
            .merge(figment::providers::Serialized::defaults(args))
            .extract()?;
        settings
            .validate()
            .map_err(|e| figment::Error::from(e.to_string()))?;

        Ok(settings)
    }

    /// Rejects values the poll loop cannot run with.
    pub fn validate(&self) -> Result<(), InvalidSettings> {
        if self.scan_interval.is_zero() {
            return Err(InvalidSettings::Zero("scan_interval"));
        }
        if self.request_timeout.is_zero() {
            return Err(InvalidSettings::Zero("request_timeout"));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidSettings {
    #[error("`{0}` must be at least one second")]
    Zero(&'static str),
}

#[serde_as]
#[derive(Debug, Serialize)]
struct Defaults {
    host: &'static str,
    site: &'static str,
    verify_ssl: bool,
    #[serde_as(as = "DurationSeconds<u64>")]
    scan_interval: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    request_timeout: Duration,
    unavailable_after: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            site: DEFAULT_SITE,
            verify_ssl: DEFAULT_VERIFY_SSL,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            unavailable_after: DEFAULT_UNAVAILABLE_AFTER,
        }
    }
}
