use crate::{
    controller::ControllerClient,
    metrics::{select_cellular_device, DEFAULT_DEVICE_NAME},
    Error,
};
use serde::Serialize;
use tracing::{info, instrument};

/// What a successful validation found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupInfo {
    /// Display title, the modem's name.
    pub title: String,
    /// Stable identity of the modem, used to reject duplicate configurations.
    pub mac: String,
}

/// Why a configuration was rejected.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("the controller rejected the API key")]
    InvalidAuth,
    #[error("the site does not exist on this controller")]
    InvalidSite,
    #[error("no UniFi cellular modem is adopted in this site")]
    NoDevice,
    #[error("could not talk to the controller")]
    CannotConnect(#[source] Error),
}

impl SetupError {
    /// Stable machine readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid_auth",
            Self::InvalidSite => "invalid_site",
            Self::NoDevice => "no_device",
            Self::CannotConnect(_) => "cannot_connect",
        }
    }
}

impl From<Error> for SetupError {
    fn from(e: Error) -> Self {
        match e {
            Error::Authentication => Self::InvalidAuth,
            Error::SiteNotFound => Self::InvalidSite,
            Error::DeviceNotFound => Self::NoDevice,
            e => Self::CannotConnect(e),
        }
    }
}

/// Checks that the configured controller is reachable, accepts the API key, knows
/// the site and has a cellular modem adopted.
#[instrument(skip_all, fields(controller = %client.base_url()))]
pub async fn validate(client: &ControllerClient) -> Result<SetupInfo, SetupError> {
    let devices = client.probe_devices().await?;
    let device = select_cellular_device(&devices)?;

    let info = SetupInfo {
        title: device.name().unwrap_or(DEFAULT_DEVICE_NAME).to_owned(),
        mac: device.mac().unwrap_or_default().to_owned(),
    };
    info!(title = %info.title, mac = %info.mac, "found cellular modem");

    Ok(info)
}
