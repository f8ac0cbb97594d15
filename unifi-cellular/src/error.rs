/// Failures of a poll cycle against the controller.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("authentication failed (invalid API key)")]
    Authentication,
    #[error("site not found on controller")]
    SiteNotFound,
    #[error("no UniFi MBB (cellular) device found")]
    DeviceNotFound,
    #[error("invalid controller host {host:?}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },
    #[error("error communicating with UniFi controller")]
    Communication(#[source] reqwest::Error),
}

impl Error {
    /// Whether the failure needs the user to fix the configuration, as opposed to
    /// waiting for connectivity to come back.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication | Self::SiteNotFound | Self::InvalidHost { .. }
        )
    }
}
