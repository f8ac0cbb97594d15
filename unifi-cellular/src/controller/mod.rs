pub mod client;
pub mod types;

pub use client::ControllerClient;
pub use types::{Device, HealthSubsystem, DEVICE_TYPE_MBB};

use crate::Error;
use async_trait::async_trait;

/// Read-only access to the controller endpoints a poll cycle needs.
#[async_trait]
pub trait Controller: Send + Sync + 'static {
    /// Lists every device of the configured site.
    async fn fetch_devices(&self) -> Result<Vec<Device>, Error>;

    /// Best-effort health report. Failures yield an empty list.
    async fn fetch_health(&self) -> Vec<HealthSubsystem>;
}
