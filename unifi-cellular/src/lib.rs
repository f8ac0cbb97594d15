pub mod args;
pub mod controller;
pub mod coordinator;
pub mod metrics;
pub mod publisher;
pub mod sensors;
pub mod settings;
pub mod setup;

mod error;

pub use error::Error;

use color_eyre::{eyre::WrapErr as _, Result};
use controller::ControllerClient;
use coordinator::Coordinator;
use publisher::Report;
use sensors::DeviceInfo;
use serde_json::Value;
use settings::Settings;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub type Tasks = Vec<JoinHandle<Result<()>>>;

/// Starts the monitor: one poll that has to succeed, then the polling and
/// publishing tasks. Polling stops once `shutdown_token` is cancelled.
#[bon::builder(finish_fn = run)]
pub async fn program(settings: Settings, shutdown_token: CancellationToken) -> Result<Tasks> {
    settings.validate().wrap_err("invalid settings")?;
    let client = ControllerClient::new(&settings).wrap_err("invalid controller settings")?;
    let coordinator = Coordinator::new(client);

    let metrics = coordinator
        .refresh()
        .await
        .wrap_err("initial poll of the controller failed")?;

    let device = DeviceInfo::new(&metrics, coordinator.controller().base_url());
    let sensors = sensors::enumerate(&metrics);
    info!(
        name = %device.name,
        model = %device.model,
        mac = %device.identifier,
        wan_interface = ?metrics.wan.wan_interface,
        "monitoring cellular modem with {} sensors",
        sensors.len()
    );

    let publisher = publisher::spawn(
        device,
        sensors,
        coordinator.subscribe(),
        settings.unavailable_after,
        settings.state_file.clone(),
    );

    let scan_interval = settings.scan_interval;
    let poller = task::spawn(async move {
        coordinator.run(scan_interval, shutdown_token).await;
        Ok(())
    });

    Ok(vec![poller, publisher])
}

/// Runs a single poll cycle and renders the result: the published metrics mapping
/// when `raw`, the sensor states otherwise.
pub async fn snapshot(settings: &Settings, raw: bool) -> Result<Value> {
    settings.validate().wrap_err("invalid settings")?;
    let client = ControllerClient::new(settings).wrap_err("invalid controller settings")?;
    let coordinator = Coordinator::new(client);
    let metrics = coordinator
        .refresh()
        .await
        .wrap_err("failed to poll the controller")?;

    if raw {
        let mapping = metrics
            .to_mapping()
            .wrap_err("failed to serialize metrics")?;
        return Ok(Value::Object(mapping));
    }

    let device = DeviceInfo::new(&metrics, coordinator.controller().base_url());
    let sensors = sensors::enumerate(&metrics);
    let snapshot = coordinator.snapshot();
    let report = Report::new(&device, &sensors, &snapshot, settings.unavailable_after);

    serde_json::to_value(&report).wrap_err("failed to serialize report")
}
