use crate::{
    coordinator::Snapshot,
    sensors::{DeviceInfo, Sensor, SensorState},
};
use color_eyre::{eyre::WrapErr as _, Result};
use serde::Serialize;
use std::{
    io::Write as _,
    path::{Path, PathBuf},
};
use tokio::{
    sync::watch,
    task::{self, JoinHandle},
};
use tracing::{debug, error, info, warn};

/// Everything the presentation layer shows for one published snapshot.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub device: &'a DeviceInfo,
    pub available: bool,
    pub last_update_success: bool,
    pub consecutive_failures: u32,
    pub last_error: Option<&'a str>,
    pub sensors: Vec<SensorState>,
}

impl<'a> Report<'a> {
    pub fn new(
        device: &'a DeviceInfo,
        sensors: &[Sensor],
        snapshot: &'a Snapshot,
        unavailable_after: u32,
    ) -> Self {
        let sensors = match &snapshot.metrics {
            Some(metrics) => sensors.iter().map(|s| s.state(metrics)).collect(),
            None => Vec::new(),
        };

        Self {
            device,
            available: snapshot.is_available(unavailable_after),
            last_update_success: snapshot.last_update_success,
            consecutive_failures: snapshot.consecutive_failures,
            last_error: snapshot.last_error.as_deref(),
            sensors,
        }
    }
}

/// Publishes the sensor states every time the coordinator publishes a snapshot.
/// Ends once the coordinator is gone.
pub fn spawn(
    device: DeviceInfo,
    sensors: Vec<Sensor>,
    mut snapshots: watch::Receiver<Snapshot>,
    unavailable_after: u32,
    state_file: Option<PathBuf>,
) -> JoinHandle<Result<()>> {
    info!("starting sensor publisher");
    task::spawn(async move {
        loop {
            let snapshot = snapshots.borrow_and_update().clone();
            let report = Report::new(&device, &sensors, &snapshot, unavailable_after);
            publish(&report, state_file.as_deref()).await;

            if snapshots.changed().await.is_err() {
                info!("coordinator stopped, stopping sensor publisher");
                return Ok(());
            }
        }
    })
}

async fn publish(report: &Report<'_>, state_file: Option<&Path>) {
    let known = report.sensors.iter().filter(|s| s.reading.value.is_some());
    info!(
        available = report.available,
        sensors = report.sensors.len(),
        known = known.count(),
        "published sensor states"
    );
    if !report.available {
        warn!(
            consecutive_failures = report.consecutive_failures,
            "sensors unavailable: {}",
            report.last_error.unwrap_or("no successful poll yet")
        );
    }
    for state in &report.sensors {
        debug!(unique_id = %state.unique_id, value = ?state.reading.value);
    }

    let Some(path) = state_file else {
        return;
    };
    if let Err(e) = write_state_file(path, report).await {
        error!("failed to write state file {}: {e:?}", path.display());
    }
}

/// Replaces `path` atomically so readers never see a partial file.
pub async fn write_state_file(path: &Path, report: &Report<'_>) -> Result<()> {
    let contents = serde_json::to_vec_pretty(report).wrap_err("failed to serialize report")?;
    let path = path.to_owned();

    task::spawn_blocking(move || {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp_file =
            tempfile::NamedTempFile::new_in(dir).wrap_err("failed to create tempfile")?;
        tmp_file.write_all(&contents)?;
        tmp_file.as_file().sync_all()?;
        tmp_file
            .persist(&path)
            .wrap_err("failed to persist temporary file")?;

        Ok::<_, color_eyre::Report>(())
    })
    .await
    .wrap_err("task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::Device,
        metrics::{flatten_metrics, Metrics, WanHealth},
        sensors,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use url::Url;

    fn fixture() -> (DeviceInfo, Vec<Sensor>, Snapshot) {
        let metrics = Metrics {
            device: flatten_metrics(&Device::new(json!({
                "type": "umbb",
                "mac": "74:ac:b9:00:00:01",
                "mbb": { "radio": { "rsrp": -85 } }
            }))),
            wan: WanHealth::default(),
        };
        let url = Url::parse("https://192.168.1.1").unwrap();
        let device = DeviceInfo::new(&metrics, &url);
        let sensors = sensors::enumerate(&metrics);
        let snapshot = Snapshot {
            metrics: Some(Arc::new(metrics)),
            last_update_success: true,
            consecutive_failures: 0,
            last_error: None,
        };

        (device, sensors, snapshot)
    }

    #[test]
    fn report_goes_unavailable_after_repeated_failures() {
        let (device, sensors, mut snapshot) = fixture();
        snapshot.last_update_success = false;
        snapshot.consecutive_failures = 3;
        snapshot.last_error = Some("authentication failed (invalid API key)".into());

        let report = Report::new(&device, &sensors, &snapshot, 3);

        assert!(!report.available);
        assert_eq!(report.sensors.len(), sensors.len());
        assert_eq!(
            report.last_error,
            Some("authentication failed (invalid API key)")
        );
    }

    #[test]
    fn report_without_metrics_has_no_sensor_states() {
        let (device, sensors, _) = fixture();

        let snapshot = Snapshot::default();
        let report = Report::new(&device, &sensors, &snapshot, 3);

        assert!(!report.available);
        assert!(report.sensors.is_empty());
    }

    #[tokio::test]
    async fn state_file_is_replaced_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "stale").unwrap();
        let (device, sensors, snapshot) = fixture();
        let report = Report::new(&device, &sensors, &snapshot, 3);

        write_state_file(&path, &report).await.unwrap();

        let written: Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["available"], json!(true));
        assert_eq!(written["device"]["identifier"], json!("74:ac:b9:00:00:01"));
        let rsrp = written["sensors"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["unique_id"] == json!("74:ac:b9:00:00:01_rsrp"))
            .unwrap();
        assert_eq!(rsrp["value"], json!(-85));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
