use crate::{
    controller::Controller,
    metrics::{
        detect_wan_interface, flatten_metrics, merge_wan_health, select_cellular_device,
        Metrics,
    },
    Error,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// What readers see: the last good metrics plus how the latest polls went.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Last successfully published metrics. Survives failed polls.
    pub metrics: Option<Arc<Metrics>>,
    pub last_update_success: bool,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl Snapshot {
    /// Stale values stay available until `unavailable_after` polls in a row failed.
    pub fn is_available(&self, unavailable_after: u32) -> bool {
        self.metrics.is_some() && self.consecutive_failures < unavailable_after
    }
}

/// Drives poll cycles and publishes their results.
///
/// Metrics are swapped as a whole through a [`watch`] channel, so readers always
/// see either the previous or the new complete result.
pub struct Coordinator<C> {
    controller: C,
    snapshot: watch::Sender<Snapshot>,
}

impl<C: Controller> Coordinator<C> {
    pub fn new(controller: C) -> Self {
        let (snapshot, _) = watch::channel(Snapshot::default());

        Self {
            controller,
            snapshot,
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Runs one poll cycle. On failure the previously published metrics are kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<Metrics>, Error> {
        match poll(&self.controller).await {
            Ok(metrics) => {
                let metrics = Arc::new(metrics);
                let previous_failures = self.snapshot.borrow().consecutive_failures;
                if previous_failures > 0 {
                    info!("controller reachable again after {previous_failures} failed polls");
                }

                self.snapshot.send_replace(Snapshot {
                    metrics: Some(Arc::clone(&metrics)),
                    last_update_success: true,
                    consecutive_failures: 0,
                    last_error: None,
                });

                Ok(metrics)
            }

            Err(e) => {
                self.snapshot.send_modify(|s| {
                    s.last_update_success = false;
                    s.consecutive_failures = s.consecutive_failures.saturating_add(1);
                    s.last_error = Some(e.to_string());
                });

                Err(e)
            }
        }
    }

    /// Polls every `interval` until `shutdown` is cancelled. The first poll happens
    /// one interval from now; cycles never overlap, late ticks are delayed rather
    /// than bunched up.
    pub async fn run(&self, interval: Duration, shutdown: CancellationToken) {
        info!("polling controller every {interval:?}");

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        shutdown
            .run_until_cancelled(async {
                loop {
                    ticker.tick().await;
                    if let Err(e) = self.refresh().await {
                        report_failure(&e);
                    }
                }
            })
            .await;

        info!("stopped polling controller");
    }
}

/// Fetch devices, extract, associate the uplink, fetch health, merge.
pub async fn poll(controller: &impl Controller) -> Result<Metrics, Error> {
    let devices = controller.fetch_devices().await?;
    let device = flatten_metrics(select_cellular_device(&devices)?);
    let wan_interface = detect_wan_interface(&devices, &device.cellular_ip);

    let health = controller.fetch_health().await;
    let wan = wan_interface
        .map(|name| merge_wan_health(&health, &name))
        .unwrap_or_default();

    Ok(Metrics { device, wan })
}

fn report_failure(e: &Error) {
    if e.is_config_error() {
        error!("poll failed, check the configuration: {e}");
    } else {
        warn!("poll failed: {e:?}");
    }
}
