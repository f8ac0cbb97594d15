//! Standardized telemetry for the cellular monitor.
//!
//! Start with [`TelemetryConfig::new()`], call [`TelemetryConfig::init`] once at the
//! beginning of `main` and [`TelemetryFlusher::flush`] right before exiting.

use std::io::{IsTerminal as _, Write as _};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

/// The toplevel telemetry config.
#[derive(Debug)]
pub struct TelemetryConfig {
    syslog_identifier: Option<String>,
    global_filter: EnvFilter,
}

impl TelemetryConfig {
    /// Logs at INFO and above unless `RUST_LOG` says otherwise.
    #[expect(clippy::new_without_default, reason = "may add required args later")]
    #[must_use]
    pub fn new() -> Self {
        Self {
            syslog_identifier: None,
            global_filter: EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        }
    }

    /// Enables journald, and uses the provided syslog identifier.
    ///
    /// If you run the application in a tty, stderr will be used instead.
    #[must_use]
    pub fn with_journald(self, syslog_identifier: &str) -> Self {
        Self {
            syslog_identifier: Some(syslog_identifier.to_owned()),
            ..self
        }
    }

    pub fn try_init(
        self,
    ) -> Result<TelemetryFlusher, tracing_subscriber::util::TryInitError> {
        // No terminal usually means we are running under systemd.
        let journald_layer = if !std::io::stderr().is_terminal() {
            self.syslog_identifier.and_then(|syslog_identifier| {
                tracing_journald::layer()
                    .inspect_err(|err| {
                        eprintln!(
                            "failed connecting to journald socket. \
                        will write to stderr: {err}"
                        );
                    })
                    .map(|layer| layer.with_syslog_identifier(syslog_identifier))
                    .ok()
            })
        } else {
            None
        };
        let stderr_layer = journald_layer
            .is_none()
            .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(journald_layer)
            .with(self.global_filter)
            .try_init()?;

        Ok(TelemetryFlusher { _private: () })
    }

    /// Initializes the telemetry config. Call this only once, at the beginning of the
    /// program.
    ///
    /// Calling this more than once or when another tracing subscriber is registered
    /// will cause a panic.
    pub fn init(self) -> TelemetryFlusher {
        self.try_init()
            .expect("failed to initialize unifi-cellular-telemetry")
    }
}

/// Allows flushing all telemetry logs.
#[must_use = "call .flush at the end of the program, otherwise logs may get lost"]
pub struct TelemetryFlusher {
    _private: (),
}

impl TelemetryFlusher {
    /// Call this at the end of the program.
    pub async fn flush(self) {
        // technically blocks, but no one really cares for stderr/out.
        self.flush_blocking();
    }

    /// Call this at the end of the program.
    pub fn flush_blocking(self) {
        std::io::stderr().flush().ok();
        std::io::stdout().flush().ok();
    }
}
