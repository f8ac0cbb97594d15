use clap::Parser as _;
use color_eyre::eyre::{Result, WrapErr as _};
use tokio::signal::unix::{self, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use unifi_cellular::{
    args::{Args, Command},
    controller::ControllerClient,
    settings::{Settings, ENV_PREFIX},
    setup,
};

const SYSLOG_IDENTIFIER: &str = "unifi-cellular";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let tel_flusher = unifi_cellular_telemetry::TelemetryConfig::new()
        .with_journald(SYSLOG_IDENTIFIER)
        .init();

    let result = async {
        let args = Args::parse();
        let settings = Settings::get(&args, &args.config, ENV_PREFIX)
            .wrap_err("failed to load settings")?;

        match args.command {
            Command::Run => run(settings).await,
            Command::Validate => validate(&settings).await,
            Command::Snapshot { raw } => {
                let output = unifi_cellular::snapshot(&settings, raw).await?;
                println!("{}", serde_json::to_string_pretty(&output)?);
                Ok(())
            }
        }
    }
    .await;

    tel_flusher.flush().await;

    result
}

async fn run(settings: Settings) -> Result<()> {
    let shutdown_token = CancellationToken::new();
    let tasks = unifi_cellular::program()
        .settings(settings)
        .shutdown_token(shutdown_token.clone())
        .run()
        .await?;

    let mut sigterm = unix::signal(SignalKind::terminate())?;
    let mut sigint = unix::signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => warn!("received SIGTERM"),
        _ = sigint.recv()  => warn!("received SIGINT"),
    }

    info!("stopping tasks and exiting gracefully");
    shutdown_token.cancel();

    for handle in tasks {
        handle.await.wrap_err("task panicked")??;
    }

    Ok(())
}

async fn validate(settings: &Settings) -> Result<()> {
    let client = ControllerClient::new(settings).wrap_err("invalid controller settings")?;

    match setup::validate(&client).await {
        Ok(info) => {
            println!("{}\t{}", info.title, info.mac);
            Ok(())
        }
        Err(e) => {
            println!("{}", e.code());
            Err(e).wrap_err("the controller rejected the configuration")
        }
    }
}
