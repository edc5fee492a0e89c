//! Track Auditor entry point
//!
//! Runs one audit cycle at startup, then keeps auditing on the configured
//! interval until interrupted.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use track_auditor::app::build_auditor;
use track_auditor::cli::CliOptions;
use track_auditor::config::Config;
use track_auditor::jobs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "track_auditor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let mut config = Config::from_env()?;
    CliOptions::from_args().apply(&mut config);

    tracing::info!(
        run_once = config.run_once,
        poll_interval_hours = config.poll_interval_hours,
        "Starting Track Auditor"
    );

    let auditor = Arc::new(build_auditor(&config).await?);

    if config.run_once {
        auditor.run_cycle().await?;
        return Ok(());
    }

    jobs::run_logged_cycle(&auditor).await;

    let mut scheduler = jobs::start_scheduler(auditor, config.poll_interval()).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    scheduler.shutdown().await?;

    Ok(())
}
