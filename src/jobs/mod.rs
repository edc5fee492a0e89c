//! Background job scheduling

pub mod audit;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

pub use audit::{AuditSettings, Auditor, CycleSummary, FileError};

/// Run one cycle, logging instead of returning its error
pub async fn run_logged_cycle(auditor: &Auditor) {
    if let Err(e) = auditor.run_cycle().await {
        tracing::error!(error = %format!("{:#}", e), "Audit cycle failed");
    }
}

/// Initialize and start the job scheduler.
///
/// Cycles run every `interval`; a tick that fires while the previous cycle is
/// still running is skipped.
pub async fn start_scheduler(
    auditor: Arc<Auditor>,
    interval: Duration,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let running = Arc::new(Mutex::new(()));

    let audit_job = Job::new_repeated_async(interval, move |_uuid, _l| {
        let auditor = auditor.clone();
        let running = running.clone();
        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                warn!("Previous audit cycle still running, skipping this tick");
                return;
            };
            run_logged_cycle(&auditor).await;
        })
    })?;
    scheduler.add(audit_job).await?;

    scheduler.start().await?;

    info!(interval_secs = interval.as_secs(), "Job scheduler started");
    Ok(scheduler)
}
