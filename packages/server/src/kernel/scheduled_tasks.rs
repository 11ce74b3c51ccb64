//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler
//!     ├─► daily run (DAILY_RUN_CRON)       └─► drain_batch()
//!     └─► stuck-run sweep (RECONCILE_CRON) └─► reconcile_stuck_runs()
//! ```
//!
//! Each tick is an independent invocation; failures are logged and the
//! next tick retries naturally.

use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::runs::activities::{drain_batch, reconcile_stuck_runs};
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(
    deps: Arc<ServerDeps>,
    daily_run_cron: &str,
    reconcile_cron: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let drain_deps = deps.clone();
    let drain_job = Job::new_async(daily_run_cron, move |_uuid, _lock| {
        let deps = drain_deps.clone();
        Box::pin(async move {
            match drain_batch(&deps).await {
                Ok(report) => tracing::info!(
                    run_id = %report.run_id,
                    total = report.total,
                    successful = report.successful,
                    failed = report.failed,
                    "Scheduled daily run finished"
                ),
                Err(e) => tracing::error!("Scheduled daily run failed: {}", e),
            }
        })
    })?;
    scheduler.add(drain_job).await?;

    let reconcile_deps = deps.clone();
    let reconcile_job = Job::new_async(reconcile_cron, move |_uuid, _lock| {
        let deps = reconcile_deps.clone();
        Box::pin(async move {
            if let Err(e) = reconcile_stuck_runs(None, &deps).await {
                tracing::error!("Scheduled stuck-run reconcile failed: {}", e);
            }
        })
    })?;
    scheduler.add(reconcile_job).await?;

    scheduler.start().await?;

    tracing::info!(
        daily_run = daily_run_cron,
        reconcile = reconcile_cron,
        "Scheduled tasks started"
    );
    Ok(scheduler)
}
