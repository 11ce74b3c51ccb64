//! Stuck-run sweep.
//!
//! Two independent rules, both only ever moving runs to `failed`:
//! - `running` past the timeout with nothing recorded
//! - `completed` with nothing recorded
//!
//! Runs that are already `failed` match neither rule, so a repeated sweep
//! is a no-op.

use serde::Serialize;
use tracing::{info, warn};

use crate::domains::runs::errors::{RunError, RunResult};
use crate::kernel::ServerDeps;

pub const TIMED_OUT_MESSAGE: &str = "Generation process timed out or did not complete";
pub const EMPTY_RUN_MESSAGE: &str = "No blogs were created during this run";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub timed_out_updated: usize,
    pub zero_completed_updated: usize,
}

/// Sweep with `timeout_minutes`, or the configured default when `None`.
///
/// Fractional minutes are honoured to the millisecond.
pub async fn reconcile_stuck_runs(
    timeout_minutes: Option<f64>,
    deps: &ServerDeps,
) -> RunResult<ReconcileReport> {
    let minutes = timeout_minutes.unwrap_or(deps.stuck_run_timeout_minutes as f64);
    let window = timeout_window(minutes)?;
    let cutoff = deps
        .clock
        .now()
        .checked_sub_signed(window)
        .ok_or_else(|| RunError::invalid("timeoutMinutes is too large"))?;

    let timed_out = deps
        .runs
        .fail_timed_out(cutoff, TIMED_OUT_MESSAGE)
        .await
        .map_err(RunError::store)?;
    for run_id in &timed_out {
        warn!(run_id = %run_id, timeout_minutes = minutes, "Marked stuck run as failed");
    }

    let empty = deps
        .runs
        .fail_empty_completed(EMPTY_RUN_MESSAGE)
        .await
        .map_err(RunError::store)?;
    for run_id in &empty {
        warn!(run_id = %run_id, "Marked empty completed run as failed");
    }

    let report = ReconcileReport {
        timed_out_updated: timed_out.len(),
        zero_completed_updated: empty.len(),
    };
    info!(
        timed_out = report.timed_out_updated,
        zero_completed = report.zero_completed_updated,
        "Stuck-run reconcile finished"
    );
    Ok(report)
}

fn timeout_window(minutes: f64) -> RunResult<chrono::Duration> {
    if !minutes.is_finite() {
        return Err(RunError::invalid("timeoutMinutes must be a finite number"));
    }
    if minutes < 0.0 {
        return Err(RunError::invalid("timeoutMinutes must not be negative"));
    }
    let millis = (minutes * 60_000.0).round();
    if millis >= i64::MAX as f64 {
        return Err(RunError::invalid("timeoutMinutes is too large"));
    }
    chrono::Duration::try_milliseconds(millis as i64)
        .ok_or_else(|| RunError::invalid("timeoutMinutes is too large"))
}
