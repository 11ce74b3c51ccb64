//! Operator kill switch for a single run.

use tracing::{info, warn};

use crate::common::RunId;
use crate::domains::runs::errors::{RunError, RunResult};
use crate::domains::runs::models::DailyBlogRun;
use crate::kernel::ServerDeps;

pub const DEFAULT_TERMINATION_REASON: &str = "Terminated by admin";

#[derive(Debug, Clone, PartialEq)]
pub enum TerminateOutcome {
    Terminated(DailyBlogRun),
    NotFound,
}

/// Parse a raw run id from an operator surface.
pub fn parse_run_id(raw: Option<&str>) -> RunResult<RunId> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RunError::invalid("runId is required"))?;
    RunId::parse(raw).map_err(|_| RunError::invalid(format!("runId is not a valid id: {}", raw)))
}

/// Force the run to `failed` whatever its current status.
///
/// A blank reason falls back to [`DEFAULT_TERMINATION_REASON`].
pub async fn terminate_run(
    run_id: RunId,
    reason: Option<&str>,
    deps: &ServerDeps,
) -> RunResult<TerminateOutcome> {
    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_TERMINATION_REASON);

    match deps
        .runs
        .terminate(run_id, reason)
        .await
        .map_err(RunError::store)?
    {
        Some(run) => {
            warn!(run_id = %run_id, reason, "Run terminated");
            Ok(TerminateOutcome::Terminated(run))
        }
        None => {
            info!(run_id = %run_id, "Terminate requested for unknown run");
            Ok(TerminateOutcome::NotFound)
        }
    }
}
