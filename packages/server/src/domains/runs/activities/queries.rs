use crate::common::RunId;
use crate::domains::runs::errors::{RunError, RunResult};
use crate::domains::runs::models::DailyBlogRun;
use crate::kernel::ServerDeps;

pub const DEFAULT_RUN_LIST_LIMIT: i64 = 20;
pub const MAX_RUN_LIST_LIMIT: i64 = 100;

pub async fn get_run(run_id: RunId, deps: &ServerDeps) -> RunResult<Option<DailyBlogRun>> {
    deps.runs.find_by_id(run_id).await.map_err(RunError::store)
}

/// Most recent runs first. The limit is clamped to `1..=100`.
pub async fn list_runs(limit: Option<i64>, deps: &ServerDeps) -> RunResult<Vec<DailyBlogRun>> {
    let limit = limit
        .unwrap_or(DEFAULT_RUN_LIST_LIMIT)
        .clamp(1, MAX_RUN_LIST_LIMIT);
    deps.runs.list_recent(limit).await.map_err(RunError::store)
}
