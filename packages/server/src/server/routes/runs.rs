//! Operator endpoints for daily runs.
//!
//! POST /api/runs/drain       start a run and drain one batch
//! POST /api/runs/reconcile   stuck-run sweep
//! POST /api/runs/terminate   force a run to failed
//! GET  /api/runs             recent runs
//! GET  /api/runs/:id         one run

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domains::runs::activities::{
    drain_batch, get_run, list_runs, parse_run_id, reconcile_stuck_runs, terminate_run,
    DrainReport, ReconcileReport, TerminateOutcome,
};
use crate::domains::runs::{DailyBlogRun, RunError};
use crate::server::app::AppState;

pub async fn drain_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<DrainReport>, RunError> {
    drain_batch(&state.deps).await.map(Json)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub timeout_minutes: Option<f64>,
}

impl ReconcileRequest {
    /// An empty body means "use the default timeout"; anything else must
    /// parse.
    pub fn from_body(body: &[u8]) -> Result<Self, RunError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| RunError::invalid(format!("Invalid reconcile request: {}", e)))
    }
}

pub async fn reconcile_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<ReconcileReport>, RunError> {
    let request = ReconcileRequest::from_body(&body)?;
    reconcile_stuck_runs(request.timeout_minutes, &state.deps)
        .await
        .map(Json)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateRequest {
    pub run_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TerminateResponse {
    pub success: bool,
    pub run: Option<DailyBlogRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn terminate_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<TerminateRequest>>,
) -> Result<Json<TerminateResponse>, RunError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let run_id = parse_run_id(request.run_id.as_deref())?;

    let response = match terminate_run(run_id, request.reason.as_deref(), &state.deps).await? {
        TerminateOutcome::Terminated(run) => TerminateResponse {
            success: true,
            run: Some(run),
            message: None,
        },
        TerminateOutcome::NotFound => TerminateResponse {
            success: true,
            run: None,
            message: Some("Run not found".to_string()),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListRunsQuery {
    pub limit: Option<i64>,
}

pub async fn list_runs_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ListRunsQuery>,
) -> Result<Json<Vec<DailyBlogRun>>, RunError> {
    list_runs(query.limit, &state.deps).await.map(Json)
}

pub async fn get_run_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Response, RunError> {
    let run_id = parse_run_id(Some(&id))?;
    Ok(match get_run(run_id, &state.deps).await? {
        Some(run) => Json(run).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Run not found" })),
        )
            .into_response(),
    })
}
