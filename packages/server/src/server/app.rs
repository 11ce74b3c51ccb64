//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    drain_handler, enqueue_topics_handler, get_run_handler, health_handler, list_runs_handler,
    queue_stats_handler, reconcile_handler, terminate_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
pub fn build_app(deps: Arc<ServerDeps>) -> Router {
    let app_state = AppState { deps };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/runs", get(list_runs_handler))
        .route("/api/runs/drain", post(drain_handler))
        .route("/api/runs/reconcile", post(reconcile_handler))
        .route("/api/runs/terminate", post(terminate_handler))
        .route("/api/runs/:id", get(get_run_handler))
        .route("/api/topics", post(enqueue_topics_handler))
        .route("/api/topics/stats", get(queue_stats_handler))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
