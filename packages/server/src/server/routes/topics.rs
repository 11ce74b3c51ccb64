use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::domains::runs::RunError;
use crate::domains::topics::{enqueue_topics, queue_stats, NewTopic, QueueCounts, QueuedTopic};
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct EnqueueTopicsRequest {
    pub topics: Vec<NewTopic>,
}

#[derive(Debug, Serialize)]
pub struct EnqueueTopicsResponse {
    pub queued: usize,
    pub topics: Vec<QueuedTopic>,
}

pub async fn enqueue_topics_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<EnqueueTopicsRequest>,
) -> Result<(StatusCode, Json<EnqueueTopicsResponse>), RunError> {
    let topics = enqueue_topics(request.topics, &state.deps).await?;
    Ok((
        StatusCode::CREATED,
        Json(EnqueueTopicsResponse {
            queued: topics.len(),
            topics,
        }),
    ))
}

pub async fn queue_stats_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<QueueCounts>, RunError> {
    queue_stats(&state.deps).await.map(Json)
}
