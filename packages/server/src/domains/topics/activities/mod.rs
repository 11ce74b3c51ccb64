//! Feeding and inspecting the generation queue.

use tracing::info;

use crate::domains::runs::errors::{RunError, RunResult};
use crate::domains::topics::models::{NewTopic, QueueCounts, QueuedTopic};
use crate::kernel::ServerDeps;

/// Queue topics as `pending`. Rejects the whole request if any title is blank.
pub async fn enqueue_topics(
    topics: Vec<NewTopic>,
    deps: &ServerDeps,
) -> RunResult<Vec<QueuedTopic>> {
    if topics.is_empty() {
        return Err(RunError::invalid("topics must not be empty"));
    }

    let topics: Vec<NewTopic> = topics
        .into_iter()
        .enumerate()
        .map(|(index, mut topic)| {
            topic.title = topic.title.trim().to_string();
            if topic.title.is_empty() {
                Err(RunError::invalid(format!("topics[{}].title is required", index)))
            } else {
                Ok(topic)
            }
        })
        .collect::<RunResult<_>>()?;

    let queued = deps
        .topics
        .enqueue(&topics)
        .await
        .map_err(RunError::store)?;
    info!(count = queued.len(), "Queued blog topics");
    Ok(queued)
}

pub async fn queue_stats(deps: &ServerDeps) -> RunResult<QueueCounts> {
    deps.topics.counts().await.map_err(RunError::store)
}
