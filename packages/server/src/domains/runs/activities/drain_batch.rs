//! Batch drain: one run, up to `batch_size` topics.
//!
//! Topics are claimed (and durably `processing`) before any generation
//! starts. Each topic's outcome is written to the run counters and the
//! queue as soon as it is known, so a crash mid-batch leaves an accurate
//! partial record. A failing topic never aborts the batch.

use serde::Serialize;
use tracing::{info, warn};

use crate::common::{RunId, TopicId};
use crate::domains::runs::errors::{RunError, RunResult};
use crate::domains::runs::models::{DailyBlogRun, RunStatus};
use crate::domains::topics::models::QueuedTopic;
use crate::kernel::{GeneratedPost, GenerationError, ServerDeps};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicFailure {
    pub topic_id: TopicId,
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub run_id: RunId,
    /// Topics claimed by this run
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Claims handed back to the queue unprocessed after termination
    pub released: usize,
    /// The run was moved out of `running` by someone else before it finished
    pub terminated: bool,
    pub errors: Vec<TopicFailure>,
}

impl DrainReport {
    fn new(run_id: RunId, total: usize) -> Self {
        Self {
            run_id,
            total,
            successful: 0,
            failed: 0,
            released: 0,
            terminated: false,
            errors: Vec::new(),
        }
    }
}

pub async fn drain_batch(deps: &ServerDeps) -> RunResult<DrainReport> {
    if deps.batch_size < 1 {
        return Err(RunError::invalid(format!(
            "batch size must be at least 1 (got {})",
            deps.batch_size
        )));
    }
    let target = i32::try_from(deps.batch_size).unwrap_or(i32::MAX);
    let run = deps
        .runs
        .insert(&DailyBlogRun::start(target, deps.clock.now()))
        .await
        .map_err(RunError::store)?;
    info!(run_id = %run.id, batch_size = deps.batch_size, "Daily blog run started");

    let topics = deps
        .topics
        .claim_batch(run.id, deps.batch_size)
        .await
        .map_err(RunError::store)?;
    info!(run_id = %run.id, claimed = topics.len(), "Claimed topics");

    let mut report = DrainReport::new(run.id, topics.len());

    for (index, topic) in topics.iter().enumerate() {
        if !still_running(deps, run.id).await? {
            let unstarted: Vec<TopicId> = topics[index..].iter().map(|t| t.id).collect();
            let released = deps
                .topics
                .release(run.id, &unstarted)
                .await
                .map_err(RunError::store)?;
            warn!(
                run_id = %run.id,
                processed = index,
                released,
                "Run was terminated mid-batch, stopping"
            );
            report.released = usize::try_from(released).unwrap_or(unstarted.len());
            report.terminated = true;
            return Ok(report);
        }

        match generate(deps, topic).await {
            Ok(post) => {
                deps.runs
                    .increment_created(run.id)
                    .await
                    .map_err(RunError::store)?;
                let marked = deps
                    .topics
                    .mark_done(topic.id)
                    .await
                    .map_err(RunError::store)?;
                if !marked {
                    warn!(topic_id = %topic.id, "Topic was no longer processing when marked done");
                }
                info!(
                    run_id = %run.id,
                    topic_id = %topic.id,
                    slug = %post.slug,
                    words = post.word_count,
                    "Blog post generated"
                );
                report.successful += 1;
            }
            Err(e) => {
                let message = e.to_string();
                deps.runs
                    .increment_failed(run.id)
                    .await
                    .map_err(RunError::store)?;
                deps.topics
                    .mark_failed(topic.id, &message)
                    .await
                    .map_err(RunError::store)?;
                warn!(
                    run_id = %run.id,
                    topic_id = %topic.id,
                    kind = e.kind(),
                    error = %message,
                    "Blog generation failed"
                );
                report.failed += 1;
                report.errors.push(TopicFailure {
                    topic_id: topic.id,
                    title: topic.title.clone(),
                    error: message,
                });
            }
        }
    }

    match deps.runs.complete(run.id).await.map_err(RunError::store)? {
        Some(_) => info!(
            run_id = %run.id,
            successful = report.successful,
            failed = report.failed,
            "Daily blog run completed"
        ),
        None => {
            warn!(run_id = %run.id, "Run left running state before completion, status kept");
            report.terminated = true;
        }
    }

    Ok(report)
}

async fn still_running(deps: &ServerDeps, run_id: RunId) -> RunResult<bool> {
    let run = deps
        .runs
        .find_by_id(run_id)
        .await
        .map_err(RunError::store)?;
    Ok(matches!(run, Some(run) if run.status == RunStatus::Running))
}

async fn generate(deps: &ServerDeps, topic: &QueuedTopic) -> Result<GeneratedPost, GenerationError> {
    match deps.generation_timeout {
        Some(limit) => tokio::time::timeout(limit, deps.generator.generate(topic))
            .await
            .unwrap_or(Err(GenerationError::Timeout(limit))),
        None => deps.generator.generate(topic).await,
    }
}
