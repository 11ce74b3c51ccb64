// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The run lifecycle (drain, reconcile, terminate) lives in domain activities
// that take these traits through ServerDeps.
//
// Naming convention: Base* for trait names (e.g., BaseRunStore, BaseClock)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{RunId, TopicId};
use crate::domains::runs::models::DailyBlogRun;
use crate::domains::topics::models::{NewTopic, QueueCounts, QueuedTopic};
use crate::kernel::generation::{GeneratedPost, GenerationError};

// =============================================================================
// Run Record Store (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseRunStore: Send + Sync {
    async fn insert(&self, run: &DailyBlogRun) -> Result<DailyBlogRun>;

    async fn find_by_id(&self, id: RunId) -> Result<Option<DailyBlogRun>>;

    /// Newest first
    async fn list_recent(&self, limit: i64) -> Result<Vec<DailyBlogRun>>;

    async fn increment_created(&self, id: RunId) -> Result<()>;

    async fn increment_failed(&self, id: RunId) -> Result<()>;

    /// Conditional `running -> completed`; `None` if the run is no longer running.
    async fn complete(&self, id: RunId) -> Result<Option<DailyBlogRun>>;

    /// `running`, created before the cutoff, zero counters -> `failed`.
    async fn fail_timed_out(
        &self,
        created_before: DateTime<Utc>,
        message: &str,
    ) -> Result<Vec<RunId>>;

    /// `completed` with zero counters -> `failed`.
    async fn fail_empty_completed(&self, message: &str) -> Result<Vec<RunId>>;

    /// Unconditional `-> failed`; `None` if no such run.
    async fn terminate(&self, id: RunId, message: &str) -> Result<Option<DailyBlogRun>>;

    /// Cheap reachability probe for health checks
    async fn ping(&self) -> Result<()>;
}

// =============================================================================
// Topic Queue Store (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseTopicStore: Send + Sync {
    async fn enqueue(&self, topics: &[NewTopic]) -> Result<Vec<QueuedTopic>>;

    /// Exclusively claim up to `limit` pending topics, oldest first.
    ///
    /// Claimed rows are `processing` and owned by `run_id` before this returns.
    async fn claim_batch(&self, run_id: RunId, limit: i64) -> Result<Vec<QueuedTopic>>;

    async fn mark_done(&self, id: TopicId) -> Result<bool>;

    async fn mark_failed(&self, id: TopicId, error: &str) -> Result<bool>;

    /// Put claims of `run_id` that were never worked on back to `pending`.
    async fn release(&self, run_id: RunId, ids: &[TopicId]) -> Result<u64>;

    async fn counts(&self) -> Result<QueueCounts>;
}

// =============================================================================
// Generation Backend (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseBlogGenerator: Send + Sync {
    /// Write and publish one post for the topic.
    async fn generate(&self, topic: &QueuedTopic) -> Result<GeneratedPost, GenerationError>;
}

// =============================================================================
// Clock
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BaseClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
