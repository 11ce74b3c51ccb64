//! Postgres-backed run and topic stores.
//!
//! Thin adapters: the SQL lives on the models, these only satisfy the
//! kernel traits so activities never see a `PgPool`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{RunId, TopicId};
use crate::domains::runs::models::DailyBlogRun;
use crate::domains::topics::models::{NewTopic, QueueCounts, QueuedTopic};
use crate::kernel::{BaseRunStore, BaseTopicStore};

#[derive(Clone)]
pub struct PostgresRunStore {
    pool: PgPool,
}

impl PostgresRunStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseRunStore for PostgresRunStore {
    async fn insert(&self, run: &DailyBlogRun) -> Result<DailyBlogRun> {
        run.insert(&self.pool).await
    }

    async fn find_by_id(&self, id: RunId) -> Result<Option<DailyBlogRun>> {
        DailyBlogRun::find_by_id(id, &self.pool).await
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<DailyBlogRun>> {
        DailyBlogRun::list_recent(limit, &self.pool).await
    }

    async fn increment_created(&self, id: RunId) -> Result<()> {
        DailyBlogRun::increment_created(id, &self.pool).await
    }

    async fn increment_failed(&self, id: RunId) -> Result<()> {
        DailyBlogRun::increment_failed(id, &self.pool).await
    }

    async fn complete(&self, id: RunId) -> Result<Option<DailyBlogRun>> {
        DailyBlogRun::mark_completed(id, &self.pool).await
    }

    async fn fail_timed_out(
        &self,
        created_before: DateTime<Utc>,
        message: &str,
    ) -> Result<Vec<RunId>> {
        DailyBlogRun::fail_timed_out(created_before, message, &self.pool).await
    }

    async fn fail_empty_completed(&self, message: &str) -> Result<Vec<RunId>> {
        DailyBlogRun::fail_empty_completed(message, &self.pool).await
    }

    async fn terminate(&self, id: RunId, message: &str) -> Result<Option<DailyBlogRun>> {
        DailyBlogRun::terminate(id, message, &self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresTopicStore {
    pool: PgPool,
}

impl PostgresTopicStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseTopicStore for PostgresTopicStore {
    async fn enqueue(&self, topics: &[NewTopic]) -> Result<Vec<QueuedTopic>> {
        QueuedTopic::enqueue(topics, &self.pool).await
    }

    async fn claim_batch(&self, run_id: RunId, limit: i64) -> Result<Vec<QueuedTopic>> {
        QueuedTopic::claim_batch(run_id, limit, &self.pool).await
    }

    async fn mark_done(&self, id: TopicId) -> Result<bool> {
        QueuedTopic::mark_done(id, &self.pool).await
    }

    async fn mark_failed(&self, id: TopicId, error: &str) -> Result<bool> {
        QueuedTopic::mark_failed(id, error, &self.pool).await
    }

    async fn release(&self, run_id: RunId, ids: &[TopicId]) -> Result<u64> {
        QueuedTopic::release(run_id, ids, &self.pool).await
    }

    async fn counts(&self) -> Result<QueueCounts> {
        QueuedTopic::counts(&self.pool).await
    }
}
