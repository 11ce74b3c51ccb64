//! Daily blog run model.
//!
//! A run is one execution of the batch generation job. Rows are never
//! deleted; they double as the audit trail operators read from the admin
//! surface.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::RunId;

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "daily_blog_run_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// Allowed edges: `running -> completed`, `running -> failed`,
    /// `completed -> failed`. Nothing leaves `failed`.
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (RunStatus::Running, RunStatus::Completed)
                | (RunStatus::Running, RunStatus::Failed)
                | (RunStatus::Completed, RunStatus::Failed)
        )
    }

    pub fn is_failed(self) -> bool {
        self == RunStatus::Failed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Model
// ============================================================================

#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBlogRun {
    pub id: RunId,
    pub status: RunStatus,
    /// Batch size the run was started with
    pub target_count: i32,
    pub blogs_created: i32,
    pub blogs_failed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl DailyBlogRun {
    /// A fresh `running` run with zeroed counters.
    pub fn start(target_count: i32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RunId::new(),
            status: RunStatus::Running,
            target_count,
            blogs_created: 0,
            blogs_failed: 0,
            error_message: None,
            created_at,
            updated_at: created_at,
            completed_at: None,
        }
    }

    /// No topic outcome has been recorded against this run.
    pub fn has_no_progress(&self) -> bool {
        self.blogs_created == 0 && self.blogs_failed == 0
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO daily_blog_runs (
                id, status, target_count, blogs_created, blogs_failed,
                error_message, created_at, updated_at, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.status)
        .bind(self.target_count)
        .bind(self.blogs_created)
        .bind(self.blogs_failed)
        .bind(&self.error_message)
        .bind(self.created_at)
        .bind(self.updated_at)
        .bind(self.completed_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: RunId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM daily_blog_runs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn list_recent(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM daily_blog_runs
             ORDER BY created_at DESC, id DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Atomic `blogs_created + 1`.
    pub async fn increment_created(id: RunId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "UPDATE daily_blog_runs
             SET blogs_created = blogs_created + 1, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Atomic `blogs_failed + 1`.
    pub async fn increment_failed(id: RunId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "UPDATE daily_blog_runs
             SET blogs_failed = blogs_failed + 1, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// `running -> completed`. Returns `None` when the run already left
    /// `running` (terminated or reconciled underneath the controller).
    pub async fn mark_completed(id: RunId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE daily_blog_runs
             SET status = 'completed', completed_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = 'running'
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Fail `running` runs created before `created_before` with zero progress.
    pub async fn fail_timed_out(
        created_before: DateTime<Utc>,
        message: &str,
        pool: &PgPool,
    ) -> Result<Vec<RunId>> {
        sqlx::query_scalar::<_, RunId>(
            "UPDATE daily_blog_runs
             SET status = 'failed', error_message = $2, completed_at = NOW(), updated_at = NOW()
             WHERE status = 'running'
               AND created_at < $1
               AND blogs_created = 0
               AND blogs_failed = 0
             RETURNING id",
        )
        .bind(created_before)
        .bind(message)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Downgrade `completed` runs that recorded no outcome at all.
    pub async fn fail_empty_completed(message: &str, pool: &PgPool) -> Result<Vec<RunId>> {
        sqlx::query_scalar::<_, RunId>(
            "UPDATE daily_blog_runs
             SET status = 'failed', error_message = $1, updated_at = NOW()
             WHERE status = 'completed'
               AND blogs_created = 0
               AND blogs_failed = 0
             RETURNING id",
        )
        .bind(message)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Force `failed` regardless of the current status.
    pub async fn terminate(id: RunId, message: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE daily_blog_runs
             SET status = 'failed',
                 error_message = $2,
                 completed_at = COALESCE(completed_at, NOW()),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(message)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}
