//! Blog generation queue.
//!
//! Each row is one post to write. Rows move `pending -> processing` when a
//! run claims them and end in `done` or `failed` once that run records the
//! outcome.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use typed_builder::TypedBuilder;

use crate::common::{RunId, TopicId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "topic_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    #[default]
    Pending,
    Processing,
    Done,
    Failed,
}

#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedTopic {
    pub id: TopicId,
    /// Run that claimed this topic; set at claim time
    pub run_id: Option<RunId>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub status: TopicStatus,
    /// Number of times the topic has been claimed
    pub attempts: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for queueing a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct NewTopic {
    pub title: String,
    #[serde(default)]
    #[builder(default)]
    pub description: String,
    #[serde(default = "default_category")]
    #[builder(default = default_category())]
    pub category: String,
    #[serde(default)]
    #[builder(default)]
    pub keywords: Vec<String>,
}

fn default_category() -> String {
    "technology".to_string()
}

/// Queue size per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub pending: i64,
    pub processing: i64,
    pub done: i64,
    pub failed: i64,
}

impl QueuedTopic {
    /// Materialize a pending row from input (used by in-memory queues).
    pub fn pending(topic: NewTopic, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TopicId::new(),
            run_id: None,
            title: topic.title,
            description: topic.description,
            category: topic.category,
            keywords: topic.keywords,
            status: TopicStatus::Pending,
            attempts: 0,
            error_message: None,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    pub async fn enqueue(topics: &[NewTopic], pool: &PgPool) -> Result<Vec<Self>> {
        let mut tx = pool.begin().await?;
        let mut queued = Vec::with_capacity(topics.len());

        for topic in topics {
            let row = sqlx::query_as::<_, Self>(
                "INSERT INTO blog_generation_queue (id, title, description, category, keywords, status)
                 VALUES ($1, $2, $3, $4, $5, 'pending')
                 RETURNING *",
            )
            .bind(TopicId::new())
            .bind(&topic.title)
            .bind(&topic.description)
            .bind(&topic.category)
            .bind(&topic.keywords)
            .fetch_one(&mut *tx)
            .await?;
            queued.push(row);
        }

        tx.commit().await?;
        Ok(queued)
    }

    /// Claim up to `limit` pending topics for `run_id`, oldest first.
    ///
    /// `FOR UPDATE SKIP LOCKED` makes the pending -> processing flip the
    /// linearization point: overlapping claimers never see the same row.
    pub async fn claim_batch(run_id: RunId, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let mut claimed = sqlx::query_as::<_, Self>(
            r#"
            WITH next_topics AS (
                SELECT id
                FROM blog_generation_queue
                WHERE status = 'pending'
                ORDER BY created_at, id
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE blog_generation_queue q
            SET status = 'processing',
                run_id = $2,
                attempts = q.attempts + 1,
                started_at = NOW(),
                error_message = NULL
            FROM next_topics
            WHERE q.id = next_topics.id
            RETURNING q.*
            "#,
        )
        .bind(limit)
        .bind(run_id)
        .fetch_all(pool)
        .await?;

        // RETURNING carries no ordering guarantee
        claimed.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(claimed)
    }

    /// `processing -> done`. False if the topic was not in flight.
    pub async fn mark_done(id: TopicId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE blog_generation_queue
             SET status = 'done', completed_at = NOW(), error_message = NULL
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// `processing -> failed` with the generation error.
    pub async fn mark_failed(id: TopicId, error: &str, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE blog_generation_queue
             SET status = 'failed', completed_at = NOW(), error_message = $2
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hand claimed-but-unstarted topics back to the queue.
    pub async fn release(run_id: RunId, ids: &[TopicId], pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE blog_generation_queue
             SET status = 'pending', run_id = NULL, started_at = NULL
             WHERE id = ANY($1) AND run_id = $2 AND status = 'processing'",
        )
        .bind(ids)
        .bind(run_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn counts(pool: &PgPool) -> Result<QueueCounts> {
        let rows = sqlx::query_as::<_, (TopicStatus, i64)>(
            "SELECT status, COUNT(*) FROM blog_generation_queue GROUP BY status",
        )
        .fetch_all(pool)
        .await?;

        Ok(QueueCounts::from_rows(rows))
    }
}

impl QueueCounts {
    pub fn from_rows(rows: impl IntoIterator<Item = (TopicStatus, i64)>) -> Self {
        let mut counts = Self::default();
        for (status, n) in rows {
            match status {
                TopicStatus::Pending => counts.pending += n,
                TopicStatus::Processing => counts.processing += n,
                TopicStatus::Done => counts.done += n,
                TopicStatus::Failed => counts.failed += n,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_topic_defaults_from_minimal_json() {
        let topic: NewTopic = serde_json::from_str(r#"{"title": "Edge AI"}"#).unwrap();
        assert_eq!(topic.title, "Edge AI");
        assert_eq!(topic.category, "technology");
        assert!(topic.keywords.is_empty());
    }

    #[test]
    fn builder_matches_serde_defaults() {
        let built = NewTopic::builder().title("Edge AI").build();
        let parsed: NewTopic = serde_json::from_str(r#"{"title": "Edge AI"}"#).unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn pending_topic_has_no_owner() {
        let topic = QueuedTopic::pending(NewTopic::builder().title("t").build(), Utc::now());
        assert_eq!(topic.status, TopicStatus::Pending);
        assert!(topic.run_id.is_none());
        assert_eq!(topic.attempts, 0);
    }

    #[test]
    fn counts_fold_status_rows() {
        let counts = QueueCounts::from_rows(vec![
            (TopicStatus::Pending, 4),
            (TopicStatus::Done, 7),
            (TopicStatus::Failed, 1),
        ]);
        assert_eq!(
            counts,
            QueueCounts {
                pending: 4,
                processing: 0,
                done: 7,
                failed: 1
            }
        );
    }
}
