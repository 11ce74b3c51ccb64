use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::{BlogPostId, TopicId};

/// A published post produced from one queued topic.
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: BlogPostId,
    pub queue_item_id: Option<TopicId>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub category: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub queue_item_id: TopicId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub category: String,
}

impl BlogPost {
    pub async fn create(post: &NewBlogPost, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO blog_posts (
                id, queue_item_id, title, slug, content, excerpt,
                meta_description, keywords, category, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'published')
            RETURNING *
            "#,
        )
        .bind(BlogPostId::new())
        .bind(post.queue_item_id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.meta_description)
        .bind(&post.keywords)
        .bind(&post.category)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_queue_item(id: TopicId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM blog_posts WHERE queue_item_id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }
}
