//! Generation backend backed by an OpenAI-compatible chat model.
//!
//! One chat completion per topic, JSON mode. The draft goes through the
//! quality gate and is then written to `blog_posts` as published.

use async_trait::async_trait;
use openai_client::{strip_code_blocks, ChatRequest, Message, OpenAIClient};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::common::utils::{generate_summary, slugify, word_count};
use crate::common::TopicId;
use crate::domains::posts::{validate_draft, BlogPost, NewBlogPost, PostDraft};
use crate::domains::topics::models::QueuedTopic;
use crate::kernel::generation::{GeneratedPost, GenerationError};
use crate::kernel::BaseBlogGenerator;

const SYSTEM_PROMPT: &str = "You are an expert technical writer who creates concise, \
high-quality blog content about AI, automation, and emerging technology. \
Always respond with a single valid JSON object.";

const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.7;
const SLUG_MAX_LEN: usize = 80;
const EXCERPT_MAX_LEN: usize = 150;
const META_MAX_LEN: usize = 160;

pub struct OpenAiBlogGenerator {
    client: OpenAIClient,
    model: String,
    pool: PgPool,
}

impl OpenAiBlogGenerator {
    pub fn new(client: OpenAIClient, model: impl Into<String>, pool: PgPool) -> Self {
        Self {
            client,
            model: model.into(),
            pool,
        }
    }
}

#[async_trait]
impl BaseBlogGenerator for OpenAiBlogGenerator {
    async fn generate(&self, topic: &QueuedTopic) -> Result<GeneratedPost, GenerationError> {
        let request = ChatRequest::new(&self.model)
            .message(Message::system(SYSTEM_PROMPT))
            .message(Message::user(build_prompt(topic)))
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .json_object();

        let response = self.client.chat_completion(request).await?;
        let draft = parse_draft(&response.content)?;

        let report = validate_draft(&draft);
        if !report.warnings.is_empty() {
            warn!(
                topic_id = %topic.id,
                score = report.score,
                warnings = ?report.warnings,
                "Generated draft has quality warnings"
            );
        }
        if !report.is_valid() {
            return Err(GenerationError::ContentRejected(format!(
                "score {}: {}",
                report.score,
                report.errors.join(", ")
            )));
        }

        let new_post = to_new_post(topic, draft);
        let words = word_count(&new_post.content);
        let post = BlogPost::create(&new_post, &self.pool)
            .await
            .map_err(|e| GenerationError::Persistence(e.to_string()))?;

        debug!(topic_id = %topic.id, post_id = %post.id, slug = %post.slug, "Blog post saved");

        Ok(GeneratedPost {
            id: post.id,
            title: post.title,
            slug: post.slug,
            word_count: words,
        })
    }
}

fn build_prompt(topic: &QueuedTopic) -> String {
    let mut prompt = format!(
        "Write a comprehensive blog post about: {}\n\nCategory: {}\n",
        topic.title, topic.category
    );
    if !topic.description.trim().is_empty() {
        prompt.push_str(&format!("Brief: {}\n", topic.description.trim()));
    }
    if !topic.keywords.is_empty() {
        prompt.push_str(&format!("Keywords: {}\n", topic.keywords.join(", ")));
    }
    prompt.push_str(
        r#"
Requirements:
- Word count: 700-1000 words
- Professional, engaging tone with practical insights and examples
- Clear H2/H3 structure in Markdown
- Natural keyword usage and a closing call-to-action

Return a JSON object with exactly these fields:
{
  "title": "Post title (60 chars max)",
  "content": "Full post in Markdown",
  "excerpt": "Brief summary (150 chars max)",
  "meta_description": "SEO meta description (160 chars max)",
  "keywords": ["keyword1", "keyword2", "keyword3"]
}"#,
    );
    prompt
}

/// Parse the model's reply into a draft. Tolerates code fences.
pub fn parse_draft(raw: &str) -> Result<PostDraft, GenerationError> {
    serde_json::from_str(strip_code_blocks(raw))
        .map_err(|e| GenerationError::InvalidResponse(format!("draft is not valid JSON: {}", e)))
}

/// Slug from the title plus a short suffix of the topic id, unique per topic.
pub fn post_slug(title: &str, topic_id: TopicId) -> String {
    let simple = topic_id.as_uuid().simple().to_string();
    let suffix = &simple[simple.len() - 8..];
    let base = slugify(title, SLUG_MAX_LEN);
    if base.is_empty() {
        format!("post-{}", suffix)
    } else {
        format!("{}-{}", base, suffix)
    }
}

fn to_new_post(topic: &QueuedTopic, draft: PostDraft) -> NewBlogPost {
    let excerpt = if draft.excerpt.trim().is_empty() {
        generate_summary(&draft.content, EXCERPT_MAX_LEN)
    } else {
        draft.excerpt
    };
    let meta_description = if draft.meta_description.trim().is_empty() {
        None
    } else {
        Some(draft.meta_description.chars().take(META_MAX_LEN).collect())
    };
    let keywords = if draft.keywords.is_empty() {
        topic.keywords.clone()
    } else {
        draft.keywords
    };

    NewBlogPost {
        queue_item_id: topic.id,
        slug: post_slug(&draft.title, topic.id),
        title: draft.title,
        content: draft.content,
        excerpt: Some(excerpt),
        meta_description,
        keywords,
        category: topic.category.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::topics::models::NewTopic;
    use chrono::Utc;

    fn topic() -> QueuedTopic {
        QueuedTopic::pending(
            NewTopic::builder()
                .title("Edge AI on the factory floor")
                .keywords(vec!["edge ai".to_string(), "iot".to_string()])
                .build(),
            Utc::now(),
        )
    }

    #[test]
    fn parse_draft_accepts_fenced_json() {
        let raw = "```json\n{\"title\": \"T\", \"content\": \"body\", \"keywords\": [\"a\"]}\n```";
        let draft = parse_draft(raw).unwrap();
        assert_eq!(draft.title, "T");
        assert_eq!(draft.keywords, vec!["a".to_string()]);
    }

    #[test]
    fn parse_draft_rejects_prose() {
        let err = parse_draft("Sure! Here is your post.").unwrap_err();
        assert_eq!(err.kind(), "invalid_response");
    }

    #[test]
    fn slug_is_suffixed_with_topic_id_tail() {
        let topic = topic();
        let slug = post_slug("Edge AI: What's Next?", topic.id);
        let simple = topic.id.as_uuid().simple().to_string();
        assert!(slug.starts_with("edge-ai-what-s-next-"));
        assert!(slug.ends_with(&simple[24..]));
    }

    #[test]
    fn untitled_slug_still_has_a_stem() {
        let topic = topic();
        assert!(post_slug("???", topic.id).starts_with("post-"));
    }

    #[test]
    fn new_post_falls_back_to_topic_keywords_and_summary_excerpt() {
        let topic = topic();
        let draft = PostDraft {
            title: "Edge AI".to_string(),
            content: "word ".repeat(300),
            ..PostDraft::default()
        };
        let post = to_new_post(&topic, draft);
        assert_eq!(post.keywords, topic.keywords);
        assert!(post.excerpt.as_deref().is_some_and(|e| e.chars().count() <= 150));
        assert!(post.meta_description.is_none());
        assert_eq!(post.category, "technology");
    }

    #[test]
    fn prompt_includes_topic_payload() {
        let prompt = build_prompt(&topic());
        assert!(prompt.contains("Edge AI on the factory floor"));
        assert!(prompt.contains("Keywords: edge ai, iot"));
        assert!(!prompt.contains("Brief:"));
    }
}
