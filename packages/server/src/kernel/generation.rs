//! Outcome types for the generation backend.
//!
//! Every backend failure, whatever shape the provider reported it in, is
//! folded into [`GenerationError`] before it reaches the run controller.

use std::time::Duration;

use openai_client::OpenAIError;
use serde::Serialize;
use thiserror::Error;

use crate::common::BlogPostId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    pub word_count: usize,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Rate limited by generation backend: {0}")]
    RateLimited(String),

    #[error("Generation backend requires payment: {0}")]
    PaymentRequired(String),

    #[error("Generation API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Invalid response from generation backend: {0}")]
    InvalidResponse(String),

    #[error("Content validation failed: {0}")]
    ContentRejected(String),

    #[error("Failed to save post: {0}")]
    Persistence(String),
}

impl GenerationError {
    /// Short machine-readable kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::RateLimited(_) => "rate_limited",
            GenerationError::PaymentRequired(_) => "payment_required",
            GenerationError::Api { .. } => "api",
            GenerationError::Network(_) => "network",
            GenerationError::Timeout(_) => "timeout",
            GenerationError::InvalidResponse(_) => "invalid_response",
            GenerationError::ContentRejected(_) => "content_rejected",
            GenerationError::Persistence(_) => "persistence",
        }
    }
}

impl From<OpenAIError> for GenerationError {
    fn from(error: OpenAIError) -> Self {
        match error {
            OpenAIError::Api { status: 429, message } => GenerationError::RateLimited(message),
            OpenAIError::Api { status: 402, message } => GenerationError::PaymentRequired(message),
            OpenAIError::Api { status, message } => GenerationError::Api { status, message },
            OpenAIError::Network(message) => GenerationError::Network(message),
            OpenAIError::Parse(message) => GenerationError::InvalidResponse(message),
        }
    }
}
