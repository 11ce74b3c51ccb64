//! Quality gate applied to generated drafts before they are published.
//!
//! Scoring starts at 100. Errors reject the draft outright; warnings only
//! cost points. A draft passes with no errors and a score of at least 60.

use serde::Deserialize;

use crate::common::utils::word_count;

pub const MIN_WORDS: usize = 500;
pub const TARGET_MIN_WORDS: usize = 700;
pub const MAX_WORDS: usize = 1200;
pub const PASSING_SCORE: i32 = 60;

/// Post body as returned by the generation model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub score: i32,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.score >= PASSING_SCORE
    }
}

pub fn validate_draft(draft: &PostDraft) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut score = 100;

    let words = word_count(&draft.content);
    if words < MIN_WORDS {
        errors.push(format!(
            "Content too short: {} words (minimum {})",
            words, MIN_WORDS
        ));
        score -= 30;
    } else if words < TARGET_MIN_WORDS {
        warnings.push(format!("Content below target: {} words", words));
        score -= 10;
    } else if words > MAX_WORDS {
        warnings.push(format!("Content too long: {} words", words));
        score -= 5;
    }

    let title_len = draft.title.chars().count();
    if title_len < 30 {
        warnings.push(format!("Title too short: {} chars", title_len));
        score -= 5;
    } else if title_len > 70 {
        warnings.push(format!("Title too long: {} chars", title_len));
        score -= 5;
    }

    let meta_len = draft.meta_description.chars().count();
    if meta_len < 120 {
        warnings.push(format!("Meta description too short: {} chars", meta_len));
        score -= 5;
    } else if meta_len > 170 {
        warnings.push(format!("Meta description too long: {} chars", meta_len));
        score -= 5;
    }

    if draft.title.trim().is_empty() {
        errors.push("Missing title".to_string());
        score -= 20;
    }
    if draft.content.trim().is_empty() {
        errors.push("Missing content".to_string());
        score -= 30;
    }
    if draft.excerpt.trim().is_empty() {
        warnings.push("Missing excerpt".to_string());
        score -= 5;
    }

    if draft.keywords.len() < 3 {
        warnings.push("Insufficient keywords (minimum 3 recommended)".to_string());
        score -= 5;
    }

    ValidationReport {
        errors,
        warnings,
        score,
    }
}
