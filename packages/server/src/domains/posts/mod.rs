//! Published blog posts and the quality gate drafts pass through.

pub mod models;
pub mod validation;

pub use models::{BlogPost, NewBlogPost};
pub use validation::{validate_draft, PostDraft, ValidationReport};
