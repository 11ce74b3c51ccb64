//! Typed ID definitions for the run/queue entities.

pub use super::id::Id;

/// Marker type for daily blog runs.
pub struct Run;

/// Marker type for queued blog topics.
pub struct Topic;

/// Marker type for generated blog posts.
pub struct BlogPost;

pub type RunId = Id<Run>;
pub type TopicId = Id<Topic>;
pub type BlogPostId = Id<BlogPost>;
