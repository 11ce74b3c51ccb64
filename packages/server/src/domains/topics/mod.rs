pub mod activities;
pub mod models;

pub use activities::{enqueue_topics, queue_stats};
pub use models::{NewTopic, QueueCounts, QueuedTopic, TopicStatus};
