pub mod topic;

pub use topic::{NewTopic, QueueCounts, QueuedTopic, TopicStatus};
