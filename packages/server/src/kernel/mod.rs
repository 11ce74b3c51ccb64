//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod generation;
pub mod openai_generator;
pub mod postgres_stores;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use generation::{GeneratedPost, GenerationError};
pub use openai_generator::OpenAiBlogGenerator;
pub use postgres_stores::{PostgresRunStore, PostgresTopicStore};
pub use test_dependencies::{
    FixedClock, InMemoryRunStore, InMemoryTopicStore, MockBlogGenerator, TestDependencies,
};
pub use traits::*;
