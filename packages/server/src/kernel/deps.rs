//! Server dependencies for activities (using traits for testability)
//!
//! Central container handed to every run/queue activity. All external
//! collaborators sit behind trait objects so tests can swap in the
//! in-memory versions from `test_dependencies`.

use std::sync::Arc;
use std::time::Duration;

use openai_client::OpenAIClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::kernel::{
    BaseBlogGenerator, BaseClock, BaseRunStore, BaseTopicStore, OpenAiBlogGenerator,
    PostgresRunStore, PostgresTopicStore, SystemClock,
};

#[derive(Clone)]
pub struct ServerDeps {
    pub runs: Arc<dyn BaseRunStore>,
    pub topics: Arc<dyn BaseTopicStore>,
    pub generator: Arc<dyn BaseBlogGenerator>,
    pub clock: Arc<dyn BaseClock>,
    /// Topics claimed per batch drain
    pub batch_size: i64,
    /// Caller-side limit on a single generation; `None` waits indefinitely
    pub generation_timeout: Option<Duration>,
    /// Default window for the stuck-run sweep
    pub stuck_run_timeout_minutes: i64,
}

impl ServerDeps {
    pub fn new(
        runs: Arc<dyn BaseRunStore>,
        topics: Arc<dyn BaseTopicStore>,
        generator: Arc<dyn BaseBlogGenerator>,
        clock: Arc<dyn BaseClock>,
    ) -> Self {
        Self {
            runs,
            topics,
            generator,
            clock,
            batch_size: crate::config::DEFAULT_BATCH_SIZE,
            generation_timeout: None,
            stuck_run_timeout_minutes: crate::config::DEFAULT_STUCK_RUN_TIMEOUT_MINUTES,
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_stuck_run_timeout_minutes(mut self, minutes: i64) -> Self {
        self.stuck_run_timeout_minutes = minutes;
        self
    }

    /// Production wiring: Postgres stores, OpenAI generator, wall clock.
    pub fn from_config(config: &Config, pool: PgPool) -> Self {
        let mut client = OpenAIClient::new(config.openai_api_key.clone());
        if let Some(base_url) = &config.openai_base_url {
            client = client.with_base_url(base_url.clone());
        }

        Self::new(
            Arc::new(PostgresRunStore::new(pool.clone())),
            Arc::new(PostgresTopicStore::new(pool.clone())),
            Arc::new(OpenAiBlogGenerator::new(
                client,
                config.generation_model.clone(),
                pool,
            )),
            Arc::new(SystemClock),
        )
        .with_batch_size(config.batch_size)
        .with_generation_timeout(config.generation_timeout)
        .with_stuck_run_timeout_minutes(config.stuck_run_timeout_minutes)
    }
}
