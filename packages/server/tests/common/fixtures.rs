//! Test fixtures for creating test data.
//!
//! In-memory fixtures seed the stores from `TestDependencies` directly;
//! Postgres fixtures go through the model methods.

use anyhow::Result;
use blog_automation::domains::runs::models::{DailyBlogRun, RunStatus};
use blog_automation::domains::topics::models::{NewTopic, QueuedTopic};
use blog_automation::kernel::TestDependencies;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

/// Seed a run with the given status, age and counters.
pub fn seed_run(
    deps: &TestDependencies,
    status: RunStatus,
    created_at: DateTime<Utc>,
    blogs_created: i32,
    blogs_failed: i32,
) -> DailyBlogRun {
    let mut run = DailyBlogRun::start(10, created_at);
    run.status = status;
    run.blogs_created = blogs_created;
    run.blogs_failed = blogs_failed;
    if status != RunStatus::Running {
        run.completed_at = Some(created_at + Duration::minutes(1));
    }
    deps.runs.seed(run)
}

/// Seed a `running` run created `minutes_ago` relative to the test clock.
pub fn seed_running_run(deps: &TestDependencies, minutes_ago: i64) -> DailyBlogRun {
    let created_at = deps_now(deps) - Duration::minutes(minutes_ago);
    seed_run(deps, RunStatus::Running, created_at, 0, 0)
}

pub fn deps_now(deps: &TestDependencies) -> DateTime<Utc> {
    use blog_automation::kernel::BaseClock;
    deps.clock.now()
}

/// Seed `count` pending topics titled "Topic 1".."Topic N", one second apart
/// so insertion order is unambiguous.
pub fn seed_topics(deps: &TestDependencies, count: usize) -> Vec<QueuedTopic> {
    let base = deps_now(deps) - Duration::hours(1);
    (0..count)
        .map(|i| {
            deps.topics
                .seed_pending(&format!("Topic {}", i + 1), base + Duration::seconds(i as i64))
        })
        .collect()
}

/// Queue `count` topics in Postgres.
pub async fn create_test_topics(pool: &PgPool, count: usize) -> Result<Vec<QueuedTopic>> {
    let topics: Vec<NewTopic> = (0..count)
        .map(|i| {
            NewTopic::builder()
                .title(format!("Postgres topic {}", i + 1))
                .keywords(vec!["ai".to_string(), "automation".to_string()])
                .build()
        })
        .collect();
    QueuedTopic::enqueue(&topics, pool).await
}

/// Insert a run directly in Postgres.
pub async fn create_test_run(
    pool: &PgPool,
    status: RunStatus,
    created_at: DateTime<Utc>,
    blogs_created: i32,
) -> Result<DailyBlogRun> {
    let mut run = DailyBlogRun::start(10, created_at);
    run.status = status;
    run.blogs_created = blogs_created;
    run.insert(pool).await
}
