//! Postgres store tests.
//!
//! Need Docker for the testcontainers Postgres instance:
//! `cargo test -p blog-automation-server --test postgres_store_tests -- --ignored`

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use blog_automation::common::RunId;
use blog_automation::domains::posts::{BlogPost, NewBlogPost};
use blog_automation::domains::runs::activities::{
    drain_batch, reconcile_stuck_runs, terminate_run, TerminateOutcome, EMPTY_RUN_MESSAGE,
    TIMED_OUT_MESSAGE,
};
use blog_automation::domains::runs::models::{DailyBlogRun, RunStatus};
use blog_automation::domains::topics::models::{QueuedTopic, TopicStatus};
use blog_automation::kernel::{
    FixedClock, MockBlogGenerator, PostgresRunStore, PostgresTopicStore, ServerDeps,
};
use chrono::{Duration, Utc};
use common::*;
use test_context::test_context;

fn postgres_deps(ctx: &TestHarness, generator: MockBlogGenerator) -> ServerDeps {
    ServerDeps::new(
        Arc::new(PostgresRunStore::new(ctx.db_pool.clone())),
        Arc::new(PostgresTopicStore::new(ctx.db_pool.clone())),
        Arc::new(generator),
        Arc::new(FixedClock::new(Utc::now())),
    )
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn claim_batch_is_fifo_and_marks_processing(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    let topics = create_test_topics(&ctx.db_pool, 4).await.unwrap();
    let run = create_test_run(&ctx.db_pool, RunStatus::Running, Utc::now(), 0)
        .await
        .unwrap();

    let claimed = QueuedTopic::claim_batch(run.id, 3, &ctx.db_pool).await.unwrap();

    let mut expected: Vec<_> = topics.iter().map(|t| (t.created_at, t.id)).collect();
    expected.sort();
    let expected_ids: Vec<_> = expected[..3].iter().map(|(_, id)| *id).collect();
    let claimed_ids: Vec<_> = claimed.iter().map(|t| t.id).collect();
    assert_eq!(claimed_ids, expected_ids);

    for topic in &claimed {
        assert_eq!(topic.status, TopicStatus::Processing);
        assert_eq!(topic.run_id, Some(run.id));
        assert_eq!(topic.attempts, 1);
        assert!(topic.started_at.is_some());
    }

    let counts = QueuedTopic::counts(&ctx.db_pool).await.unwrap();
    assert_eq!((counts.pending, counts.processing), (1, 3));
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn concurrent_claims_never_overlap(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    create_test_topics(&ctx.db_pool, 15).await.unwrap();
    let first = create_test_run(&ctx.db_pool, RunStatus::Running, Utc::now(), 0)
        .await
        .unwrap();
    let second = create_test_run(&ctx.db_pool, RunStatus::Running, Utc::now(), 0)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        QueuedTopic::claim_batch(first.id, 10, &ctx.db_pool),
        QueuedTopic::claim_batch(second.id, 10, &ctx.db_pool),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let ids: HashSet<_> = a.iter().chain(b.iter()).map(|t| t.id).collect();
    assert_eq!(ids.len(), a.len() + b.len());
    assert!(a.len() + b.len() <= 15);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn mark_done_only_applies_to_processing_topics(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    let topics = create_test_topics(&ctx.db_pool, 1).await.unwrap();
    let run = create_test_run(&ctx.db_pool, RunStatus::Running, Utc::now(), 0)
        .await
        .unwrap();

    assert!(!QueuedTopic::mark_done(topics[0].id, &ctx.db_pool).await.unwrap());

    QueuedTopic::claim_batch(run.id, 1, &ctx.db_pool).await.unwrap();
    assert!(QueuedTopic::mark_failed(topics[0].id, "boom", &ctx.db_pool)
        .await
        .unwrap());
    assert!(!QueuedTopic::mark_done(topics[0].id, &ctx.db_pool).await.unwrap());
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn release_returns_claims_to_pending(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    create_test_topics(&ctx.db_pool, 2).await.unwrap();
    let run = create_test_run(&ctx.db_pool, RunStatus::Running, Utc::now(), 0)
        .await
        .unwrap();
    let claimed = QueuedTopic::claim_batch(run.id, 2, &ctx.db_pool).await.unwrap();
    let ids: Vec<_> = claimed.iter().map(|t| t.id).collect();

    let released = QueuedTopic::release(run.id, &ids, &ctx.db_pool).await.unwrap();

    assert_eq!(released, 2);
    let counts = QueuedTopic::counts(&ctx.db_pool).await.unwrap();
    assert_eq!(counts.pending, 2);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn counters_increment_atomically(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    let run = create_test_run(&ctx.db_pool, RunStatus::Running, Utc::now(), 0)
        .await
        .unwrap();

    let increments = (0..20).map(|_| DailyBlogRun::increment_created(run.id, &ctx.db_pool));
    for result in futures::future::join_all(increments).await {
        result.unwrap();
    }
    DailyBlogRun::increment_failed(run.id, &ctx.db_pool)
        .await
        .unwrap();

    let run = DailyBlogRun::find_by_id(run.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((run.blogs_created, run.blogs_failed), (20, 1));
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn mark_completed_is_conditional_on_running(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    let run = create_test_run(&ctx.db_pool, RunStatus::Running, Utc::now(), 0)
        .await
        .unwrap();
    DailyBlogRun::terminate(run.id, "Terminated by admin", &ctx.db_pool)
        .await
        .unwrap();

    let completed = DailyBlogRun::mark_completed(run.id, &ctx.db_pool)
        .await
        .unwrap();

    assert!(completed.is_none());
    let run = DailyBlogRun::find_by_id(run.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(run.status, RunStatus::Failed);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn reconcile_rules_in_sql(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    let now = Utc::now();
    let stale = create_test_run(&ctx.db_pool, RunStatus::Running, now - Duration::minutes(15), 0)
        .await
        .unwrap();
    let fresh = create_test_run(&ctx.db_pool, RunStatus::Running, now - Duration::minutes(5), 0)
        .await
        .unwrap();
    let empty = create_test_run(&ctx.db_pool, RunStatus::Completed, now - Duration::hours(1), 0)
        .await
        .unwrap();
    let productive =
        create_test_run(&ctx.db_pool, RunStatus::Completed, now - Duration::hours(1), 1)
            .await
            .unwrap();

    let deps = postgres_deps(ctx, MockBlogGenerator::new());
    let report = reconcile_stuck_runs(Some(10.0), &deps).await.unwrap();
    assert_eq!((report.timed_out_updated, report.zero_completed_updated), (1, 1));

    let status_of = |id: RunId| {
        let pool = ctx.db_pool.clone();
        async move {
            DailyBlogRun::find_by_id(id, &pool)
                .await
                .unwrap()
                .unwrap()
        }
    };
    let stale = status_of(stale.id).await;
    assert_eq!(stale.status, RunStatus::Failed);
    assert_eq!(stale.error_message.as_deref(), Some(TIMED_OUT_MESSAGE));
    assert!(stale.completed_at.is_some());
    assert_eq!(status_of(fresh.id).await.status, RunStatus::Running);
    let empty = status_of(empty.id).await;
    assert_eq!(empty.error_message.as_deref(), Some(EMPTY_RUN_MESSAGE));
    assert_eq!(status_of(productive.id).await.status, RunStatus::Completed);

    let again = reconcile_stuck_runs(Some(10.0), &deps).await.unwrap();
    assert_eq!((again.timed_out_updated, again.zero_completed_updated), (0, 0));
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn drain_and_terminate_against_postgres(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    create_test_topics(&ctx.db_pool, 3).await.unwrap();
    let deps = postgres_deps(
        ctx,
        MockBlogGenerator::new().fail_title(
            "Postgres topic 2",
            blog_automation::kernel::GenerationError::Network("reset".into()),
        ),
    );

    let report = drain_batch(&deps).await.unwrap();
    assert_eq!((report.successful, report.failed), (2, 1));

    let run = DailyBlogRun::find_by_id(report.run_id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!((run.blogs_created, run.blogs_failed), (2, 1));

    let outcome = terminate_run(run.id, None, &deps).await.unwrap();
    assert!(matches!(outcome, TerminateOutcome::Terminated(ref r) if r.status == RunStatus::Failed));

    let missing = terminate_run(RunId::new(), None, &deps).await.unwrap();
    assert_eq!(missing, TerminateOutcome::NotFound);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn blog_posts_link_back_to_their_topic(ctx: &mut TestHarness) {
    let _db = ctx.exclusive().await.unwrap();
    let topics = create_test_topics(&ctx.db_pool, 1).await.unwrap();

    let post = BlogPost::create(
        &NewBlogPost {
            queue_item_id: topics[0].id,
            title: "Edge AI".to_string(),
            slug: "edge-ai-1a2b3c4d".to_string(),
            content: "body".to_string(),
            excerpt: Some("summary".to_string()),
            meta_description: None,
            keywords: vec!["edge".to_string()],
            category: "technology".to_string(),
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();

    assert_eq!(post.status, "published");
    let found = BlogPost::find_by_queue_item(topics[0].id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, post.id);
}
