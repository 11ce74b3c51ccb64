// TestDependencies - in-memory implementations for testing
//
// Provides stores, a scripted generator and a settable clock that can be
// injected into ServerDeps for tests and local experiments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    BaseBlogGenerator, BaseClock, BaseRunStore, BaseTopicStore, GeneratedPost, GenerationError,
    ServerDeps,
};
use crate::common::utils::slugify;
use crate::common::{BlogPostId, RunId, TopicId};
use crate::domains::runs::models::{DailyBlogRun, RunStatus};
use crate::domains::topics::models::{NewTopic, QueueCounts, QueuedTopic, TopicStatus};

fn unavailable() -> anyhow::Error {
    anyhow!("store unavailable (simulated)")
}

// =============================================================================
// In-memory Run Store
// =============================================================================

#[derive(Default)]
pub struct InMemoryRunStore {
    runs: Mutex<HashMap<RunId, DailyBlogRun>>,
    unavailable: AtomicBool,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a run as-is (any status, any timestamps).
    pub fn seed(&self, run: DailyBlogRun) -> DailyBlogRun {
        self.runs.lock().unwrap().insert(run.id, run.clone());
        run
    }

    pub fn get(&self, id: RunId) -> Option<DailyBlogRun> {
        self.runs.lock().unwrap().get(&id).cloned()
    }

    pub fn all(&self) -> Vec<DailyBlogRun> {
        let mut runs: Vec<_> = self.runs.lock().unwrap().values().cloned().collect();
        runs.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        runs
    }

    /// Make every call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Synchronous terminate, usable from inside a generator hook.
    pub fn force_fail(&self, id: RunId, message: &str) {
        if let Some(run) = self.runs.lock().unwrap().get_mut(&id) {
            fail(run, message);
        }
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn fail_matching(
        &self,
        message: &str,
        predicate: impl Fn(&DailyBlogRun) -> bool,
    ) -> Result<Vec<RunId>> {
        self.check()?;
        let mut runs = self.runs.lock().unwrap();
        let mut affected = Vec::new();
        for run in runs.values_mut().filter(|run| predicate(run)) {
            fail(run, message);
            affected.push(run.id);
        }
        affected.sort();
        Ok(affected)
    }
}

fn fail(run: &mut DailyBlogRun, message: &str) {
    let now = Utc::now();
    run.status = RunStatus::Failed;
    run.error_message = Some(message.to_string());
    run.completed_at.get_or_insert(now);
    run.updated_at = now;
}

#[async_trait]
impl BaseRunStore for InMemoryRunStore {
    async fn insert(&self, run: &DailyBlogRun) -> Result<DailyBlogRun> {
        self.check()?;
        let mut runs = self.runs.lock().unwrap();
        if runs.contains_key(&run.id) {
            return Err(anyhow!("duplicate run id {}", run.id));
        }
        runs.insert(run.id, run.clone());
        Ok(run.clone())
    }

    async fn find_by_id(&self, id: RunId) -> Result<Option<DailyBlogRun>> {
        self.check()?;
        Ok(self.get(id))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<DailyBlogRun>> {
        self.check()?;
        let mut runs = self.all();
        runs.reverse();
        runs.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(runs)
    }

    async fn increment_created(&self, id: RunId) -> Result<()> {
        self.check()?;
        if let Some(run) = self.runs.lock().unwrap().get_mut(&id) {
            run.blogs_created += 1;
            run.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn increment_failed(&self, id: RunId) -> Result<()> {
        self.check()?;
        if let Some(run) = self.runs.lock().unwrap().get_mut(&id) {
            run.blogs_failed += 1;
            run.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn complete(&self, id: RunId) -> Result<Option<DailyBlogRun>> {
        self.check()?;
        let mut runs = self.runs.lock().unwrap();
        match runs.get_mut(&id) {
            Some(run) if run.status == RunStatus::Running => {
                let now = Utc::now();
                run.status = RunStatus::Completed;
                run.completed_at = Some(now);
                run.updated_at = now;
                Ok(Some(run.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn fail_timed_out(
        &self,
        created_before: DateTime<Utc>,
        message: &str,
    ) -> Result<Vec<RunId>> {
        self.fail_matching(message, |run| {
            run.status == RunStatus::Running
                && run.created_at < created_before
                && run.has_no_progress()
        })
    }

    async fn fail_empty_completed(&self, message: &str) -> Result<Vec<RunId>> {
        self.fail_matching(message, |run| {
            run.status == RunStatus::Completed && run.has_no_progress()
        })
    }

    async fn terminate(&self, id: RunId, message: &str) -> Result<Option<DailyBlogRun>> {
        self.check()?;
        let mut runs = self.runs.lock().unwrap();
        Ok(runs.get_mut(&id).map(|run| {
            fail(run, message);
            run.clone()
        }))
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

// =============================================================================
// In-memory Topic Store
// =============================================================================

#[derive(Default)]
pub struct InMemoryTopicStore {
    topics: Mutex<Vec<QueuedTopic>>,
    unavailable: AtomicBool,
}

impl InMemoryTopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, topic: QueuedTopic) -> QueuedTopic {
        self.topics.lock().unwrap().push(topic.clone());
        topic
    }

    /// Seed a pending topic with an explicit insertion time.
    pub fn seed_pending(&self, title: &str, created_at: DateTime<Utc>) -> QueuedTopic {
        self.seed(QueuedTopic::pending(
            NewTopic::builder().title(title).build(),
            created_at,
        ))
    }

    pub fn get(&self, id: TopicId) -> Option<QueuedTopic> {
        self.topics
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<QueuedTopic> {
        self.topics.lock().unwrap().clone()
    }

    pub fn with_status(&self, status: TopicStatus) -> Vec<QueuedTopic> {
        self.topics
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.status == status)
            .cloned()
            .collect()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn finish(&self, id: TopicId, status: TopicStatus, error: Option<&str>) -> Result<bool> {
        self.check()?;
        let mut topics = self.topics.lock().unwrap();
        match topics
            .iter_mut()
            .find(|t| t.id == id && t.status == TopicStatus::Processing)
        {
            Some(topic) => {
                topic.status = status;
                topic.error_message = error.map(str::to_string);
                topic.completed_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BaseTopicStore for InMemoryTopicStore {
    async fn enqueue(&self, topics: &[NewTopic]) -> Result<Vec<QueuedTopic>> {
        self.check()?;
        let now = Utc::now();
        let queued: Vec<QueuedTopic> = topics
            .iter()
            .cloned()
            .map(|topic| QueuedTopic::pending(topic, now))
            .collect();
        self.topics.lock().unwrap().extend(queued.iter().cloned());
        Ok(queued)
    }

    async fn claim_batch(&self, run_id: RunId, limit: i64) -> Result<Vec<QueuedTopic>> {
        self.check()?;
        // Selection and status flip happen under one lock
        let mut topics = self.topics.lock().unwrap();
        let mut pending: Vec<usize> = topics
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == TopicStatus::Pending)
            .map(|(i, _)| i)
            .collect();
        pending.sort_by_key(|&i| (topics[i].created_at, topics[i].id));
        pending.truncate(usize::try_from(limit).unwrap_or(0));

        let now = Utc::now();
        let claimed = pending
            .into_iter()
            .map(|i| {
                let topic = &mut topics[i];
                topic.status = TopicStatus::Processing;
                topic.run_id = Some(run_id);
                topic.attempts += 1;
                topic.started_at = Some(now);
                topic.error_message = None;
                topic.clone()
            })
            .collect();
        Ok(claimed)
    }

    async fn mark_done(&self, id: TopicId) -> Result<bool> {
        self.finish(id, TopicStatus::Done, None)
    }

    async fn mark_failed(&self, id: TopicId, error: &str) -> Result<bool> {
        self.finish(id, TopicStatus::Failed, Some(error))
    }

    async fn release(&self, run_id: RunId, ids: &[TopicId]) -> Result<u64> {
        self.check()?;
        let mut released = 0;
        for topic in self.topics.lock().unwrap().iter_mut().filter(|t| {
            ids.contains(&t.id) && t.run_id == Some(run_id) && t.status == TopicStatus::Processing
        }) {
            topic.status = TopicStatus::Pending;
            topic.run_id = None;
            topic.started_at = None;
            released += 1;
        }
        Ok(released)
    }

    async fn counts(&self) -> Result<QueueCounts> {
        self.check()?;
        let topics = self.topics.lock().unwrap();
        Ok(QueueCounts::from_rows(topics.iter().map(|t| (t.status, 1))))
    }
}

// =============================================================================
// Mock Blog Generator
// =============================================================================

/// Scripted generation backend.
///
/// Succeeds by default. Failures are scripted per topic title; an optional
/// delay makes overlapping drains interleave.
#[derive(Default)]
pub struct MockBlogGenerator {
    failures: Mutex<HashMap<String, GenerationError>>,
    fail_all: Mutex<Option<GenerationError>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<TopicId>>,
    terminate_after: Mutex<Option<(usize, Arc<InMemoryRunStore>, String)>>,
}

impl MockBlogGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_title(self, title: &str, error: GenerationError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(title.to_string(), error);
        self
    }

    /// Every call fails (backend unreachable for the whole batch).
    pub fn fail_all(self, error: GenerationError) -> Self {
        *self.fail_all.lock().unwrap() = Some(error);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    /// Terminate the calling run once `calls` generations have been made.
    pub fn terminate_after(self, calls: usize, runs: Arc<InMemoryRunStore>, reason: &str) -> Self {
        *self.terminate_after.lock().unwrap() = Some((calls, runs, reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<TopicId> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseBlogGenerator for MockBlogGenerator {
    async fn generate(&self, topic: &QueuedTopic) -> Result<GeneratedPost, GenerationError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(topic.id);
            calls.len()
        };

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((after, runs, reason)) = self.terminate_after.lock().unwrap().as_ref() {
            if call_number == *after {
                if let Some(run_id) = topic.run_id {
                    runs.force_fail(run_id, reason);
                }
            }
        }

        if let Some(error) = self.fail_all.lock().unwrap().clone() {
            return Err(error);
        }
        if let Some(error) = self.failures.lock().unwrap().get(&topic.title).cloned() {
            return Err(error);
        }

        Ok(GeneratedPost {
            id: BlogPostId::new(),
            title: topic.title.clone(),
            slug: slugify(&topic.title, 80),
            word_count: 800,
        })
    }
}

// =============================================================================
// Fixed Clock
// =============================================================================

pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl BaseClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// In-memory dependency set with handles kept for assertions.
pub struct TestDependencies {
    pub runs: Arc<InMemoryRunStore>,
    pub topics: Arc<InMemoryTopicStore>,
    pub generator: Arc<MockBlogGenerator>,
    pub clock: Arc<FixedClock>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            runs: Arc::new(InMemoryRunStore::new()),
            topics: Arc::new(InMemoryTopicStore::new()),
            generator: Arc::new(MockBlogGenerator::new()),
            clock: Arc::new(FixedClock::new(Utc::now())),
        }
    }

    pub fn with_generator(mut self, generator: MockBlogGenerator) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.runs.clone(),
            self.topics.clone(),
            self.generator.clone(),
            self.clock.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
