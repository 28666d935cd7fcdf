// Job Store Port (Interface)
//
// The persistent queue store, addressed by the queue locator.

use crate::domain::{Job, JobId, JobState};
use crate::error::Result;
use async_trait::async_trait;

/// Store interface for queued jobs
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &Job) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// Atomically claim the oldest queued job of `queue` (marks it RUNNING)
    async fn pop_next(&self, queue: &str) -> Result<Option<Job>>;

    /// Persist state, timestamps and error of a job
    async fn update(&self, job: &Job) -> Result<()>;

    /// Count jobs by queue and state
    async fn count_by_state(&self, queue: &str, state: JobState) -> Result<i64>;

    /// Every queue name that holds at least one job
    async fn queue_names(&self) -> Result<Vec<String>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory JobStore for testing
    #[derive(Default)]
    pub struct InMemoryJobStore {
        jobs: Mutex<Vec<Job>>,
        fail_updates: AtomicBool,
    }

    impl InMemoryJobStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every later `update` fail with a store error
        pub fn fail_updates(&self) {
            self.fail_updates.store(true, Ordering::SeqCst);
        }

        pub fn snapshot(&self) -> Vec<Job> {
            self.jobs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobStore for InMemoryJobStore {
        async fn insert(&self, job: &Job) -> Result<()> {
            let mut jobs = self.jobs.lock().unwrap();
            if jobs.iter().any(|j| j.id == job.id) {
                return Err(AppError::Store(format!("duplicate job id {}", job.id)));
            }
            jobs.push(job.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
            Ok(self.jobs.lock().unwrap().iter().find(|j| &j.id == id).cloned())
        }

        async fn pop_next(&self, queue: &str) -> Result<Option<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            let next = jobs
                .iter_mut()
                .filter(|j| j.queue == queue && j.state == JobState::Queued)
                .min_by_key(|j| j.enqueued_at);

            match next {
                Some(job) => {
                    job.start(job.enqueued_at)?;
                    Ok(Some(job.clone()))
                }
                None => Ok(None),
            }
        }

        async fn update(&self, job: &Job) -> Result<()> {
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(AppError::Store("database is locked".to_string()));
            }
            let mut jobs = self.jobs.lock().unwrap();
            match jobs.iter_mut().find(|j| j.id == job.id) {
                Some(stored) => {
                    *stored = job.clone();
                    Ok(())
                }
                None => Err(AppError::Store(format!("Job {} not found", job.id))),
            }
        }

        async fn count_by_state(&self, queue: &str, state: JobState) -> Result<i64> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs
                .iter()
                .filter(|j| j.queue == queue && j.state == state)
                .count() as i64)
        }

        async fn queue_names(&self) -> Result<Vec<String>> {
            let jobs = self.jobs.lock().unwrap();
            let mut names: Vec<String> = jobs.iter().map(|j| j.queue.clone()).collect();
            names.sort();
            names.dedup();
            Ok(names)
        }
    }
}
