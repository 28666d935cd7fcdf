// Job Domain Model

use super::error::{DomainError, Result};
use super::queue::QueueId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job ID (UUID v4)
pub type JobId = String;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Queued,
    Running,
    Done,
    Failed,
}

impl JobState {
    pub const ALL: [JobState; 4] = [
        JobState::Queued,
        JobState::Running,
        JobState::Done,
        JobState::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "QUEUED",
            JobState::Running => "RUNNING",
            JobState::Done => "DONE",
            JobState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        JobState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| DomainError::ValidationError(format!("unknown job state {s:?}")))
    }
}

/// Handler class name declared by the host application
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobClass(String);

impl JobClass {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job Entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub queue: QueueId,
    pub class: JobClass,
    pub args: serde_json::Value,
    pub state: JobState,

    pub enqueued_at: i64, // epoch ms
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,

    pub error: Option<String>,
}

impl Job {
    /// Create a queued job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `enqueued_at` - Timestamp in epoch ms (injected, not system time)
    /// * `queue` - Queue name
    /// * `class` - Handler class
    /// * `args` - JSON arguments handed to the handler
    pub fn new(
        id: impl Into<String>,
        enqueued_at: i64,
        queue: impl Into<String>,
        class: JobClass,
        args: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            queue: queue.into(),
            class,
            args,
            state: JobState::Queued,
            enqueued_at,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Create a test job with a deterministic ID (test-1, test-2, ...)
    ///
    /// **Note**: production code injects IDs and timestamps via providers.
    pub fn new_test(queue: impl Into<String>, class: &str, args: serde_json::Value) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        Self::new(
            format!("test-{}", counter),
            (counter * 1000) as i64,
            queue,
            JobClass::new(class),
            args,
        )
    }

    /// Transition to Running with explicit timestamp
    pub fn start(&mut self, now_millis: i64) -> Result<()> {
        self.expect_state(JobState::Queued, JobState::Running)?;
        self.state = JobState::Running;
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Done with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.expect_state(JobState::Running, JobState::Done)?;
        self.state = JobState::Done;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Failed, recording why
    pub fn fail(&mut self, now_millis: i64, error: impl Into<String>) -> Result<()> {
        self.expect_state(JobState::Running, JobState::Failed)?;
        self.state = JobState::Failed;
        self.finished_at = Some(now_millis);
        self.error = Some(error.into());
        Ok(())
    }

    fn expect_state(&self, from: JobState, to: JobState) -> Result<()> {
        if self.state != from {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}
