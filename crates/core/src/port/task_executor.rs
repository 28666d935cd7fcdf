// Task Executor Port
// Runs one job through the host application's handler for its class

use crate::domain::Job;
use async_trait::async_trait;
use thiserror::Error;

/// Result of task execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

/// Execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No handler registered for job class {0}")]
    UnknownHandler(String),

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Task Executor trait
///
/// Implementations:
/// - SubprocessExecutor: runs the handler as a child process in the app root
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Execute a job and return the result
    ///
    /// # Errors
    /// - ExecutionError::UnknownHandler if the job class has no handler
    /// - ExecutionError::SpawnFailed if the handler cannot be started
    async fn execute(&self, job: &Job) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Handler ran and exited non-zero
        ExitFailure(i32),
        /// Always fail with message
        Fail(String),
        /// Succeed after sleeping
        Slow(Duration),
    }

    /// Mock Task Executor for testing
    pub struct MockTaskExecutor {
        behavior: Arc<Mutex<MockBehavior>>,
        executed: Arc<Mutex<Vec<String>>>,
    }

    impl MockTaskExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                executed: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            self.executed.lock().unwrap().len()
        }

        /// IDs of executed jobs in execution order
        pub fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskExecutor for MockTaskExecutor {
        async fn execute(&self, job: &Job) -> Result<ExecutionResult, ExecutionError> {
            self.executed.lock().unwrap().push(job.id.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            let success = ExecutionResult {
                status: ExecutionStatus::Success,
                duration_ms: 1,
                exit_code: Some(0),
                stdout: Some("mock output".to_string()),
                stderr: None,
            };

            match behavior {
                MockBehavior::Success => Ok(success),
                MockBehavior::ExitFailure(code) => Ok(ExecutionResult {
                    status: ExecutionStatus::Failed,
                    exit_code: Some(code),
                    stdout: None,
                    stderr: Some("mock failure".to_string()),
                    ..success
                }),
                MockBehavior::Fail(msg) => Err(ExecutionError::SpawnFailed(msg)),
                MockBehavior::Slow(d) => {
                    tokio::time::sleep(d).await;
                    Ok(success)
                }
            }
        }
    }
}
