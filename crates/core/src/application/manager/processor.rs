// Processor - one job execution loop of the Manager

use super::constants::*;
use super::shutdown::ShutdownToken;
use crate::domain::{Job, QueueList};
use crate::error::Result;
use crate::port::{ExecutionResult, ExecutionStatus, JobStore, TaskExecutor, TimeProvider};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Fetches from the weighted queue list and runs jobs until told to halt
pub struct Processor {
    id: usize,
    queues: QueueList,
    store: Arc<dyn JobStore>,
    executor: Arc<dyn TaskExecutor>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Processor {
    pub fn new(
        id: usize,
        queues: QueueList,
        store: Arc<dyn JobStore>,
        executor: Arc<dyn TaskExecutor>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            id,
            queues,
            store,
            executor,
            time_provider,
        }
    }

    /// Run until shutdown; an in-flight job is always finished first
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        debug!(processor = self.id, "Processor started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }
            match self.process_next_job().await {
                Ok(true) => {}
                Ok(false) => {
                    tokio::select! {
                        _ = sleep(IDLE_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => break,
                    }
                }
                Err(e) => {
                    error!(processor = self.id, error = %e, "Processor error");
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => break,
                    }
                }
            }
        }
        debug!(processor = self.id, "Processor stopped");
    }

    /// Fetch and run one job (returns true if a job was processed)
    pub async fn process_next_job(&self) -> Result<bool> {
        match self.fetch().await? {
            Some(job) => {
                self.perform(job).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Try queues in weighted-shuffled order, claiming the first available job
    async fn fetch(&self) -> Result<Option<Job>> {
        let order = self.queues.fetch_order(&mut rand::thread_rng());
        for queue in order {
            if let Some(job) = self.store.pop_next(&queue).await? {
                return Ok(Some(job));
            }
        }
        Ok(None)
    }

    async fn perform(&self, mut job: Job) -> Result<()> {
        debug!(
            processor = self.id,
            job_id = %job.id,
            class = %job.class,
            queue = %job.queue,
            args = %job.args,
            "Processing job"
        );

        // Spawned so a panicking executor cannot take the processor down
        let executor = Arc::clone(&self.executor);
        let job_for_exec = job.clone();
        let outcome = tokio::spawn(async move { executor.execute(&job_for_exec).await }).await;

        let now = self.time_provider.now_millis();
        match outcome {
            Ok(Ok(result)) if result.status == ExecutionStatus::Success => {
                job.complete(now)?;
                info!(
                    job_id = %job.id,
                    class = %job.class,
                    duration_ms = result.duration_ms,
                    "Job done"
                );
            }
            Ok(Ok(result)) => {
                let reason = failure_reason(&result);
                warn!(job_id = %job.id, class = %job.class, reason = %reason, "Job failed");
                job.fail(now, reason)?;
            }
            Ok(Err(e)) => {
                error!(job_id = %job.id, class = %job.class, error = %e, "Job could not run");
                job.fail(now, e.to_string())?;
            }
            Err(join_err) => {
                let reason = if join_err.is_panic() {
                    "handler panicked"
                } else {
                    "handler cancelled"
                };
                error!(job_id = %job.id, error = ?join_err, "{}", reason);
                job.fail(now, reason)?;
            }
        }

        if let Err(e) = self.store.update(&job).await {
            // The claim stays RUNNING in the store until an operator resets it
            error!(
                processor = self.id,
                job_id = %job.id,
                queue = %job.queue,
                outcome = ?job.state,
                error = %e,
                "Job outcome not recorded, job left running"
            );
            return Err(e);
        }
        Ok(())
    }
}

/// Error text stored on a job whose handler exited unsuccessfully
fn failure_reason(result: &ExecutionResult) -> String {
    let status = match result.exit_code {
        Some(code) => format!("handler exited with status {}", code),
        None => "handler terminated by signal".to_string(),
    };

    match result.stderr.as_deref().map(str::trim) {
        Some(stderr) if !stderr.is_empty() => {
            let mut end = stderr.len().min(MAX_ERROR_OUTPUT_BYTES);
            while !stderr.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}: {}", status, &stderr[..end])
        }
        _ => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobState, QueueSpec};
    use crate::error::AppError;
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::task_executor::mocks::{MockBehavior, MockTaskExecutor};
    use crate::port::time_provider::FixedTimeProvider;
    use serde_json::json;

    fn processor(
        queues: &[&str],
        store: Arc<InMemoryJobStore>,
        executor: Arc<MockTaskExecutor>,
    ) -> Processor {
        let specs: Vec<QueueSpec> = queues.iter().map(|q| q.parse().unwrap()).collect();
        Processor::new(
            0,
            QueueList::with_specs(&specs),
            store,
            executor,
            Arc::new(FixedTimeProvider(99)),
        )
    }

    #[tokio::test]
    async fn test_processes_job_from_listed_queue() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = Arc::new(MockTaskExecutor::new_success());
        let job = Job::new_test("mail", "Mailer", json!([1]));
        store.insert(&job).await.unwrap();

        let p = processor(&["mail"], store.clone(), executor.clone());
        assert!(p.process_next_job().await.unwrap());
        assert!(!p.process_next_job().await.unwrap());

        let stored = store.find_by_id(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.state, JobState::Done);
        assert_eq!(stored.finished_at, Some(99));
        assert_eq!(executor.executed(), vec![job.id]);
    }

    #[tokio::test]
    async fn test_ignores_unlisted_queue() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = Arc::new(MockTaskExecutor::new_success());
        store
            .insert(&Job::new_test("other", "Mailer", json!([])))
            .await
            .unwrap();

        let p = processor(&["mail,3", "default"], store.clone(), executor.clone());
        assert!(!p.process_next_job().await.unwrap());
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_zero_exit_marks_failed() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = Arc::new(MockTaskExecutor::new(MockBehavior::ExitFailure(3)));
        let job = Job::new_test("mail", "Mailer", json!([]));
        store.insert(&job).await.unwrap();

        let p = processor(&["mail"], store.clone(), executor);
        assert!(p.process_next_job().await.unwrap());

        let stored = store.find_by_id(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.state, JobState::Failed);
        assert_eq!(
            stored.error.as_deref(),
            Some("handler exited with status 3: mock failure")
        );
    }

    #[tokio::test]
    async fn test_executor_error_marks_failed() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = Arc::new(MockTaskExecutor::new_fail("no such file"));
        let job = Job::new_test("mail", "Mailer", json!([]));
        store.insert(&job).await.unwrap();

        let p = processor(&["mail"], store.clone(), executor);
        p.process_next_job().await.unwrap();

        let stored = store.find_by_id(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.state, JobState::Failed);
        assert!(stored.error.unwrap().contains("no such file"));
    }

    #[tokio::test]
    async fn test_unrecorded_outcome_is_reported() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = Arc::new(MockTaskExecutor::new_success());
        let job = Job::new_test("mail", "Mailer", json!([]));
        store.insert(&job).await.unwrap();
        store.fail_updates();

        let p = processor(&["mail"], store.clone(), executor.clone());
        let err = p.process_next_job().await.unwrap_err();

        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(executor.executed(), vec![job.id.clone()]);
        let stored = store.find_by_id(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.state, JobState::Running);
    }

    #[test]
    fn test_failure_reason_truncates_on_char_boundary() {
        let result = ExecutionResult {
            status: ExecutionStatus::Failed,
            duration_ms: 1,
            exit_code: None,
            stdout: None,
            stderr: Some("é".repeat(MAX_ERROR_OUTPUT_BYTES)),
        };
        let reason = failure_reason(&result);
        assert!(reason.starts_with("handler terminated by signal: "));
        assert!(reason.len() <= "handler terminated by signal: ".len() + MAX_ERROR_OUTPUT_BYTES);
    }
}
