// Subprocess executor implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

use hauler_core::domain::{Handler, HostApp, Job};
use hauler_core::port::task_executor::{
    ExecutionError, ExecutionResult, ExecutionStatus, TaskExecutor,
};
use hauler_core::port::TimeProvider;

/// Parent-process variables a handler may inherit
pub const DEFAULT_ENV_ALLOWLIST: [&str; 5] = ["PATH", "HOME", "USER", "LANG", "TZ"];

/// Subprocess executor
/// Runs the host application's handler for a job class as a child process
/// in the application root, with environment allowlisting
pub struct SubprocessExecutor {
    host: Arc<HostApp>,
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Vec<String>,
}

impl SubprocessExecutor {
    /// Create a new subprocess executor
    ///
    /// # Arguments
    /// * `host` - Booted host application (handlers, root, env)
    /// * `time_provider` - Time provider for duration tracking
    /// * `env_allowlist` - Parent environment variables passed through
    ///
    /// # Example
    /// ```ignore
    /// let executor = SubprocessExecutor::new(
    ///     Arc::new(host),
    ///     Arc::new(SystemTimeProvider),
    ///     vec!["PATH".to_string(), "HOME".to_string()],
    /// );
    /// ```
    pub fn new(
        host: Arc<HostApp>,
        time_provider: Arc<dyn TimeProvider>,
        env_allowlist: Vec<String>,
    ) -> Self {
        Self {
            host,
            time_provider,
            env_allowlist,
        }
    }

    /// Allowlisted parent variables, then the host app's own
    fn child_env(&self, job: &Job) -> Vec<(String, String)> {
        let mut env: Vec<(String, String)> = self
            .env_allowlist
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.clone(), value)))
            .collect();
        env.extend(self.host.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env.push(("HAULER_JOB_ID".to_string(), job.id.clone()));
        env.push(("HAULER_QUEUE".to_string(), job.queue.clone()));
        env
    }

    fn resolve(&self, job: &Job) -> Result<&Handler, ExecutionError> {
        self.host
            .handler(&job.class)
            .ok_or_else(|| ExecutionError::UnknownHandler(job.class.to_string()))
    }

    /// Spawn child process and wait for output
    async fn spawn_and_wait(
        &self,
        handler: &Handler,
        job: &Job,
    ) -> Result<std::process::Output, ExecutionError> {
        let args = serde_json::to_string(&job.args)
            .map_err(|e| ExecutionError::InvalidArgs(e.to_string()))?;

        let mut command = std::process::Command::new(&handler.program);
        command
            .args(&handler.args)
            .arg(args)
            .env_clear()
            .envs(self.child_env(job))
            .current_dir(&self.host.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group: a terminal Ctrl-C reaches only the daemon,
        // which lets in-flight handlers finish
        #[cfg(unix)]
        command.process_group(0);

        // Killed if the daemon gives up waiting (shutdown deadline)
        let child = Command::from(command)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExecutionError::SpawnFailed(format!("{}: {}", handler.program.display(), e))
            })?;

        child
            .wait_with_output()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))
    }

    /// Build execution result from process output
    fn build_result(&self, output: std::process::Output, duration_ms: i64) -> ExecutionResult {
        let status = if output.status.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };

        ExecutionResult {
            status,
            exit_code: output.status.code(),
            duration_ms,
            stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        }
    }
}

#[async_trait]
impl TaskExecutor for SubprocessExecutor {
    async fn execute(&self, job: &Job) -> Result<ExecutionResult, ExecutionError> {
        let handler = self.resolve(job)?;
        let start_time = self.time_provider.now_millis();

        debug!(
            job_id = %job.id,
            class = %job.class,
            program = %handler.program.display(),
            "Spawning handler"
        );

        let output = self.spawn_and_wait(handler, job).await?;
        let duration_ms = self.time_provider.now_millis() - start_time;
        let result = self.build_result(output, duration_ms);

        info!(
            job_id = %job.id,
            class = %job.class,
            duration_ms,
            exit_code = ?result.exit_code,
            status = ?result.status,
            "Handler finished"
        );

        Ok(result)
    }
}
