// Push Use Case

use crate::domain::queue::validate_queue_name;
use crate::domain::{Job, JobClass, DEFAULT_QUEUE};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobStore, TimeProvider};
use serde::{Deserialize, Serialize};

/// Longest accepted handler class name
const MAX_CLASS_LEN: usize = 128;

/// Deepest accepted nesting of job arguments
const MAX_ARGS_DEPTH: usize = 32;

fn default_queue() -> String {
    DEFAULT_QUEUE.to_string()
}

fn default_args() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

/// Push request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    pub class: String,

    #[serde(default = "default_queue")]
    pub queue: String,

    /// Positional arguments for the handler (JSON array)
    #[serde(default = "default_args")]
    pub args: serde_json::Value,
}

impl PushRequest {
    pub fn new(class: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            class: class.into(),
            queue: default_queue(),
            args,
        }
    }

    pub fn on_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }
}

/// Reject requests no handler could run
pub(crate) fn validate_request(req: &PushRequest) -> Result<()> {
    validate_queue_name(&req.queue)?;

    if req.class.trim().is_empty() {
        return Err(AppError::Validation("Job class must not be empty".to_string()));
    }
    if req.class.len() > MAX_CLASS_LEN {
        return Err(AppError::Validation(format!(
            "Job class too long (max {} characters)",
            MAX_CLASS_LEN
        )));
    }
    if !req.args.is_array() {
        return Err(AppError::Validation(
            "Job args must be a JSON array".to_string(),
        ));
    }
    if json_depth(&req.args) > MAX_ARGS_DEPTH {
        return Err(AppError::Validation(format!(
            "Job args too deeply nested (max depth {})",
            MAX_ARGS_DEPTH
        )));
    }
    Ok(())
}

fn json_depth(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Array(items) => 1 + items.iter().map(json_depth).max().unwrap_or(0),
        serde_json::Value::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// Execute push use case
///
/// # Arguments
///
/// * `store` - Queue store
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Push request
pub async fn execute(
    store: &dyn JobStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: PushRequest,
) -> Result<String> {
    validate_request(&req)?;

    let job_id = id_provider.generate_id();
    let job = Job::new(
        job_id.clone(),
        time_provider.now_millis(),
        req.queue,
        JobClass::new(req.class),
        req.args,
    );

    store.insert(&job).await?;

    Ok(job_id)
}
