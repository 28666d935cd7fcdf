// Domain Layer - Pure business logic and entities

pub mod context;
pub mod error;
pub mod host;
pub mod job;
pub mod options;
pub mod queue;
pub mod supervisor_state;

// Re-exports
pub use context::{DebugLevel, RunContext, ShutdownPolicy};
pub use error::DomainError;
pub use host::{Handler, HostApp, BOOT_DESCRIPTOR};
pub use job::{Job, JobClass, JobId, JobState};
pub use options::{Concurrency, RuntimeOptions, RuntimeOptionsBuilder};
pub use queue::{QueueId, QueueList, QueueSpec, DEFAULT_QUEUE, MAX_QUEUE_WEIGHT};
pub use supervisor_state::SupervisorState;
