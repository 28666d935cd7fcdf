// Port Layer - Interfaces for external collaborators

pub mod bootstrapper;
pub mod engine;
pub mod id_provider; // For deterministic testing
pub mod job_store;
pub mod task_executor;
pub mod time_provider;

// Re-exports
pub use bootstrapper::Bootstrapper;
pub use engine::{Engine, EngineFactory, WaitKind};
pub use id_provider::IdProvider;
pub use job_store::JobStore;
pub use task_executor::{ExecutionError, ExecutionResult, ExecutionStatus, TaskExecutor};
pub use time_provider::TimeProvider;
