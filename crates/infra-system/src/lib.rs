// Hauler Infrastructure - System Adapters
// Implements: Bootstrapper, TaskExecutor, OS signal forwarding

pub mod bootstrapper;
pub mod signals;
pub mod subprocess_executor;

pub use bootstrapper::HostBootstrapper;
pub use signals::spawn_signal_listener;
pub use subprocess_executor::{SubprocessExecutor, DEFAULT_ENV_ALLOWLIST};
