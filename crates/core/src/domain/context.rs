// Run Context - explicit replacement for process-wide debug state

use super::options::RuntimeOptions;
use std::time::Duration;

/// Diagnostic output level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    #[default]
    Normal,
    Verbose,
}

impl DebugLevel {
    pub fn is_verbose(&self) -> bool {
        matches!(self, DebugLevel::Verbose)
    }

    /// Default tracing directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            DebugLevel::Normal => "hauler=info",
            DebugLevel::Verbose => "hauler=debug",
        }
    }
}

/// How long the supervisor waits for the engine to halt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownPolicy {
    #[default]
    Unbounded,
    Deadline(Duration),
}

impl ShutdownPolicy {
    pub fn deadline(&self) -> Option<Duration> {
        match self {
            ShutdownPolicy::Unbounded => None,
            ShutdownPolicy::Deadline(d) => Some(*d),
        }
    }
}

/// Settings threaded to every component that needs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunContext {
    pub debug: DebugLevel,
    pub shutdown: ShutdownPolicy,
}

impl RunContext {
    pub fn from_options(options: &RuntimeOptions) -> Self {
        Self {
            debug: if options.verbose {
                DebugLevel::Verbose
            } else {
                DebugLevel::Normal
            },
            shutdown: options
                .shutdown_timeout
                .map(ShutdownPolicy::Deadline)
                .unwrap_or_default(),
        }
    }
}
