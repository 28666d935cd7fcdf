// Runtime Options Domain Model
//
// Built once by the configuration layer, immutable afterwards.

use super::error::{DomainError, Result};
use super::queue::{QueueList, QueueSpec};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default number of processors
pub const DEFAULT_CONCURRENCY: usize = 25;

/// Environment variable that supplies the default queue locator
pub const QUEUE_URL_ENV: &str = "HAULER_QUEUE_URL";

/// Locator used when neither `-s` nor [`QUEUE_URL_ENV`] is given
pub const DEFAULT_QUEUE_LOCATOR: &str = "sqlite://hauler.db";

/// Default host environment name
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Default host application root
pub const DEFAULT_APP_ROOT: &str = ".";

/// Desired worker count (always >= 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concurrency(NonZeroUsize);

impl Concurrency {
    pub fn new(value: usize) -> Result<Self> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidConcurrency(value.to_string()))
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl FromStr for Concurrency {
    type Err = DomainError;

    /// Zero, negative and non-numeric input are all rejected
    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<NonZeroUsize>()
            .map(Self)
            .map_err(|_| DomainError::InvalidConcurrency(s.to_string()))
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved worker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeOptions {
    pub verbose: bool,
    pub queues: QueueList,
    pub concurrency: Concurrency,
    pub queue_locator: String,
    pub app_root: PathBuf,
    pub environment: String,
    /// None waits for the engine forever
    pub shutdown_timeout: Option<Duration>,
    pub pidfile: Option<PathBuf>,
    pub logfile: Option<PathBuf>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            queues: QueueList::default(),
            concurrency: Concurrency::default(),
            queue_locator: DEFAULT_QUEUE_LOCATOR.to_string(),
            app_root: PathBuf::from(DEFAULT_APP_ROOT),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            shutdown_timeout: None,
            pidfile: None,
            logfile: None,
        }
    }
}

impl RuntimeOptions {
    pub fn builder() -> RuntimeOptionsBuilder {
        RuntimeOptionsBuilder::default()
    }
}

/// Pick the queue locator from an environment lookup, falling back to the local default
pub fn default_locator<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(QUEUE_URL_ENV)
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_QUEUE_LOCATOR.to_string())
}

/// Accumulates option layers; later setters win, queue specs accumulate.
///
/// Nothing is observable until [`RuntimeOptionsBuilder::build`] validates the
/// whole value.
#[derive(Debug, Default, Clone)]
pub struct RuntimeOptionsBuilder {
    verbose: Option<bool>,
    queue_specs: Option<Vec<QueueSpec>>,
    concurrency: Option<usize>,
    queue_locator: Option<String>,
    app_root: Option<PathBuf>,
    environment: Option<String>,
    shutdown_timeout: Option<Duration>,
    pidfile: Option<PathBuf>,
    logfile: Option<PathBuf>,
}

impl RuntimeOptionsBuilder {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Replace all previously given queue specs with `specs`
    pub fn queues(mut self, specs: Vec<QueueSpec>) -> Self {
        self.queue_specs = Some(specs);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn queue_locator(mut self, locator: impl Into<String>) -> Self {
        self.queue_locator = Some(locator.into());
        self
    }

    pub fn app_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.app_root = Some(root.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    pub fn pidfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.pidfile = Some(path.into());
        self
    }

    pub fn logfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.logfile = Some(path.into());
        self
    }

    /// Validate and produce the immutable options value
    pub fn build(self) -> Result<RuntimeOptions> {
        let defaults = RuntimeOptions::default();

        let concurrency = match self.concurrency {
            Some(n) => Concurrency::new(n)?,
            None => defaults.concurrency,
        };

        let queues = match &self.queue_specs {
            Some(specs) => QueueList::with_specs(specs),
            None => defaults.queues,
        };

        let environment = self.environment.unwrap_or(defaults.environment);
        if environment.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "environment name must not be empty".to_string(),
            ));
        }

        let queue_locator = self.queue_locator.unwrap_or(defaults.queue_locator);
        if queue_locator.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "queue locator must not be empty".to_string(),
            ));
        }

        if self.shutdown_timeout == Some(Duration::ZERO) {
            return Err(DomainError::ValidationError(
                "shutdown timeout must be greater than zero".to_string(),
            ));
        }

        Ok(RuntimeOptions {
            verbose: self.verbose.unwrap_or(defaults.verbose),
            queues,
            concurrency,
            queue_locator,
            app_root: self.app_root.unwrap_or(defaults.app_root),
            environment,
            shutdown_timeout: self.shutdown_timeout,
            pidfile: self.pidfile,
            logfile: self.logfile,
        })
    }
}
