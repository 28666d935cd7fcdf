// Engine Port - lifecycle contract of the job-processing engine

use crate::domain::RuntimeOptions;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Completion condition for [`Engine::wait`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum WaitKind {
    /// Every worker has fully halted
    Shutdown,
}

/// Job-processing engine driven by the supervisor.
///
/// The supervisor calls `start`, `stop` and `wait` exactly once each, in that order.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Begin processing; returns once workers are launched
    async fn start(&self) -> Result<()>;

    /// Ask workers to halt. Must not block and must be idempotent.
    fn stop(&self);

    /// Block until the engine reports the given completion condition
    async fn wait(&self, kind: WaitKind) -> Result<()>;
}

/// Constructs the engine from the queue locator and resolved options
#[async_trait]
pub trait EngineFactory: Send + Sync {
    type Engine: Engine;

    async fn build(&self, locator: &str, options: Arc<RuntimeOptions>) -> Result<Self::Engine>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;
    use std::time::Duration;

    /// One observed lifecycle call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum EngineCall {
        New(String),
        Start,
        Stop,
        Wait(WaitKind),
    }

    /// How the mock engine's `wait` behaves
    #[derive(Debug, Clone, Copy, Default)]
    pub enum WaitBehavior {
        #[default]
        Immediate,
        Delay(Duration),
        /// Never returns
        Hang,
    }

    /// Shared, ordered record of lifecycle calls
    #[derive(Debug, Clone, Default)]
    pub struct CallLog(Arc<Mutex<Vec<EngineCall>>>);

    impl CallLog {
        pub fn record(&self, call: EngineCall) {
            self.0.lock().unwrap().push(call);
        }

        pub fn calls(&self) -> Vec<EngineCall> {
            self.0.lock().unwrap().clone()
        }

        pub fn count(&self, call: &EngineCall) -> usize {
            self.0.lock().unwrap().iter().filter(|c| *c == call).count()
        }
    }

    /// Mock Engine for testing
    pub struct MockEngine {
        log: CallLog,
        wait: WaitBehavior,
        fail_start: bool,
    }

    #[async_trait]
    impl Engine for MockEngine {
        async fn start(&self) -> Result<()> {
            self.log.record(EngineCall::Start);
            if self.fail_start {
                return Err(AppError::Engine("mock start failure".to_string()));
            }
            Ok(())
        }

        fn stop(&self) {
            self.log.record(EngineCall::Stop);
        }

        async fn wait(&self, kind: WaitKind) -> Result<()> {
            self.log.record(EngineCall::Wait(kind));
            match self.wait {
                WaitBehavior::Immediate => {}
                WaitBehavior::Delay(d) => tokio::time::sleep(d).await,
                WaitBehavior::Hang => std::future::pending::<()>().await,
            }
            Ok(())
        }
    }

    /// Mock EngineFactory recording every construction
    #[derive(Debug, Clone, Default)]
    pub struct MockEngineFactory {
        log: CallLog,
        wait: WaitBehavior,
        fail_build: bool,
        fail_start: bool,
    }

    impl MockEngineFactory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_wait(mut self, wait: WaitBehavior) -> Self {
            self.wait = wait;
            self
        }

        pub fn failing_build(mut self) -> Self {
            self.fail_build = true;
            self
        }

        pub fn failing_start(mut self) -> Self {
            self.fail_start = true;
            self
        }

        pub fn log(&self) -> &CallLog {
            &self.log
        }

        pub fn build_count(&self) -> usize {
            self.log
                .calls()
                .iter()
                .filter(|c| matches!(c, EngineCall::New(_)))
                .count()
        }
    }

    #[async_trait]
    impl EngineFactory for MockEngineFactory {
        type Engine = MockEngine;

        async fn build(&self, locator: &str, _options: Arc<RuntimeOptions>) -> Result<MockEngine> {
            self.log.record(EngineCall::New(locator.to_string()));
            if self.fail_build {
                return Err(AppError::Engine("mock build failure".to_string()));
            }
            Ok(MockEngine {
                log: self.log.clone(),
                wait: self.wait,
                fail_start: self.fail_start,
            })
        }
    }
}
