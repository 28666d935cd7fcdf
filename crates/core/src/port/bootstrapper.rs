// Application Bootstrapper Port
//
// Boots the host application exactly once before the engine starts. Failures
// are fatal; callers do not retry.

use crate::domain::HostApp;
use crate::error::Result;
use std::path::Path;

pub trait Bootstrapper: Send + Sync {
    /// Record `environment` in the host configuration, load it, and eagerly
    /// resolve every job handler so classes are known before processing.
    fn boot(&self, root: &Path, environment: &str) -> Result<HostApp>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{Handler, JobClass};
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock Bootstrapper for testing
    #[derive(Default)]
    pub struct MockBootstrapper {
        handlers: Vec<(String, Handler)>,
        fail_with: Option<String>,
        calls: AtomicUsize,
    }

    impl MockBootstrapper {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_handler(mut self, class: &str, program: &str) -> Self {
            self.handlers.push((
                class.to_string(),
                Handler {
                    program: program.into(),
                    args: vec![],
                },
            ));
            self
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                fail_with: Some(message.into()),
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Bootstrapper for MockBootstrapper {
        fn boot(&self, root: &Path, environment: &str) -> Result<HostApp> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.fail_with {
                return Err(AppError::Bootstrap(message.clone()));
            }

            let mut app = HostApp::new(root, "mock", environment);
            for (class, handler) in &self.handlers {
                app.register(JobClass::new(class.as_str()), handler.clone());
            }
            Ok(app)
        }
    }
}
