// Process Supervisor
//
// Idle -> Running -> ShuttingDown -> Terminated, driven by operator interrupts.
// start, stop and wait are each called exactly once, in that order.

use crate::application::interrupt::Interrupts;
use crate::domain::{RunContext, RuntimeOptions, ShutdownPolicy, SupervisorState};
use crate::error::{AppError, Result};
use crate::port::{Engine, EngineFactory, WaitKind};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sentinel "forever" interval the supervisor sleeps for while Running
pub const FOREVER: Duration = Duration::from_secs(2_000_000_000);

/// Owns the engine for the life of the process
pub struct Supervisor<F: EngineFactory> {
    factory: F,
    ctx: RunContext,
    state: SupervisorState,
    engine: Option<F::Engine>,
}

impl<F: EngineFactory> Supervisor<F> {
    pub fn new(factory: F, ctx: RunContext) -> Self {
        Self {
            factory,
            ctx,
            state: SupervisorState::Idle,
            engine: None,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }

    /// Start the engine, block until interrupted, then stop and wait for it.
    ///
    /// # Errors
    /// - `InvalidState` if called on a supervisor that already ran
    /// - engine construction/start failures (fatal, not retried)
    /// - `ShutdownTimeout` when a deadline policy elapses
    pub async fn run(&mut self, options: Arc<RuntimeOptions>, mut interrupts: Interrupts) -> Result<()> {
        if self.state != SupervisorState::Idle || self.engine.is_some() {
            return Err(AppError::InvalidState(format!(
                "supervisor cannot run from {}",
                self.state
            )));
        }

        // Idle -> Running
        let engine = self
            .factory
            .build(&options.queue_locator, Arc::clone(&options))
            .await?;
        let engine = self.engine.insert(engine);
        engine.start().await?;
        self.state.transition(SupervisorState::Running)?;

        info!(
            concurrency = options.concurrency.get(),
            queues = %options.queues,
            "Starting processing, hit Ctrl-C to stop"
        );

        let interrupt = loop {
            tokio::select! {
                _ = tokio::time::sleep(FOREVER) => {
                    debug!("Forever interval elapsed, still running");
                }
                interrupt = interrupts.next() => break interrupt,
            }
        };

        // Running -> ShuttingDown
        info!(signal = %interrupt, "Shutting down...");
        self.state.transition(SupervisorState::ShuttingDown)?;
        engine.stop();

        // ShuttingDown -> Terminated
        let wait = wait_ignoring_interrupts(engine.wait(WaitKind::Shutdown), &mut interrupts);
        match self.ctx.shutdown {
            ShutdownPolicy::Unbounded => wait.await?,
            ShutdownPolicy::Deadline(deadline) => match tokio::time::timeout(deadline, wait).await {
                Ok(result) => result?,
                Err(_) => {
                    error!(?deadline, "Engine did not halt before the shutdown deadline");
                    return Err(AppError::ShutdownTimeout(deadline));
                }
            },
        }

        self.state.transition(SupervisorState::Terminated)?;
        info!("Shutdown complete");
        Ok(())
    }
}

/// Drive `wait` to completion; interrupts that arrive meanwhile have no effect
async fn wait_ignoring_interrupts<W>(wait: W, interrupts: &mut Interrupts) -> Result<()>
where
    W: Future<Output = Result<()>>,
{
    tokio::pin!(wait);
    loop {
        tokio::select! {
            result = &mut wait => return result,
            interrupt = interrupts.next() => {
                warn!(signal = %interrupt, "Already shutting down, ignoring signal");
            }
        }
    }
}
