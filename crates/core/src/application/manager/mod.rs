// Manager - the bundled job-processing engine
//
// Runs `concurrency` processors over the weighted queue list. Stop flips a
// shared halt signal; wait(Shutdown) joins every processor.

pub mod constants;
mod processor;
mod shutdown;

pub use processor::Processor;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::domain::{Concurrency, QueueList, RuntimeOptions};
use crate::error::{AppError, Result};
use crate::port::{Engine, JobStore, TaskExecutor, TimeProvider, WaitKind};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct Manager {
    queues: QueueList,
    concurrency: Concurrency,
    store: Arc<dyn JobStore>,
    executor: Arc<dyn TaskExecutor>,
    time_provider: Arc<dyn TimeProvider>,
    shutdown_tx: ShutdownSender,
    shutdown_rx: ShutdownToken,
    processors: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl Manager {
    /// Create a manager for the queues and concurrency in `options`
    pub fn new(
        options: &RuntimeOptions,
        store: Arc<dyn JobStore>,
        executor: Arc<dyn TaskExecutor>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        Self {
            queues: options.queues.clone(),
            concurrency: options.concurrency,
            store,
            executor,
            time_provider,
            shutdown_tx,
            shutdown_rx,
            processors: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Processors not yet joined by `wait`
    pub fn running_processors(&self) -> usize {
        self.processors
            .lock()
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    fn registry(&self) -> Result<std::sync::MutexGuard<'_, Vec<JoinHandle<()>>>> {
        self.processors
            .lock()
            .map_err(|_| AppError::Engine("processor registry poisoned".to_string()))
    }
}

#[async_trait]
impl Engine for Manager {
    async fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AppError::InvalidState("manager already started".to_string()));
        }

        let mut handles = self.registry()?;
        for id in 0..self.concurrency.get() {
            let processor = Processor::new(
                id,
                self.queues.clone(),
                Arc::clone(&self.store),
                Arc::clone(&self.executor),
                Arc::clone(&self.time_provider),
            );
            let token = self.shutdown_rx.clone();
            handles.push(tokio::spawn(async move { processor.run(token).await }));
        }

        info!(
            concurrency = self.concurrency.get(),
            queues = ?self.queues.distinct(),
            "Manager started"
        );
        Ok(())
    }

    fn stop(&self) {
        if self.shutdown_tx.is_shutdown() {
            return;
        }
        info!("Stopping processors, in-flight jobs will finish");
        self.shutdown_tx.shutdown();
    }

    async fn wait(&self, kind: WaitKind) -> Result<()> {
        match kind {
            WaitKind::Shutdown => {
                let handles = std::mem::take(&mut *self.registry()?);
                let count = handles.len();

                for result in futures::future::join_all(handles).await {
                    if let Err(e) = result {
                        error!(error = ?e, "Processor terminated abnormally");
                    }
                }

                info!(processors = count, "All processors halted");
                Ok(())
            }
        }
    }
}
