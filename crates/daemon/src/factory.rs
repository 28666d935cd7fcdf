// Engine factory: wires the Manager to the SQLite store and subprocess handlers

use async_trait::async_trait;
use hauler_core::application::Manager;
use hauler_core::domain::{HostApp, RuntimeOptions};
use hauler_core::error::Result;
use hauler_core::port::time_provider::SystemTimeProvider;
use hauler_core::port::{EngineFactory, TimeProvider};
use hauler_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};
use hauler_infra_system::{SubprocessExecutor, DEFAULT_ENV_ALLOWLIST};
use std::sync::Arc;
use tracing::info;

/// Builds the bundled Manager for a booted host application
pub struct ManagerFactory {
    host: Arc<HostApp>,
}

impl ManagerFactory {
    pub fn new(host: Arc<HostApp>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl EngineFactory for ManagerFactory {
    type Engine = Manager;

    async fn build(&self, locator: &str, options: Arc<RuntimeOptions>) -> Result<Manager> {
        info!(locator, "Connecting to queue store");
        let pool = create_pool(locator).await?;
        run_migrations(&pool).await?;

        let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
        let store = Arc::new(SqliteJobStore::new(pool, Arc::clone(&time_provider)));
        let executor = Arc::new(SubprocessExecutor::new(
            Arc::clone(&self.host),
            Arc::clone(&time_provider),
            DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        ));

        Ok(Manager::new(&options, store, executor, time_provider))
    }
}
