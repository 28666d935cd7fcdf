// SQLite Connection Pool Setup

use hauler_core::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Whether `locator` names a store this adapter can open
pub fn is_sqlite_locator(locator: &str) -> bool {
    locator.starts_with("sqlite:")
}

/// Create SQLite connection pool with WAL mode
///
/// In-memory locators get a single connection; every SQLite connection to
/// `:memory:` is its own database.
pub async fn create_pool(locator: &str) -> Result<SqlitePool> {
    if !is_sqlite_locator(locator) {
        return Err(AppError::Config(format!(
            "Unsupported queue locator {:?} (expected sqlite://PATH or sqlite::memory:)",
            locator
        )));
    }

    let in_memory = locator.contains(":memory:");
    let mut options = SqliteConnectOptions::from_str(locator)
        .map_err(|e| AppError::Config(format!("Invalid queue locator {:?}: {}", locator, e)))?
        .busy_timeout(Duration::from_secs(5))
        .create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let max_connections = if in_memory { 1 } else { 10 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| AppError::Store(format!("Failed to open {}: {}", locator, e)))?;

    debug!(locator, max_connections, "Queue store pool ready");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_create_pool_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let locator = format!("sqlite://{}", dir.path().join("queue.db").display());

        let pool = create_pool(&locator).await.unwrap();
        assert!(pool.acquire().await.is_ok());
        assert!(dir.path().join("queue.db").exists());
    }

    #[tokio::test]
    async fn test_rejects_foreign_locator() {
        let err = create_pool("redis://localhost:6379").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
