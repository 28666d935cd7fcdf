// Hauler Infrastructure - SQLite Adapter
// Implements: JobStore (the queue store behind the queue locator)

mod connection;
mod job_store;
mod migration;

pub use connection::{create_pool, is_sqlite_locator};
pub use job_store::SqliteJobStore;
pub use migration::run_migrations;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
