// Central Error Type for the Application

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid application root {root}: missing {descriptor}")]
    InvalidAppRoot { root: PathBuf, descriptor: String },

    #[error("Bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Engine did not halt within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),
}

impl AppError {
    /// Process exit status the daemon reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::Domain(_) => 2,
            _ => 1,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
