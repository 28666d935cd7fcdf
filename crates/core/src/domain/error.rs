// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid queue name {0:?}: must be non-empty without whitespace or commas")]
    InvalidQueueName(String),

    #[error("Invalid weight {weight:?} for queue {queue}: must be an integer from 1 to {max}", max = super::queue::MAX_QUEUE_WEIGHT)]
    InvalidQueueWeight { queue: String, weight: String },

    #[error("Invalid concurrency {0:?}: must be a positive integer")]
    InvalidConcurrency(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
