/*
 * Responsibility
 * - What the storage layer reports upward
 * - ConditionFailed is the only "semantic" failure; everything else is the backend
 */
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("the conditional request failed")]
    ConditionFailed,
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("valkey error: {0}")]
    Valkey(#[from] redis::RedisError),
    #[error("storage request timed out after {0:?}")]
    Timeout(Duration),
    #[error("stored note is malformed: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Stable identifier surfaced in the `error.code` field of 500 responses.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::ConditionFailed => "ConditionalCheckFailed",
            StoreError::Db(_) | StoreError::Valkey(_) => "StorageUnavailable",
            StoreError::Timeout(_) => "StorageTimeout",
            StoreError::Corrupt(_) => "CorruptRecord",
        }
    }

    /// Transient failures the storage client may retry on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::ConditionFailed | StoreError::Corrupt(_) => false,
            StoreError::Timeout(_) => true,
            StoreError::Db(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Protocol(_)
            ),
            StoreError::Valkey(e) => {
                e.is_io_error() || e.is_timeout() || e.is_connection_dropped()
            }
        }
    }
}
