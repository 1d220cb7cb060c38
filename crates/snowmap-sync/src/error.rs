//! Sync error types

use thiserror::Error;

/// Errors raised while fetching or merging remote updates
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failure talking to the remote
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("Remote error: {status} - {message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body did not match the update contract
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Remote source could not serve the request
    #[error("Remote source unavailable: {0}")]
    Unavailable(String),

    /// `initialize` was called on a session that already has a dataset
    #[error("Dataset already initialized")]
    AlreadyInitialized,

    /// `refresh` was called before a successful `initialize`
    #[error("Dataset not initialized")]
    NotInitialized,

    /// The owning session was torn down
    #[error("Reconciler closed")]
    Closed,
}

impl SyncError {
    /// Fetch failures are retried on the next tick; lifecycle misuse is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::Http(_)
                | SyncError::Remote { .. }
                | SyncError::Decode(_)
                | SyncError::Unavailable(_)
        )
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
