//! Client error types

use snowmap_sync::SyncError;
use snowmap_types::CatalogError;
use thiserror::Error;

/// Errors surfaced by the client session
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configured catalog is inconsistent
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Sync failure
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Logging could not be initialized
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Identity provider went away before signalling readiness
    #[error("Identity provider closed before the user was authenticated")]
    IdentityUnavailable,

    /// Session was started twice
    #[error("Session already started")]
    AlreadyStarted,
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
