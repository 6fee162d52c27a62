//! Error types for the scope resolution engine

use thiserror::Error;

/// Errors surfaced by the catalog cache and configuration layer.
///
/// Scope resolution itself cannot fail; only client lookup and setup
/// return errors. Background failures (reload, last-used updates) are
/// reported on the incident channel instead and are never fatal.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No client with the given ID exists in the current snapshot
    #[error("client not found: {0}")]
    ClientNotFound(String),

    /// Client exists but has been disabled
    #[error("client disabled: {0}")]
    ClientDisabled(String),

    /// Client exists but its expiration is in the past
    #[error("client expired: {0}")]
    ClientExpired(String),

    /// Invalid engine configuration (raised at setup; fatal)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Upstream role/client source failure
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

/// Failure reported by a role or client source.
///
/// Sources are implemented by external collaborators (table storage,
/// HTTP backends); the engine only needs to distinguish transient
/// unavailability from a broken backend for logging purposes.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The backing store could not be reached
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The backing store answered but the operation failed
    #[error("source operation failed: {0}")]
    Backend(String),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, AuthError>;
