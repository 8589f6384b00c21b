//! Core error types for notibox-core.
//!
//! This module defines the error hierarchy using thiserror. Each layer
//! of the engine has its own enum; [`CoreError`] is the umbrella the
//! public entry points return.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for notibox-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Durable-state persistence errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule construction and input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote inbox errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Durable-write errors.
///
/// These are transient by contract: in-memory state stays authoritative
/// and the next successful write supersedes the failed one. Callers
/// report them as warnings rather than aborting the mutation.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to open the state database
    #[error("Failed to open state database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Writing the state record failed
    #[error("State write failed: {0}")]
    WriteFailed(String),

    /// Reading the state record failed
    #[error("State read failed: {0}")]
    ReadFailed(String),

    /// The stored record does not deserialize
    #[error("State record is corrupt: {0}")]
    Corrupt(String),

    /// Database is locked by the other context
    #[error("State database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Rule-factory validation errors.
///
/// Malformed rules are rejected at construction, so a stored rule set
/// never needs revalidation before evaluation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Repository name is not of the form `owner/repo`
    #[error("Invalid repository name '{value}': expected owner/repo")]
    InvalidRepositoryName { value: String },

    /// Reason rule constructed with no reasons
    #[error("Reason rule requires at least one reason")]
    EmptyReasonSet,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Remote inbox errors.
///
/// Remote pushes are fire-and-forget: a failure here is reported as a
/// warning and never rolls back the optimistic local mutation.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success response from the remote API
    #[error("Remote API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Malformed API root or endpoint path
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No credential stored
    #[error("Not authenticated: no token stored")]
    NotAuthenticated,

    /// Remote rate limit hit
    #[error("Rate limited by remote API")]
    RateLimited,

    /// Failed to start the blocking runtime for remote calls
    #[error("Runtime error: {0}")]
    Runtime(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    PersistenceError::Locked
                } else {
                    PersistenceError::WriteFailed(err.to_string())
                }
            }
            _ => PersistenceError::WriteFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
