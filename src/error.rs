//! Error types for the service locator
//!
//! Provides structured error types for registry loading, the resolution
//! server, and the client helper.

use thiserror::Error;

/// Unified error type for the locator
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Registry Load Errors
    // =========================================================================
    #[error("Failed to load service registry from {path}: {reason}")]
    ConfigLoad { path: String, reason: String },

    // =========================================================================
    // Client Errors
    // =========================================================================
    #[error("Service not found: {service}")]
    ServiceNotFound { service: String },

    #[error("Locator returned unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // =========================================================================
    // Parse/IO Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Fatal errors abort startup; everything else is reported to the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConfigLoad { .. } | Error::Configuration(_))
    }

    /// Check whether this error means the queried service does not exist,
    /// as opposed to a transport or server failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ServiceNotFound { .. })
    }
}

/// Result type alias for the locator
pub type Result<T> = std::result::Result<T, Error>;
