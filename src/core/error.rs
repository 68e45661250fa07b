//! Error types for the vtbridge library.
//!
//! `VtError` covers failures that abort an operation: the request could not
//! be sent, or the service answered with something that matches neither the
//! success schema nor the error schema. Application-level errors reported by
//! VirusTotal are *not* errors here; they are returned as
//! [`ApiResponse::Error`](crate::core::ApiResponse::Error).

use thiserror::Error;

/// The main error type for VirusTotal operations.
#[derive(Debug, Error)]
pub enum VtError {
    /// The HTTP exchange itself failed (connect, TLS, body read).
    #[error("request to '{endpoint}' failed: {message}")]
    Transport {
        /// Endpoint that was being called.
        endpoint: String,
        /// Error message from the HTTP layer.
        message: String,
    },

    /// The response matched neither the success nor the error schema.
    #[error("invalid response from '{endpoint}': {details}")]
    Validation {
        /// Endpoint that produced the response.
        endpoint: String,
        /// What did not match.
        details: String,
    },

    /// The upload exceeds the pre-flight size limit.
    #[error("file size {size} bytes is not below the {max} byte upload limit")]
    FileTooLarge {
        /// Content size in bytes.
        size: u64,
        /// Limit in bytes (exclusive).
        max: u64,
    },

    /// File not found at the specified path.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// The caller supplied input that cannot be turned into a request.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl VtError {
    /// Returns `true` if the service response failed schema validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if the HTTP exchange failed before a body was read.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns the endpoint name if this error is associated with one.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Transport { endpoint, .. } | Self::Validation { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }

    /// Creates a `Transport` error.
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a `Validation` error.
    pub fn validation(endpoint: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Validation {
            endpoint: endpoint.into(),
            details: details.into(),
        }
    }

    /// Creates an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for VirusTotal operations.
pub type VtResult<T> = Result<T, VtError>;
