//! Error types for the XMLMC client
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for XMLMC operations
///
/// Every fallible operation in the crate surfaces one of these variants
/// to its immediate caller. Nothing is retried internally except the
/// single zone-host fallback performed by the zone resolver.
#[derive(Error, Debug)]
pub enum XmlmcError {
    /// An element or parameter name failed identifier validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A value could not be escaped into XML text
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Connection failure or a non-200 response from the server
    #[error("Network error: {message}")]
    Network {
        /// Human readable description of the failure
        message: String,
        /// HTTP status code when the server answered with a non-200 status
        status: Option<u16>,
    },

    /// Zone info document could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The outbound request could not be assembled
    #[error("Request construction error: {0}")]
    RequestConstruction(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl XmlmcError {
    /// Builds a [`XmlmcError::Network`] for a transport-level failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
        }
    }

    /// Builds a [`XmlmcError::Network`] for a response with an unexpected status.
    pub fn http_status(status: u16) -> Self {
        Self::Network {
            message: format!("Invalid HTTP Response: {}", status),
            status: Some(status),
        }
    }

    /// HTTP status code carried by a `Network` error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type alias for XMLMC operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type.
/// Typed failures are always raised as [`XmlmcError`] and can be recovered
/// with `err.downcast_ref::<XmlmcError>()`.
pub type Result<T> = anyhow::Result<T>;
