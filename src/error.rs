//! Error types for gateway provisioning

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for gateway provisioning
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway provisioning errors
#[derive(Error, Debug)]
pub enum Error {
    /// Connection, TLS or timeout failure talking to a remote endpoint
    #[error("Transport error for {target}: {source}")]
    Transport {
        /// Resource path or URL being contacted
        target: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Remote endpoint answered with a status outside the accepted set
    #[error("Unexpected status {status} for {resource}{}", body_suffix(.body))]
    Status {
        /// Resource path or URL
        resource: String,
        /// Returned status
        status: StatusCode,
        /// Response body, when one could be read
        body: Option<String>,
    },

    /// Response body was not the expected JSON shape
    #[error("Malformed response from {resource}: {message}")]
    Decode {
        /// Resource path or URL
        resource: String,
        /// Decoder message
        message: String,
    },

    /// Input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Minting a consumer token failed
    #[error("Failed to create token for consumer {username}: {source}")]
    TokenIssuance {
        /// Consumer the token was requested for
        username: String,
        /// First failing step
        #[source]
        source: Box<Error>,
    },

    /// A required dependency failed its health check
    #[error("{dependency} is unavailable: {reason}")]
    Unavailable {
        /// Dependency name
        dependency: String,
        /// Why the check failed
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token signing error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

fn body_suffix(body: &Option<String>) -> String {
    match body.as_deref() {
        Some(b) if !b.is_empty() => format!(": {b}"),
        _ => String::new(),
    }
}

impl Error {
    /// Wrap a client error for `target`
    pub fn transport(target: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            target: target.into(),
            source,
        }
    }

    /// Wrap a decode failure for `resource`
    pub fn decode(resource: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// Status code carried by a [`Error::Status`], looking through token issuance wrapping
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::TokenIssuance { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether this is a [`Error::Validation`]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
