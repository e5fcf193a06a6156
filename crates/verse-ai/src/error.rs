//! Error types for verse-ai

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using verse-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failed generation, used to pick the
/// message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider rejected the credentials
    AuthRejected,
    /// The request never produced a response (connection, DNS, TLS...)
    Transport,
    /// The provider answered with an error or something unparseable
    Provider,
    /// The provider answered, but with no usable text
    EmptyResponse,
    /// The request did not finish within the configured limit
    Timeout,
    /// Local misconfiguration or anything else
    Other,
}

/// Errors that can occur when talking to a text generation provider
#[derive(Error, Debug)]
pub enum Error {
    /// No API key for a provider that requires one
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// Error reported from inside a response stream
    #[error("Stream error: {message}")]
    Stream { kind: FailureKind, message: String },

    /// The completion contained no text
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// The request exceeded its time limit
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::InvalidApiKey => FailureKind::AuthRejected,
            Error::Stream { kind, .. } => *kind,
            Error::EmptyResponse => FailureKind::EmptyResponse,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::InvalidConfig(_) => FailureKind::Other,
        }
    }
}

/// Map an HTTP status code from the provider onto a failure kind
pub fn status_kind(status: u16) -> FailureKind {
    match status {
        401 | 403 => FailureKind::AuthRejected,
        408 | 504 => FailureKind::Timeout,
        _ => FailureKind::Provider,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_auth_rejected() {
        assert_eq!(Error::InvalidApiKey.kind(), FailureKind::AuthRejected);
    }

    #[test]
    fn test_stream_error_keeps_its_kind() {
        let e = Error::Stream {
            kind: FailureKind::Transport,
            message: "connection reset".into(),
        };
        assert_eq!(e.kind(), FailureKind::Transport);
        assert_eq!(e.to_string(), "Stream error: connection reset");
    }

    #[test]
    fn test_local_failures() {
        assert_eq!(Error::EmptyResponse.kind(), FailureKind::EmptyResponse);
        assert_eq!(
            Error::Timeout(Duration::from_secs(5)).kind(),
            FailureKind::Timeout
        );
        assert_eq!(
            Error::InvalidConfig("no base url".into()).kind(),
            FailureKind::Other
        );
    }

    #[test]
    fn test_status_kind_table() {
        assert_eq!(status_kind(401), FailureKind::AuthRejected);
        assert_eq!(status_kind(403), FailureKind::AuthRejected);
        assert_eq!(status_kind(408), FailureKind::Timeout);
        assert_eq!(status_kind(504), FailureKind::Timeout);
        assert_eq!(status_kind(429), FailureKind::Provider);
        assert_eq!(status_kind(500), FailureKind::Provider);
    }
}
