//! Keyward error types.

use std::fmt;
use thiserror::Error;

/// A single error object returned by the licensing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Short error title (e.g. "Bad request").
    pub title: String,

    /// Human readable detail, if the service supplied one.
    pub detail: Option<String>,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.title, detail),
            None => write!(f, "{}", self.title),
        }
    }
}

fn join_remote_errors(errors: &[RemoteError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur during license validation.
#[derive(Debug, Error)]
pub enum KeywardError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No license key provided.
    #[error("No license key provided")]
    MissingLicense,

    /// The licensing service rejected the request.
    #[error("Remote validation failed: {}", join_remote_errors(.errors))]
    RemoteValidation {
        /// Title/detail pairs supplied by the service.
        errors: Vec<RemoteError>,
    },

    /// Response signature or date header is missing (fail-closed).
    #[error("Response signature or date header missing")]
    SignatureMissing,

    /// Response signature verification failed.
    #[error("Response signature verification failed")]
    SignatureMismatch,

    /// Digest header does not match the recomputed body digest.
    #[error("Response digest mismatch")]
    DigestMismatch,

    /// The configured public key could not be decoded.
    #[error("Malformed public key: {0}")]
    MalformedPublicKey(String),

    /// A cached entry failed re-verification and was removed.
    #[error("Cached validation failed verification; the cache has been tampered with")]
    TamperedCache,

    /// Cache persistence failure other than "not found".
    #[error("Cache store error: {0}")]
    StoreError(String),

    /// HTTP transport error communicating with the licensing service.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failed to parse the licensing service response.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl KeywardError {
    /// True for errors that indicate forged or altered data rather than
    /// a service or environment problem.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            KeywardError::SignatureMissing
                | KeywardError::SignatureMismatch
                | KeywardError::DigestMismatch
                | KeywardError::TamperedCache
        )
    }
}
