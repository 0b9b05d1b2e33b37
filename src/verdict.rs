//! Mapping a validation result onto the three user-visible outcomes.

use crate::protocol::models::ValidationOutcome;
use crate::KeywardError;
use std::fmt;

/// Exactly one of valid, invalid-with-reason, or fatal error.
#[derive(Debug)]
pub enum Verdict {
    /// The license is valid.
    Valid {
        /// License ID reported by the service.
        license_id: Option<String>,
        /// Whether the verdict came from the cache.
        from_cache: bool,
    },
    /// The service says the license is not valid, and said so authentically.
    Invalid {
        /// Reason supplied by the service.
        detail: Option<String>,
    },
    /// Validation could not be completed.
    Fatal(KeywardError),
}

impl Verdict {
    /// Process exit code: 0 valid, 1 invalid, 2 fatal.
    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Valid { .. } => 0,
            Verdict::Invalid { .. } => 1,
            Verdict::Fatal(_) => 2,
        }
    }

    /// True for a tamper or forgery failure.
    pub fn is_tampering(&self) -> bool {
        matches!(self, Verdict::Fatal(e) if e.is_integrity_failure())
    }
}

impl From<Result<ValidationOutcome, KeywardError>> for Verdict {
    fn from(result: Result<ValidationOutcome, KeywardError>) -> Self {
        match result {
            Ok(outcome) if outcome.valid => Verdict::Valid {
                license_id: outcome.license_id,
                from_cache: outcome.from_cache,
            },
            Ok(outcome) => Verdict::Invalid {
                detail: outcome.detail,
            },
            Err(e) => Verdict::Fatal(e),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid { license_id, .. } => match license_id {
                Some(id) => write!(f, "License {} is valid", id),
                None => write!(f, "License is valid"),
            },
            Verdict::Invalid { detail } => match detail {
                Some(detail) => write!(f, "License is not valid ({})", detail),
                None => write!(f, "License is not valid"),
            },
            Verdict::Fatal(KeywardError::TamperedCache) => {
                write!(f, "Signature verification failed! Cached data has been tampered with.")
            }
            Verdict::Fatal(e) => write!(f, "Validation failed: {}", e),
        }
    }
}
