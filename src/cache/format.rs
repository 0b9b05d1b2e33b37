//! On-disk cache entry format.
//!
//! An entry is the JSON form of a [`SignedEnvelope`]:
//! ```json
//! { "target": "post /v1/...", "date": "...", "signature": "<b64>", "body": "<b64>" }
//! ```
//! The body is stored base64-encoded so it round-trips byte for byte. No
//! digest is stored; it is recomputed from the body on every verification.

use crate::crypto::envelope::SignedEnvelope;
use crate::KeywardError;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Persisted form of a [`SignedEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Request target.
    pub target: String,

    /// Date header value.
    pub date: String,

    /// Base64 signature.
    pub signature: String,

    /// Base64 of the exact response body.
    pub body: String,
}

impl CacheEntry {
    /// Serialize the entry to JSON.
    pub fn to_json(&self) -> Result<String, KeywardError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KeywardError::StoreError(format!("Failed to serialize cache: {}", e)))
    }

    /// Deserialize an entry, rejecting bodies that are not valid base64.
    pub fn from_json(json: &str) -> Result<Self, KeywardError> {
        let entry: Self = serde_json::from_str(json)
            .map_err(|e| KeywardError::StoreError(format!("Failed to deserialize cache: {}", e)))?;
        entry.body_bytes()?;
        Ok(entry)
    }

    /// Decoded body bytes.
    pub fn body_bytes(&self) -> Result<Vec<u8>, KeywardError> {
        STANDARD
            .decode(&self.body)
            .map_err(|e| KeywardError::StoreError(format!("Cached body is not base64: {}", e)))
    }

    /// Rebuild the envelope for verification.
    pub fn into_envelope(self) -> Result<SignedEnvelope, KeywardError> {
        let body = self.body_bytes()?;
        Ok(SignedEnvelope::new(self.target, self.date, self.signature, body))
    }
}

impl From<&SignedEnvelope> for CacheEntry {
    fn from(envelope: &SignedEnvelope) -> Self {
        Self {
            target: envelope.target.clone(),
            date: envelope.date.clone(),
            signature: envelope.signature.clone(),
            body: STANDARD.encode(&envelope.body),
        }
    }
}
