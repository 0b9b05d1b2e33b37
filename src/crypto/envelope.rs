//! Signed response envelope.
//!
//! A [`SignedEnvelope`] holds everything needed to re-authenticate a
//! validation response later: the request target, the Date header, the
//! server's signature and the exact body bytes. It deliberately has no
//! digest field; [`SignedEnvelope::digest`] recomputes it from `body` on
//! every call.

use crate::crypto::canonical::body_digest;
use crate::crypto::verify::SignatureVerifier;
use crate::KeywardError;

/// A validation response together with its signature material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    /// Canonical `"<method> <path>"` of the originating request.
    pub target: String,

    /// Date header value, verbatim.
    pub date: String,

    /// Base64 signature extracted from the signature header.
    pub signature: String,

    /// Raw response body.
    pub body: Vec<u8>,
}

impl SignedEnvelope {
    /// Assemble an envelope.
    pub fn new(
        target: impl Into<String>,
        date: impl Into<String>,
        signature: impl Into<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            target: target.into(),
            date: date.into(),
            signature: signature.into(),
            body,
        }
    }

    /// `sha-256=<base64>` of the current body.
    pub fn digest(&self) -> String {
        body_digest(&self.body)
    }

    /// Re-authenticate the envelope against the verifier's key and host.
    pub fn verify(&self, verifier: &SignatureVerifier) -> Result<(), KeywardError> {
        verifier.verify(&self.target, &self.date, &self.body, &self.signature)
    }
}
