//! Ed25519 public key decoding and signature verification.
//!
//! Two verification modes are offered:
//! - [`verify_direct`] checks a signature over the raw body bytes and
//!   reports a plain `bool`.
//! - [`verify_canonical`] (and [`SignatureVerifier`]) checks a signature
//!   over the reconstructed canonical signing string.

use crate::crypto::canonical::signing_string;
use crate::KeywardError;
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::pkcs8::DecodePublicKey;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::RwLock;

/// Cache for decoded verifying keys, keyed by the configured key text.
static KEY_CACHE: OnceCell<RwLock<HashMap<String, VerifyingKey>>> = OnceCell::new();

/// Decode a base64-wrapped DER (SPKI) Ed25519 public key.
///
/// PEM armor lines are tolerated and a bare 32-byte key is accepted.
/// The key is cached after first decode.
pub fn decode_public_key(encoded: &str) -> Result<VerifyingKey, KeywardError> {
    let cache = KEY_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    if let Ok(guard) = cache.read() {
        if let Some(key) = guard.get(encoded) {
            return Ok(*key);
        }
    }

    let b64: String = encoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .collect();

    let bytes = STANDARD
        .decode(b64)
        .map_err(|e| KeywardError::MalformedPublicKey(format!("invalid base64: {}", e)))?;

    let verifying_key = if bytes.len() == 32 {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&bytes);
        VerifyingKey::from_bytes(&raw)
            .map_err(|e| KeywardError::MalformedPublicKey(format!("invalid Ed25519 key: {}", e)))?
    } else {
        VerifyingKey::from_public_key_der(&bytes)
            .map_err(|e| KeywardError::MalformedPublicKey(format!("invalid SPKI: {}", e)))?
    };

    if let Ok(mut guard) = cache.write() {
        guard.insert(encoded.to_string(), verifying_key);
    }

    Ok(verifying_key)
}

/// Verify a base64 Ed25519 signature over `message`.
///
/// Undecodable or wrong-length signatures count as a mismatch.
pub fn verify_ed25519(
    signature_b64: &str,
    message: &[u8],
    verifying_key: &VerifyingKey,
) -> Result<(), KeywardError> {
    let sig_bytes = STANDARD
        .decode(signature_b64.trim())
        .map_err(|_| KeywardError::SignatureMismatch)?;

    let sig_array: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| KeywardError::SignatureMismatch)?;

    let signature = Signature::from_bytes(&sig_array);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| KeywardError::SignatureMismatch)
}

/// Verify an Ed25519 signature computed over the exact body bytes.
///
/// Never errors: any malformed input yields `false`. This is not the
/// RSA-SHA256 `X-Signature` scheme some Keygen deployments send; such
/// signatures always fail here.
pub fn verify_direct(body: &[u8], signature_b64: &str, public_key: &str) -> bool {
    let Ok(key) = decode_public_key(public_key) else {
        return false;
    };
    verify_ed25519(signature_b64, body, &key).is_ok()
}

/// Verify a signature over the canonical signing string.
///
/// # Errors
/// * `SignatureMissing` - no signature supplied
/// * `MalformedPublicKey` - the key blob cannot be decoded
/// * `SignatureMismatch` - the signature does not verify
pub fn verify_canonical(
    target: &str,
    host: &str,
    date: &str,
    body: &[u8],
    signature_b64: Option<&str>,
    public_key: &str,
) -> Result<(), KeywardError> {
    let signature_b64 = signature_b64
        .filter(|s| !s.is_empty())
        .ok_or(KeywardError::SignatureMissing)?;
    let key = decode_public_key(public_key)?;
    verify_ed25519(signature_b64, signing_string(target, host, date, body).as_bytes(), &key)
}

/// Canonical-mode verifier bound to one host and one public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    host: String,
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Build a verifier, decoding the key up front.
    pub fn new(host: impl Into<String>, public_key: &str) -> Result<Self, KeywardError> {
        Ok(Self {
            host: host.into(),
            key: decode_public_key(public_key)?,
        })
    }

    /// Host used on the `host:` line of the signing string.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Verify `signature_b64` against the canonical string for this response.
    pub fn verify(
        &self,
        target: &str,
        date: &str,
        body: &[u8],
        signature_b64: &str,
    ) -> Result<(), KeywardError> {
        if signature_b64.is_empty() {
            return Err(KeywardError::SignatureMissing);
        }
        let message = signing_string(target, &self.host, date, body);
        verify_ed25519(signature_b64, message.as_bytes(), &self.key)
    }
}
