//! License Manager - the main public API for Keyward.
//!
//! `LicenseManager::validate_key` runs one validation:
//! 1. Look up today's cache entry for the key
//! 2. On a hit, re-verify the entry from scratch (tampering is fatal)
//! 3. On a miss, call the service and parse the response
//! 4. Verify the response signature over the canonical signing string
//! 5. Cache the envelope only if the license is valid

use crate::cache::file::FileCache;
use crate::cache::format::CacheEntry;
use crate::cache::location::{locate, CacheLocation};
use crate::client::http::{KeygenClient, KeygenResponse, ValidationTransport};
use crate::clock::{Clock, SystemClock};
use crate::config::KeywardConfig;
use crate::crypto::canonical::{digest_header_matches, request_target};
use crate::crypto::envelope::SignedEnvelope;
use crate::crypto::header::parse_header_params;
use crate::crypto::verify::SignatureVerifier;
use crate::key::{KeyProvider, LicenseKey};
use crate::protocol::models::{parse_validate_response, ValidationOutcome};
use crate::KeywardError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-location locks so one process never validates the same key twice
/// at the same time.
#[derive(Default)]
struct InFlight {
    slots: Mutex<HashMap<CacheLocation, Arc<Mutex<()>>>>,
}

impl InFlight {
    fn slot(&self, location: &CacheLocation) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Slots only the map still references are idle.
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        slots.entry(location.clone()).or_default().clone()
    }
}

/// Main license manager for Keyward.
///
/// Create one instance per application and reuse it. It is `Send + Sync`;
/// validations of different keys proceed independently.
pub struct LicenseManager {
    config: KeywardConfig,
    clock: Arc<dyn Clock>,
    transport: Arc<dyn ValidationTransport>,
    cache: FileCache,
    verifier: SignatureVerifier,
    in_flight: InFlight,
}

impl LicenseManager {
    /// Create a new license manager with the given configuration.
    ///
    /// Uses the reqwest client, the configured cache directory and the
    /// system clock.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The public key cannot be decoded
    /// - HTTP client creation fails
    /// - Cache directory creation fails
    pub fn new(config: KeywardConfig) -> Result<Self, KeywardError> {
        config.validate()?;
        let transport = KeygenClient::new(&config)?;
        let cache = match &config.cache_dir {
            Some(dir) => FileCache::with_path(dir.clone())?,
            None => FileCache::new(&config.cache_namespace)?,
        };
        Self::from_parts(config, Arc::new(transport), cache, Arc::new(SystemClock))
    }

    /// Assemble a manager from explicit collaborators.
    pub fn from_parts(
        config: KeywardConfig,
        transport: Arc<dyn ValidationTransport>,
        cache: FileCache,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, KeywardError> {
        config.validate()?;
        let verifier = SignatureVerifier::new(config.host.clone(), &config.public_key)?;

        Ok(Self {
            config,
            clock,
            transport,
            cache,
            verifier,
            in_flight: InFlight::default(),
        })
    }

    /// Validate the key produced by `provider`.
    pub fn validate_with(
        &self,
        provider: &dyn KeyProvider,
    ) -> Result<ValidationOutcome, KeywardError> {
        let key = provider.license_key()?;
        self.validate_key(&key)
    }

    /// Validate a license key.
    ///
    /// # Errors
    /// - `MissingLicense` - Empty key
    /// - `TamperedCache` - Today's cache entry failed re-verification (it is deleted)
    /// - `RemoteValidation` - The service rejected the request
    /// - `SignatureMissing` / `SignatureMismatch` / `DigestMismatch` - Response failed verification
    /// - `Transport` / `Protocol` - Network failure or unparsable response
    /// - `StoreError` - Cache I/O failure
    pub fn validate_key(&self, key: &LicenseKey) -> Result<ValidationOutcome, KeywardError> {
        if key.is_empty() {
            return Err(KeywardError::MissingLicense);
        }

        let location = locate(key.expose(), self.clock.now_utc());
        let slot = self.in_flight.slot(&location);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = self.cache.get(&location)? {
            return self.validate_cached(key, &location, entry);
        }

        self.validate_online(key, &location)
    }

    /// `(request-target)` every response for this account is signed over.
    fn validate_target(&self) -> String {
        request_target("post", &self.config.validate_path())
    }

    /// Location today's entry for `key` lives at.
    pub fn cache_location(&self, key: &LicenseKey) -> CacheLocation {
        locate(key.expose(), self.clock.now_utc())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &KeywardConfig {
        &self.config
    }

    /// The underlying cache store.
    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    fn validate_cached(
        &self,
        key: &LicenseKey,
        location: &CacheLocation,
        entry: CacheEntry,
    ) -> Result<ValidationOutcome, KeywardError> {
        match self.authenticate_cached(key, entry) {
            Ok(outcome) => {
                tracing::debug!(%key, %location, valid = outcome.valid, "validated from cache");
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(%key, %location, error = %e, "cached validation failed verification");
                if let Err(evict_err) = self.cache.evict(location) {
                    tracing::warn!(%location, error = %evict_err, "failed to evict tampered entry");
                }
                Err(KeywardError::TamperedCache)
            }
        }
    }

    fn authenticate_cached(
        &self,
        key: &LicenseKey,
        entry: CacheEntry,
    ) -> Result<ValidationOutcome, KeywardError> {
        let envelope = entry.into_envelope()?;
        if envelope.target != self.validate_target() {
            return Err(KeywardError::TamperedCache);
        }

        envelope.verify(&self.verifier)?;

        let response = parse_validate_response(&envelope.body)?;
        // A genuine entry copied over from another key's location.
        if response.license_key().is_some_and(|k| k != key.expose()) {
            return Err(KeywardError::TamperedCache);
        }

        ValidationOutcome::from_response(&response, true)
    }

    fn validate_online(
        &self,
        key: &LicenseKey,
        location: &CacheLocation,
    ) -> Result<ValidationOutcome, KeywardError> {
        let response = self.transport.validate_key(key.expose())?;

        if response.status >= 500 {
            return Err(KeywardError::Transport(format!(
                "Service unavailable (HTTP {})",
                response.status
            )));
        }

        let parsed = parse_validate_response(&response.body)?;
        if let Some(errors) = parsed.remote_errors() {
            return Err(KeywardError::RemoteValidation { errors });
        }

        let envelope = authenticate_response(&response, &self.validate_target(), &self.verifier)?;
        let outcome = ValidationOutcome::from_response(&parsed, false)?;

        if !outcome.valid {
            tracing::info!(%key, detail = ?outcome.detail, "license is not valid");
            return Ok(outcome);
        }

        self.cache.put(location, &CacheEntry::from(&envelope))?;
        tracing::debug!(%key, %location, "validated online");
        Ok(outcome)
    }
}

/// Verify a live response and package it as an envelope.
///
/// `target` is the request target the response must have been signed for;
/// a response to any other path is rejected before verification.
fn authenticate_response(
    response: &KeygenResponse,
    target: &str,
    verifier: &SignatureVerifier,
) -> Result<SignedEnvelope, KeywardError> {
    if request_target("post", &response.request_path) != target {
        return Err(KeywardError::Protocol(format!(
            "Response is for unexpected path {}",
            response.request_path
        )));
    }

    let params =
        parse_header_params(response.signature.as_deref()).ok_or(KeywardError::SignatureMissing)?;

    if let Some(algorithm) = params.get("algorithm") {
        if !algorithm.eq_ignore_ascii_case("ed25519") {
            return Err(KeywardError::SignatureMismatch);
        }
    }

    let signature = params
        .get("signature")
        .filter(|s| !s.is_empty())
        .ok_or(KeywardError::SignatureMissing)?;

    let date = response
        .date
        .as_deref()
        .ok_or(KeywardError::SignatureMissing)?;

    if let Some(digest) = response.digest.as_deref() {
        if !digest_header_matches(&response.body, digest) {
            return Err(KeywardError::DigestMismatch);
        }
    }

    let envelope = SignedEnvelope::new(
        target,
        date,
        signature.as_str(),
        response.body.clone(),
    );
    envelope.verify(verifier)?;
    Ok(envelope)
}
