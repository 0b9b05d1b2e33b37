//! # Keyward
//!
//! **Signed-response license key validation with a self-verifying cache.**
//!
//! Keyward validates license keys via Keygen's `validate-key` API and
//! **cryptographically verifies** every response using Ed25519 signatures
//! over a canonical signing string. Valid responses are cached for the rest
//! of the UTC day, and every cache read is re-verified from scratch.
//!
//! ## Features
//!
//! - **Canonical signature verification** over `(request-target)`, `host`,
//!   `date` and a recomputed body `digest`
//! - **Self-verifying cache** with one entry per key per day; tampered
//!   entries are deleted and reported, never trusted
//! - **No negative caching** so an invalid key is always re-checked live
//! - **Fail-closed security** where missing signatures or headers cause
//!   rejection, not bypass
//!
//! ## Quickstart
//!
//! ```no_run
//! use keyward::{KeywardConfig, LicenseKey, LicenseManager};
//!
//! fn main() -> Result<(), keyward::KeywardError> {
//!     let config = KeywardConfig::new(
//!         "your-keygen-account-id",
//!         "MCowBQYDK2VwAyEA...your-base64-der-public-key",
//!     );
//!
//!     let manager = LicenseManager::new(config)?;
//!     let outcome = manager.validate_key(&LicenseKey::new("LICENSE-KEY-HERE"))?;
//!
//!     if outcome.valid {
//!         println!("License valid! (cached: {})", outcome.from_cache);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! Keyward protects against:
//! - **MITM attacks** where spoofed responses fail signature verification
//! - **Cache tampering** where edited bodies change the recomputed digest
//! - **Cache transplanting** where an entry copied from another key's
//!   location names the wrong license key
//!
//! It does **not** prevent binary patching. Client-side licensing can
//! always be bypassed by a determined attacker with access to the binary.

#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;
pub mod key;

// Crypto layer
pub mod crypto;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Cache layer
pub mod cache;

// Manager (main public API)
pub mod manager;
pub mod verdict;

// Re-exports for public API
pub use cache::file::FileCache;
pub use cache::location::{locate, CacheLocation};
pub use cache::observer::{CacheEvent, CacheObserver};
pub use client::http::{KeygenResponse, ValidationTransport};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::KeywardConfig;
pub use crypto::verify::{verify_canonical, verify_direct, SignatureVerifier};
pub use errors::{KeywardError, RemoteError};
pub use key::{EnvKeyProvider, KeyProvider, LicenseKey};
pub use manager::LicenseManager;
pub use protocol::models::ValidationOutcome;
pub use verdict::Verdict;
