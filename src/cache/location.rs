//! Deterministic, day-bucketed cache locations.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of one cache bucket in seconds.
pub const BUCKET_SECONDS: i64 = 24 * 60 * 60;

/// Hex identifier of a cache entry for one `(day, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheLocation(String);

impl CacheLocation {
    /// The hex identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whole days since the Unix epoch.
pub fn day_bucket(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(BUCKET_SECONDS)
}

/// Derive the cache location for `license_key` at `now`.
///
/// `hex(sha256("<day>:<key>"))`. Stable within a UTC day, different on the
/// next one, and never exposes the key itself.
pub fn locate(license_key: &str, now: DateTime<Utc>) -> CacheLocation {
    let hash = Sha256::digest(format!("{}:{}", day_bucket(now), license_key).as_bytes());
    CacheLocation(hex::encode(hash))
}
