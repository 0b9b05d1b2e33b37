//! License keys and where they come from.

use crate::KeywardError;
use std::fmt;

/// Number of leading characters kept when a key is displayed.
const VISIBLE_PREFIX: usize = 4;

/// A user-supplied license key.
///
/// `Debug` and `Display` only ever show a short prefix, so a key can be
/// passed to logging macros without leaking it.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Wrap a key. The key is opaque and kept byte for byte.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The full key. Do not log this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True if the key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prefix of the key followed by an ellipsis.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
        if self.0.chars().count() > VISIBLE_PREFIX {
            format!("{}…", prefix)
        } else {
            "…".to_string()
        }
    }
}

impl fmt::Debug for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LicenseKey").field(&self.redacted()).finish()
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl From<&str> for LicenseKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for LicenseKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Supplies the license key to validate.
pub trait KeyProvider {
    /// Produce one license key.
    fn license_key(&self) -> Result<LicenseKey, KeywardError>;
}

impl KeyProvider for LicenseKey {
    fn license_key(&self) -> Result<LicenseKey, KeywardError> {
        Ok(self.clone())
    }
}

/// Reads the key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvKeyProvider {
    var: String,
}

impl EnvKeyProvider {
    /// Read from `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvKeyProvider {
    fn default() -> Self {
        Self::new("LICENSE_KEY")
    }
}

impl KeyProvider for EnvKeyProvider {
    fn license_key(&self) -> Result<LicenseKey, KeywardError> {
        std::env::var(&self.var)
            .map(LicenseKey::new)
            .map_err(|_| KeywardError::MissingLicense)
    }
}
