//! Keyward configuration.

use crate::KeywardError;
use std::path::PathBuf;
use std::time::Duration;

/// Default licensing API host. Also the `host` line of the signing string.
pub const DEFAULT_HOST: &str = "api.keygen.sh";

/// Environment variable holding the account ID.
pub const ENV_ACCOUNT_ID: &str = "KEYGEN_ACCOUNT_ID";

/// Environment variable holding the base64 DER/SPKI public key.
pub const ENV_PUBLIC_KEY: &str = "KEYGEN_PUBLIC_KEY";

/// Environment variable overriding the cache directory.
pub const ENV_CACHE_DIR: &str = "KEYWARD_CACHE_DIR";

/// Configuration for license validation.
///
/// Key material is passed in explicitly; the library never reads it from
/// ambient state on its own. [`KeywardConfig::from_env`] is offered for
/// binaries that want the conventional environment variables.
#[derive(Debug, Clone)]
pub struct KeywardConfig {
    /// Keygen account ID, used to build the request path.
    pub account_id: String,

    /// Keygen Ed25519 verify key, base64-wrapped DER (SPKI).
    pub public_key: String,

    /// API host. Must match the host the service signs with.
    pub host: String,

    /// Application name for the User-Agent.
    pub app_name: String,

    /// User-Agent product identifier.
    pub user_agent_product: String,

    /// Namespace under the platform data dir, used when `cache_dir` is unset.
    pub cache_namespace: String,

    /// Explicit cache root.
    pub cache_dir: Option<PathBuf>,

    /// Request timeout for the validation call.
    pub timeout: Duration,
}

impl KeywardConfig {
    /// Create a config with defaults for everything but the account and key.
    pub fn new(account_id: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            public_key: public_key.into(),
            host: DEFAULT_HOST.to_string(),
            app_name: "keyward".to_string(),
            user_agent_product: "keyward".to_string(),
            cache_namespace: "keyward".to_string(),
            cache_dir: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Build a config from `KEYGEN_ACCOUNT_ID`, `KEYGEN_PUBLIC_KEY` and the
    /// optional `KEYWARD_CACHE_DIR`.
    pub fn from_env() -> Result<Self, KeywardError> {
        let account_id = std::env::var(ENV_ACCOUNT_ID)
            .map_err(|_| KeywardError::ConfigError(format!("{} is not set", ENV_ACCOUNT_ID)))?;
        let public_key = std::env::var(ENV_PUBLIC_KEY)
            .map_err(|_| KeywardError::ConfigError(format!("{} is not set", ENV_PUBLIC_KEY)))?;

        let mut config = Self::new(account_id, public_key);
        config.cache_dir = std::env::var_os(ENV_CACHE_DIR).map(PathBuf::from);
        config.validate()?;
        Ok(config)
    }

    /// Set an explicit cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Path of the validate-key action for this account.
    pub fn validate_path(&self) -> String {
        format!(
            "/v1/accounts/{}/licenses/actions/validate-key",
            self.account_id
        )
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), KeywardError> {
        if self.account_id.is_empty() {
            return Err(KeywardError::ConfigError(
                "account_id cannot be empty".to_string(),
            ));
        }
        if self.public_key.trim().is_empty() {
            return Err(KeywardError::ConfigError(
                "public_key cannot be empty".to_string(),
            ));
        }
        if self.host.is_empty() {
            return Err(KeywardError::ConfigError("host cannot be empty".to_string()));
        }
        if self.cache_dir.is_none() && self.cache_namespace.is_empty() {
            return Err(KeywardError::ConfigError(
                "cache_namespace cannot be empty without a cache_dir".to_string(),
            ));
        }
        Ok(())
    }
}
