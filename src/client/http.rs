//! Remote validation exchange.
//!
//! [`ValidationTransport`] is the seam between the validator and the
//! network. [`KeygenClient`] is the reqwest-backed implementation; it
//! captures the headers needed for signature verification.

use crate::config::KeywardConfig;
use crate::KeywardError;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, DATE, USER_AGENT};

/// JSON:API media type used for both request and response.
pub const JSON_API: &str = "application/vnd.api+json";

/// Name of the parameterized signature header.
pub const SIGNATURE_HEADER: &str = "Keygen-Signature";

/// HTTP response with captured headers and body.
#[derive(Debug, Clone)]
pub struct KeygenResponse {
    /// HTTP status code.
    pub status: u16,

    /// Date header value.
    pub date: Option<String>,

    /// Keygen-Signature header value.
    pub signature: Option<String>,

    /// Digest header value.
    pub digest: Option<String>,

    /// Raw response body.
    pub body: Vec<u8>,

    /// Request path used (for signing string reconstruction).
    pub request_path: String,
}

impl KeygenResponse {
    /// Extract headers from a reqwest Response.
    fn from_response(response: Response, request_path: String) -> Result<Self, KeywardError> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };

        let date = header(DATE.as_str());
        let signature = header(SIGNATURE_HEADER);
        let digest = header("Digest");

        let body = response
            .bytes()
            .map_err(|e| KeywardError::Transport(format!("Failed to read body: {}", e)))?
            .to_vec();

        Ok(Self {
            status,
            date,
            signature,
            digest,
            body,
            request_path,
        })
    }
}

/// Performs one validate-key exchange for a license key.
pub trait ValidationTransport: Send + Sync {
    /// POST `{"meta":{"key":...}}` and return the raw response.
    fn validate_key(&self, license_key: &str) -> Result<KeygenResponse, KeywardError>;
}

/// Keygen HTTP client.
pub struct KeygenClient {
    client: Client,
    user_agent: String,
    host: String,
    path: String,
}

impl KeygenClient {
    /// Create a new Keygen client from config.
    pub fn new(config: &KeywardConfig) -> Result<Self, KeywardError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| KeywardError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: build_user_agent(config),
            host: config.host.clone(),
            path: config.validate_path(),
        })
    }

    /// Get the configured host.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl ValidationTransport for KeygenClient {
    fn validate_key(&self, license_key: &str) -> Result<KeygenResponse, KeywardError> {
        let url = format!("https://{}{}", self.host, self.path);

        let body = serde_json::json!({
            "meta": {
                "key": license_key
            }
        });
        let body_bytes = serde_json::to_vec(&body)
            .map_err(|e| KeywardError::Protocol(format!("Failed to serialize: {}", e)))?;

        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, &self.user_agent)
            .header(CONTENT_TYPE, JSON_API)
            .header(ACCEPT, JSON_API)
            .body(body_bytes)
            .send()
            .map_err(|e| KeywardError::Transport(format!("Request failed: {}", e)))?;

        KeygenResponse::from_response(response, self.path.clone())
    }
}

/// Build a User-Agent string from config.
///
/// Format: `<product>/keyward-<version> <app>`
pub fn build_user_agent(config: &KeywardConfig) -> String {
    format!(
        "{}/keyward-{} {}",
        config.user_agent_product,
        env!("CARGO_PKG_VERSION"),
        config.app_name
    )
}
