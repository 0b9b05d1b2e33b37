//! Keygen validate-key response structs and outcome extraction.

use crate::errors::RemoteError;
use crate::KeywardError;
use serde::{Deserialize, Serialize};

/// Raw validate-key response body (JSON:API shaped).
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateResponse {
    /// Validation verdict; absent on error responses.
    #[serde(default)]
    pub meta: Option<ValidateMeta>,
    /// License resource, when the key matched one.
    #[serde(default)]
    pub data: Option<LicenseData>,
    /// Request errors; present when the service rejected the request.
    #[serde(default)]
    pub errors: Option<Vec<ApiError>>,
}

/// Metadata from validation response.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateMeta {
    /// Whether the license is valid.
    pub valid: bool,
    /// Machine-readable validation code (e.g. `VALID`, `EXPIRED`).
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable explanation.
    #[serde(default)]
    pub detail: Option<String>,
}

/// License data from response.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseData {
    /// License ID.
    pub id: String,
    /// Resource type, normally `licenses`.
    #[serde(rename = "type", default)]
    pub data_type: Option<String>,
    /// License attributes.
    #[serde(default)]
    pub attributes: Option<LicenseAttributes>,
}

/// The subset of license attributes this crate looks at.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseAttributes {
    /// The license key the resource belongs to.
    #[serde(default)]
    pub key: Option<String>,
    /// License name.
    #[serde(default)]
    pub name: Option<String>,
    /// Expiry timestamp (RFC 3339).
    #[serde(default)]
    pub expiry: Option<String>,
}

/// A single JSON:API error object.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Short summary.
    #[serde(default)]
    pub title: String,
    /// Longer explanation.
    #[serde(default)]
    pub detail: Option<String>,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
}

impl ValidateResponse {
    /// Service-reported errors, or `None` when there are none.
    pub fn remote_errors(&self) -> Option<Vec<RemoteError>> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        Some(
            errors
                .iter()
                .map(|e| RemoteError {
                    title: e.title.clone(),
                    detail: e.detail.clone(),
                })
                .collect(),
        )
    }

    /// License key echoed back in the license attributes, if any.
    pub fn license_key(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.attributes.as_ref())
            .and_then(|a| a.key.as_deref())
    }
}

/// Verdict for one license key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the license is valid.
    pub valid: bool,

    /// Reason supplied by the service.
    pub detail: Option<String>,

    /// License ID, for valid licenses.
    pub license_id: Option<String>,

    /// Validation code from the service.
    pub code: Option<String>,

    /// Whether this outcome was served from the cache.
    pub from_cache: bool,
}

impl ValidationOutcome {
    /// Extract the outcome from a parsed response.
    ///
    /// # Errors
    /// * `Protocol` - the response has no `meta` block
    pub fn from_response(
        response: &ValidateResponse,
        from_cache: bool,
    ) -> Result<Self, KeywardError> {
        let meta = response
            .meta
            .as_ref()
            .ok_or_else(|| KeywardError::Protocol("Response has no meta block".to_string()))?;

        let license_id = if meta.valid {
            response.data.as_ref().map(|d| d.id.clone())
        } else {
            None
        };

        Ok(Self {
            valid: meta.valid,
            detail: meta.detail.clone(),
            license_id,
            code: meta.code.clone(),
            from_cache,
        })
    }
}

/// Parse raw JSON body into a validate-key response.
pub fn parse_validate_response(body: &[u8]) -> Result<ValidateResponse, KeywardError> {
    serde_json::from_slice(body)
        .map_err(|e| KeywardError::Protocol(format!("Failed to parse response: {}", e)))
}
