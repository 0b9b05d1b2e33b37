//! Canonical signing string reconstruction.
//!
//! Keygen signs every response over four components, in this order:
//! ```text
//! (request-target): post /v1/accounts/<id>/licenses/actions/validate-key
//! host: api.keygen.sh
//! date: <Date header>
//! digest: sha-256=<base64>
//! ```
//! Lines are joined with `\n` and there is no trailing newline. The digest
//! line is always derived from the body bytes at hand.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

/// Algorithm tag prefixed to every digest value.
pub const DIGEST_PREFIX: &str = "sha-256=";

/// Compute `sha-256=<base64(sha256(body))>`.
pub fn body_digest(body: &[u8]) -> String {
    format!("{}{}", DIGEST_PREFIX, STANDARD.encode(Sha256::digest(body)))
}

/// Compare a server-supplied Digest header against the recomputed digest.
///
/// The algorithm tag is matched case-insensitively; the base64 payload
/// must match exactly.
pub fn digest_header_matches(body: &[u8], header: &str) -> bool {
    let header = header.trim();
    let Some((algorithm, value)) = header.split_once('=') else {
        return false;
    };
    if !algorithm.eq_ignore_ascii_case("sha-256") {
        return false;
    }
    STANDARD.encode(Sha256::digest(body)) == value
}

/// Build the request target line value: lowercase method, a space, the path.
pub fn request_target(method: &str, path: &str) -> String {
    format!("{} {}", method.to_lowercase(), path)
}

/// Build the signing string for a response.
///
/// # Arguments
/// * `target` - Request target, e.g. `post /v1/accounts/x/licenses/actions/validate-key`
/// * `host` - Host the request was sent to
/// * `date` - Date header value, verbatim
/// * `body` - Response body; its digest is computed here
pub fn signing_string(target: &str, host: &str, date: &str, body: &[u8]) -> String {
    [
        format!("(request-target): {}", target),
        format!("host: {}", host),
        format!("date: {}", date),
        format!("digest: {}", body_digest(body)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_digest_empty() {
        assert_eq!(
            body_digest(b""),
            "sha-256=47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn test_body_digest_hello_world() {
        assert_eq!(
            body_digest(b"Hello, World!"),
            "sha-256=3/1gIbsr1bCvZ2KQgJ7DpTGR3YHH9wpLKGiKNiGCmG8="
        );
    }

    #[test]
    fn test_digest_header_matches() {
        let body = b"test body";
        assert!(digest_header_matches(body, &body_digest(body)));

        let upper = body_digest(body).replacen("sha-256", "SHA-256", 1);
        assert!(digest_header_matches(body, &upper));
    }

    #[test]
    fn test_digest_header_mismatch() {
        assert!(!digest_header_matches(
            b"test body",
            "sha-256=AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
        ));
        assert!(!digest_header_matches(b"test body", "md5=abc"));
        assert!(!digest_header_matches(b"test body", "garbage"));
    }

    #[test]
    fn test_request_target_lowercases_method() {
        assert_eq!(request_target("POST", "/v1/test"), "post /v1/test");
    }

    #[test]
    fn test_signing_string_format() {
        let body = br#"{"meta":{"valid":true}}"#;
        let signing = signing_string(
            "post /v1/accounts/test-account/licenses/actions/validate-key",
            "api.keygen.sh",
            "Wed, 09 Jun 2021 16:08:15 GMT",
            body,
        );

        let expected = format!(
            "(request-target): post /v1/accounts/test-account/licenses/actions/validate-key\n\
             host: api.keygen.sh\n\
             date: Wed, 09 Jun 2021 16:08:15 GMT\n\
             digest: {}",
            body_digest(body)
        );

        assert_eq!(signing, expected);
        assert!(!signing.ends_with('\n'));
    }

    #[test]
    fn test_signing_string_tracks_body() {
        let a = signing_string("post /x", "h", "d", b"one");
        let b = signing_string("post /x", "h", "d", b"two");
        assert_ne!(a, b);
    }
}
