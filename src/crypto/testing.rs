//! Shared Ed25519 fixtures for unit tests.

use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signer, SigningKey};

// RFC 8032 test vector 1 (DO NOT USE IN PRODUCTION)
const TEST_SIGNING_SEED_BYTES: [u8; 32] = [
    0x9d, 0x61, 0xb1, 0x9d, 0xef, 0xfd, 0x5a, 0x60, 0xba, 0x84, 0x4a, 0xf4, 0x92, 0xec, 0x2c,
    0xc4, 0x44, 0x49, 0xc5, 0x69, 0x7b, 0x32, 0x69, 0x19, 0x70, 0x3b, 0xac, 0x03, 0x1c, 0xae,
    0x7f, 0x60,
];

/// SPKI wrapping of the verify key for `TEST_SIGNING_SEED_BYTES`.
pub const TEST_PUBLIC_KEY_DER_B64: &str = "MCowBQYDK2VwAyEA11qYAYKxCrfVS/7TyWQHOg7hcvPapiMlrwIaaPcHURo=";

/// An unrelated valid Ed25519 verify key.
pub const OTHER_PUBLIC_KEY_DER_B64: &str = "MCowBQYDK2VwAyEAeZ78d1Iobmw4FbEzWNmPwPC1ZnZEWK3LSPG+LBClWQY=";

/// Sign `message` with the test key, returning base64.
pub fn sign(message: &[u8]) -> String {
    let signing_key = SigningKey::from_bytes(&TEST_SIGNING_SEED_BYTES);
    STANDARD.encode(signing_key.sign(message).to_bytes())
}
