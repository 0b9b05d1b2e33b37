//! End-to-end validation scenarios against an in-memory licensing service.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use ed25519_dalek::{Signer, SigningKey};
use keyward::cache::format::CacheEntry;
use keyward::crypto::canonical::{body_digest, request_target, signing_string};
use keyward::{
    Clock, FileCache, KeygenResponse, KeywardConfig, KeywardError, LicenseKey, LicenseManager,
    MockClock, ValidationTransport, Verdict,
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

// RFC 8032 test vector 1 (DO NOT USE IN PRODUCTION)
const SEED: [u8; 32] = [
    0x9d, 0x61, 0xb1, 0x9d, 0xef, 0xfd, 0x5a, 0x60, 0xba, 0x84, 0x4a, 0xf4, 0x92, 0xec, 0x2c,
    0xc4, 0x44, 0x49, 0xc5, 0x69, 0x7b, 0x32, 0x69, 0x19, 0x70, 0x3b, 0xac, 0x03, 0x1c, 0xae,
    0x7f, 0x60,
];
const PUBLIC_KEY_DER_B64: &str = "MCowBQYDK2VwAyEA11qYAYKxCrfVS/7TyWQHOg7hcvPapiMlrwIaaPcHURo=";
const ACCOUNT: &str = "demo-account";
const HOST: &str = "api.keygen.sh";

/// Fake licensing service: signs every response it hands out.
struct FakeKeygen {
    licenses: HashMap<&'static str, &'static str>,
    calls: AtomicUsize,
}

impl FakeKeygen {
    fn new() -> Arc<Self> {
        let mut licenses = HashMap::new();
        licenses.insert(
            "VALID-123",
            r#"{"meta":{"valid":true,"code":"VALID","detail":"is valid"},"data":{"id":"lic_1","type":"licenses","attributes":{"key":"VALID-123"}}}"#,
        );
        licenses.insert(
            "BAD-000",
            r#"{"meta":{"valid":false,"code":"EXPIRED","detail":"expired"},"data":{"id":"lic_2","type":"licenses","attributes":{"key":"BAD-000"}}}"#,
        );
        Arc::new(Self {
            licenses,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ValidationTransport for FakeKeygen {
    fn validate_key(&self, license_key: &str) -> Result<KeygenResponse, KeywardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let (status, body) = match self.licenses.get(license_key) {
            Some(body) => (200, body.to_string()),
            None => (
                422,
                r#"{"errors":[{"title":"Unprocessable resource","detail":"does not exist"}]}"#
                    .to_string(),
            ),
        };

        let path = format!("/v1/accounts/{}/licenses/actions/validate-key", ACCOUNT);
        let date = "Wed, 15 Jan 2025 12:00:00 GMT";
        let message = signing_string(&request_target("post", &path), HOST, date, body.as_bytes());
        let signature = STANDARD.encode(SigningKey::from_bytes(&SEED).sign(message.as_bytes()).to_bytes());

        Ok(KeygenResponse {
            status,
            date: Some(date.to_string()),
            signature: Some(format!(
                r#"keyid="{}", algorithm="ed25519", signature="{}", headers="(request-target) host date digest""#,
                ACCOUNT, signature
            )),
            digest: Some(body_digest(body.as_bytes())),
            body: body.into_bytes(),
            request_path: path,
        })
    }
}

struct World {
    manager: LicenseManager,
    service: Arc<FakeKeygen>,
    clock: Arc<MockClock>,
    dir: TempDir,
}

fn world() -> World {
    let dir = TempDir::new().unwrap();
    let service = FakeKeygen::new();
    let clock = Arc::new(MockClock::new(Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()));
    let config = KeywardConfig::new(ACCOUNT, PUBLIC_KEY_DER_B64).with_cache_dir(dir.path());
    let cache = FileCache::with_path(dir.path().to_path_buf()).unwrap();

    let manager =
        LicenseManager::from_parts(config, service.clone(), cache, clock.clone()).unwrap();

    World {
        manager,
        service,
        clock,
        dir,
    }
}

fn expected_location(key: &str, now: DateTime<Utc>) -> String {
    let day = now.timestamp().div_euclid(86_400);
    hex::encode(Sha256::digest(format!("{}:{}", day, key).as_bytes()))
}

fn cache_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path())
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .path()
                .extension()
                .is_some_and(|ext| ext == "json")
        })
        .count()
}

#[test]
fn valid_key_is_fetched_once_then_served_from_cache() {
    let w = world();
    let key = LicenseKey::new("VALID-123");

    let first = w.manager.validate_key(&key).unwrap();
    assert!(first.valid);
    assert_eq!(first.license_id.as_deref(), Some("lic_1"));
    assert!(!first.from_cache);

    let location = w.manager.cache_location(&key);
    assert_eq!(
        location.as_str(),
        expected_location("VALID-123", w.clock.now_utc())
    );
    assert!(w.manager.cache().entry_path(&location).exists());

    let second = w.manager.validate_key(&key).unwrap();
    assert!(second.from_cache);
    assert_eq!(second.license_id, first.license_id);
    assert_eq!(second.valid, first.valid);
    assert_eq!(w.service.calls(), 1);
}

#[test]
fn invalid_key_is_reported_and_never_cached() {
    let w = world();
    let key = LicenseKey::new("BAD-000");

    let outcome = w.manager.validate_key(&key).unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.detail.as_deref(), Some("expired"));
    assert_eq!(outcome.license_id, None);
    assert_eq!(cache_files(&w.dir), 0);

    w.manager.validate_key(&key).unwrap();
    assert_eq!(w.service.calls(), 2);
}

#[test]
fn cache_expires_at_the_day_boundary() {
    let w = world();
    let key = LicenseKey::new("VALID-123");

    w.manager.validate_key(&key).unwrap();
    w.clock.advance(Duration::hours(11) + Duration::minutes(59));
    assert!(w.manager.validate_key(&key).unwrap().from_cache);

    w.clock.advance(Duration::minutes(1));
    let next_day = w.manager.validate_key(&key).unwrap();
    assert!(!next_day.from_cache);
    assert_eq!(w.service.calls(), 2);
    assert_eq!(cache_files(&w.dir), 2);
}

#[test]
fn edited_cache_file_is_detected_and_removed() {
    let w = world();
    let key = LicenseKey::new("VALID-123");
    w.manager.validate_key(&key).unwrap();

    let path = w.manager.cache().entry_path(&w.manager.cache_location(&key));
    let mut entry = CacheEntry::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let mut body = entry.body_bytes().unwrap();
    let last = body.len() - 2;
    body[last] = b' ';
    entry.body = STANDARD.encode(&body);
    std::fs::write(&path, entry.to_json().unwrap()).unwrap();

    let verdict = Verdict::from(w.manager.validate_key(&key));
    assert!(matches!(verdict, Verdict::Fatal(KeywardError::TamperedCache)));
    assert!(verdict.is_tampering());
    assert_eq!(verdict.exit_code(), 2);
    assert!(!path.exists());
}

#[test]
fn garbage_cache_file_is_a_miss() {
    let w = world();
    let key = LicenseKey::new("VALID-123");
    let path = w.manager.cache().entry_path(&w.manager.cache_location(&key));
    std::fs::write(&path, "definitely not an envelope").unwrap();

    let outcome = w.manager.validate_key(&key).unwrap();
    assert!(outcome.valid);
    assert!(!outcome.from_cache);
    assert_eq!(w.service.calls(), 1);
}

#[test]
fn unknown_key_surfaces_remote_errors() {
    let w = world();
    let verdict = Verdict::from(w.manager.validate_key(&LicenseKey::new("NOPE")));

    match &verdict {
        Verdict::Fatal(KeywardError::RemoteValidation { errors }) => {
            assert_eq!(errors[0].title, "Unprocessable resource");
        }
        other => panic!("expected remote validation error, got {:?}", other),
    }
    assert_eq!(verdict.exit_code(), 2);
    assert_eq!(cache_files(&w.dir), 0);
}

#[test]
fn verdicts_map_to_exit_codes() {
    let w = world();
    assert_eq!(
        Verdict::from(w.manager.validate_key(&LicenseKey::new("VALID-123"))).exit_code(),
        0
    );
    assert_eq!(
        Verdict::from(w.manager.validate_key(&LicenseKey::new("BAD-000"))).exit_code(),
        1
    );
    assert_eq!(
        Verdict::from(w.manager.validate_key(&LicenseKey::new(""))).exit_code(),
        2
    );
}
