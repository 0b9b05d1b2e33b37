//! Interactive license validation.
//!
//! # Running
//!
//! ```bash
//! export KEYGEN_ACCOUNT_ID="your-account-id"
//! export KEYGEN_PUBLIC_KEY="MCowBQYDK2VwAyEA..."   # base64 DER (SPKI) Ed25519 key
//! cargo run --example validate_key
//! ```
//!
//! Set `LICENSE_KEY` to skip the prompt, and `RUST_LOG=keyward=debug` to
//! see cache hits and misses.

use keyward::{
    EnvKeyProvider, KeyProvider, KeywardConfig, KeywardError, LicenseKey, LicenseManager, Verdict,
};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

/// Reads the key from stdin, dropping only the line terminator.
struct PromptKeyProvider;

impl KeyProvider for PromptKeyProvider {
    fn license_key(&self) -> Result<LicenseKey, KeywardError> {
        print!("Enter your license key: ");
        io::stdout().flush().map_err(|_| KeywardError::MissingLicense)?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|_| KeywardError::MissingLicense)?;
        Ok(LicenseKey::new(line.trim_end_matches(['\r', '\n'])))
    }
}

fn run() -> Verdict {
    let config = match KeywardConfig::from_env() {
        Ok(config) => config,
        Err(e) => return Verdict::Fatal(e),
    };

    let manager = match LicenseManager::new(config) {
        Ok(manager) => manager,
        Err(e) => return Verdict::Fatal(e),
    };

    let result = match EnvKeyProvider::default().license_key() {
        Ok(key) => manager.validate_key(&key),
        Err(_) => manager.validate_with(&PromptKeyProvider),
    };
    Verdict::from(result)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let verdict = run();
    match &verdict {
        Verdict::Valid { .. } => println!("✓ {}", verdict),
        Verdict::Invalid { .. } => println!("✗ {}", verdict),
        Verdict::Fatal(_) if verdict.is_tampering() => eprintln!("SECURITY: {}", verdict),
        Verdict::Fatal(_) => eprintln!("{}", verdict),
    }

    std::process::exit(verdict.exit_code());
}
