//! # Keygen Subcommand
//!
//! Prints a fresh Ed25519 credential signing key in the form
//! `RLSID_SIGNING_KEY_HEX` expects, together with its verifying key.

use anyhow::Result;
use rand_core::OsRng;
use rlsid_crypto::SigningKey;
use zeroize::Zeroizing;

/// A generated keypair, hex-encoded.
pub struct GeneratedKey {
    pub signing_key_hex: Zeroizing<String>,
    pub verifying_key_hex: String,
}

pub fn generate() -> GeneratedKey {
    let key = SigningKey::generate(&mut OsRng);
    GeneratedKey {
        signing_key_hex: key.to_hex(),
        verifying_key_hex: key.verifying_key().to_hex(),
    }
}

pub fn run_keygen() -> Result<u8> {
    let generated = generate();
    println!("RLSID_SIGNING_KEY_HEX={}", generated.signing_key_hex.as_str());
    println!("verifying_key={}", generated.verifying_key_hex);
    Ok(0)
}
