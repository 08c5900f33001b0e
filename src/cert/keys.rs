// src/cert/keys.rs
use openssl::{pkey::PKey, rsa::Rsa};
use tracing::debug;

use super::types::{KeyAlgorithm, KeyPair};
use crate::error::{Error, Result};

pub const DEFAULT_KEY_BITS: u32 = 2048;
const MIN_KEY_BITS: u32 = 2048;
const MAX_KEY_BITS: u32 = 8192;

/// Generates an RSA key pair from OpenSSL's CSPRNG. Failures are not retried.
pub fn generate(bits: u32) -> Result<KeyPair> {
    if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) || bits % 8 != 0 {
        return Err(Error::Crypto(format!(
            "unsupported RSA key size {} (expected a multiple of 8 between {} and {})",
            bits, MIN_KEY_BITS, MAX_KEY_BITS
        )));
    }

    debug!(bits, "Generating RSA private key");
    let rsa = Rsa::generate(bits)
        .map_err(|e| Error::Crypto(format!("failed to generate RSA key: {}", e)))?;
    let key = PKey::from_rsa(rsa)
        .map_err(|e| Error::Crypto(format!("failed to wrap RSA key: {}", e)))?;

    Ok(KeyPair {
        algorithm: KeyAlgorithm::Rsa,
        bits,
        key,
    })
}
