// cert/types.rs
use chrono::{DateTime, Utc};
use openssl::pkey::{PKey, Private};
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Rsa => f.write_str("RSA"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha256WithRsa,
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::Sha256WithRsa => f.write_str("sha256WithRSAEncryption"),
        }
    }
}

/// Signing key owned by one invocation. Only ever leaves the process PEM-encoded
/// inside the generated kubeconfig.
pub struct KeyPair {
    pub(crate) algorithm: KeyAlgorithm,
    pub(crate) bits: u32,
    pub(crate) key: PKey<Private>,
}

impl KeyPair {
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn private_key(&self) -> &PKey<Private> {
        &self.key
    }

    /// PKCS#1 `RSA PRIVATE KEY` PEM block.
    pub fn private_key_pem(&self) -> Result<Vec<u8>> {
        self.key
            .rsa()
            .and_then(|rsa| rsa.private_key_to_pem())
            .map_err(|e| Error::Crypto(format!("failed to encode private key: {}", e)))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm)
            .field("bits", &self.bits)
            .finish_non_exhaustive()
    }
}

/// A signed PKCS#10 request. Immutable once built.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    pub(crate) common_name: String,
    pub(crate) organization: Option<String>,
    pub(crate) der: Vec<u8>,
    pub(crate) pem: Vec<u8>,
    pub(crate) signature_algorithm: SignatureAlgorithm,
}

impl CertificateRequest {
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// `CERTIFICATE REQUEST` PEM block wrapping the DER bytes.
    pub fn to_pem(&self) -> Vec<u8> {
        self.pem.clone()
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }
}

/// Fields read back from the certificate the cluster signer issued.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCertificate {
    pub common_name: String,
    /// `"none"` when the certificate carries no organization.
    pub organization: String,
    pub issuer_common_name: String,
    pub not_after: DateTime<Utc>,
    /// Hex SHA-256 of the DER certificate.
    pub fingerprint: String,
    /// PEM bytes exactly as returned by the cluster.
    pub raw: Vec<u8>,
}

impl IssuedCertificate {
    pub fn summary(&self) -> String {
        format!(
            "Certificate successfully issued to username {} in group {}, signed by {}, valid until {}",
            self.common_name,
            self.organization,
            self.issuer_common_name,
            self.not_after.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
