// src/cert/reader.rs
use chrono::{TimeZone, Utc};
use openssl::hash::{hash, MessageDigest};
use x509_parser::{pem::parse_x509_pem, x509::X509Name};

use super::types::IssuedCertificate;
use crate::error::{Error, Result};

/// Printed in place of an absent organization.
pub const NO_ORGANIZATION: &str = "none";

fn first_common_name(name: &X509Name<'_>) -> String {
    name.iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Decodes the PEM certificate the signer attached to the signing request.
pub fn decode(pem_bytes: &[u8]) -> Result<IssuedCertificate> {
    let (_, pem) = parse_x509_pem(pem_bytes)
        .map_err(|e| Error::Decode(format!("not a PEM block: {}", e)))?;
    if pem.label != "CERTIFICATE" {
        return Err(Error::Decode(format!(
            "expected a CERTIFICATE PEM block, found {}",
            pem.label
        )));
    }

    let cert = pem
        .parse_x509()
        .map_err(|e| Error::Decode(format!("invalid X.509 certificate: {}", e)))?;

    let organization = cert
        .subject()
        .iter_organization()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .filter(|org| !org.is_empty())
        .unwrap_or(NO_ORGANIZATION)
        .to_string();

    let not_after = Utc
        .timestamp_opt(cert.validity().not_after.timestamp(), 0)
        .single()
        .ok_or_else(|| Error::Decode("invalid not_after timestamp".to_string()))?;

    let fingerprint = hash(MessageDigest::sha256(), &pem.contents)
        .map_err(|e| Error::Decode(format!("failed to fingerprint certificate: {}", e)))?;

    Ok(IssuedCertificate {
        common_name: first_common_name(cert.subject()),
        organization,
        issuer_common_name: first_common_name(cert.issuer()),
        not_after,
        fingerprint: hex::encode(fingerprint),
        raw: pem_bytes.to_vec(),
    })
}
