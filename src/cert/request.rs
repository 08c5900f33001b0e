// src/cert/request.rs
use openssl::{
    hash::MessageDigest,
    nid::Nid,
    x509::{X509Name, X509NameBuilder, X509ReqBuilder},
};
use tracing::debug;

use super::types::{CertificateRequest, KeyPair, SignatureAlgorithm};
use crate::error::{Error, Result};

fn encoding_error(context: &str) -> impl FnOnce(openssl::error::ErrorStack) -> Error + '_ {
    move |e| Error::Encoding(format!("{}: {}", context, e))
}

/// Subject RDN sequence: CN, then O when one was given.
fn subject_name(common_name: &str, organization: Option<&str>) -> Result<X509Name> {
    let mut builder = X509NameBuilder::new().map_err(encoding_error("failed to start subject"))?;
    builder
        .append_entry_by_nid(Nid::COMMONNAME, common_name)
        .map_err(encoding_error("failed to encode common name"))?;
    if let Some(org) = organization {
        builder
            .append_entry_by_nid(Nid::ORGANIZATIONNAME, org)
            .map_err(encoding_error("failed to encode organization"))?;
    }
    Ok(builder.build())
}

/// Builds a PKCS#10 request for `common_name` (and `organization`, when non-empty),
/// signed with SHA-256 by the pair's private key.
pub fn build(common_name: &str, organization: &str, key_pair: &KeyPair) -> Result<CertificateRequest> {
    if common_name.trim().is_empty() {
        return Err(Error::Encoding("common name must not be empty".to_string()));
    }
    let organization = Some(organization).filter(|o| !o.is_empty());

    debug!(common_name, organization = ?organization, "Building certificate request");

    let name = subject_name(common_name, organization)?;
    let key = key_pair.private_key();

    let mut builder = X509ReqBuilder::new().map_err(encoding_error("failed to start request"))?;
    builder
        .set_version(0)
        .map_err(encoding_error("failed to set request version"))?;
    builder
        .set_subject_name(&name)
        .map_err(encoding_error("failed to set subject"))?;
    builder
        .set_pubkey(key)
        .map_err(encoding_error("failed to set public key"))?;
    builder
        .sign(key, MessageDigest::sha256())
        .map_err(encoding_error("failed to sign request"))?;
    let req = builder.build();

    let der = req.to_der().map_err(encoding_error("failed to encode request"))?;
    let pem = req.to_pem().map_err(encoding_error("failed to encode request"))?;

    Ok(CertificateRequest {
        common_name: common_name.to_string(),
        organization: organization.map(str::to_string),
        der,
        pem,
        signature_algorithm: SignatureAlgorithm::Sha256WithRsa,
    })
}
