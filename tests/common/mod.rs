//! In-memory signing request API backed by a throwaway OpenSSL CA.
#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::{
    api::certificates::v1::{CertificateSigningRequest, CertificateSigningRequestStatus},
    ByteString,
};
use kube_user_csr::{
    error::{Error, Result},
    issuance::SigningRequestApi,
};
use openssl::{
    asn1::Asn1Time,
    bn::BigNum,
    hash::MessageDigest,
    nid::Nid,
    pkey::{PKey, Private},
    rsa::Rsa,
    x509::{X509Builder, X509NameBuilder, X509Req, X509},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio_util::sync::CancellationToken;

pub struct TestCa {
    pub key: PKey<Private>,
    pub cert: X509,
}

impl TestCa {
    pub fn new(common_name: &str) -> Self {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, common_name).unwrap();
        let name = name.build();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
        builder.set_not_after(&Asn1Time::days_from_now(365).unwrap()).unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();
        let cert = builder.build();

        Self { key, cert }
    }

    /// Issues a certificate for the subject and key in a PEM request.
    pub fn sign(&self, request_pem: &[u8]) -> Vec<u8> {
        let req = X509Req::from_pem(request_pem).unwrap();
        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(2).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(req.subject_name()).unwrap();
        builder.set_issuer_name(self.cert.subject_name()).unwrap();
        builder.set_pubkey(&req.public_key().unwrap()).unwrap();
        builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
        builder.set_not_after(&Asn1Time::days_from_now(1).unwrap()).unwrap();
        builder.sign(&self.key, MessageDigest::sha256()).unwrap();
        builder.build().to_pem().unwrap()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignerBehavior {
    /// Attach the certificate on this get (1-based) after approval.
    IssueOnPoll(u32),
    Never,
    /// Attach bytes that are not a certificate.
    Garbage,
}

#[derive(Default)]
pub struct ClusterState {
    pub stored: HashMap<String, CertificateSigningRequest>,
    pub created: Vec<String>,
    pub approvals: u32,
    pub gets: u32,
    pub deletes: Vec<String>,
    pub issued_pem: Option<Vec<u8>>,
}

#[derive(Clone)]
pub struct FakeCluster {
    pub state: Arc<Mutex<ClusterState>>,
    ca: Arc<TestCa>,
    behavior: SignerBehavior,
    reject_approval: bool,
    fail_delete: bool,
    cancel_on_create: Option<CancellationToken>,
}

impl FakeCluster {
    pub fn new(behavior: SignerBehavior) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClusterState::default())),
            ca: Arc::new(TestCa::new("kubernetes")),
            behavior,
            reject_approval: false,
            fail_delete: false,
            cancel_on_create: None,
        }
    }

    pub fn rejecting_approval(mut self) -> Self {
        self.reject_approval = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Cancels `token` while the create call is in flight, as a Ctrl-C would.
    pub fn cancelling_on_create(mut self, token: CancellationToken) -> Self {
        self.cancel_on_create = Some(token);
        self
    }

    /// Pretends another run already holds `name`.
    pub fn occupy(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .stored
            .insert(name.to_string(), CertificateSigningRequest::default());
    }

    pub fn ca(&self) -> &TestCa {
        &self.ca
    }
}

#[async_trait]
impl SigningRequestApi for FakeCluster {
    async fn create(&self, csr: &CertificateSigningRequest) -> Result<CertificateSigningRequest> {
        let name = csr.metadata.name.clone().unwrap_or_default();
        let mut state = self.state.lock().unwrap();
        if state.stored.contains_key(&name) {
            return Err(Error::Conflict(name));
        }
        state.created.push(name.clone());
        state.stored.insert(name, csr.clone());
        if let Some(token) = &self.cancel_on_create {
            token.cancel();
        }
        Ok(csr.clone())
    }

    async fn update_approval(
        &self,
        csr: &CertificateSigningRequest,
    ) -> Result<CertificateSigningRequest> {
        if self.reject_approval {
            return Err(Error::api("approve", "forbidden: cannot approve signer"));
        }
        let name = csr.metadata.name.clone().unwrap_or_default();
        let mut state = self.state.lock().unwrap();
        let stored = state
            .stored
            .get_mut(&name)
            .ok_or_else(|| Error::api("approve", "not found"))?;
        stored.status = csr.status.clone();
        let updated = stored.clone();
        state.approvals += 1;
        Ok(updated)
    }

    async fn get(&self, name: &str) -> Result<CertificateSigningRequest> {
        let mut state = self.state.lock().unwrap();
        state.gets += 1;
        let gets = state.gets;
        let approved = state.approvals > 0;

        let mut csr = state
            .stored
            .get(name)
            .cloned()
            .ok_or_else(|| Error::api("get", "not found"))?;

        let certificate = match self.behavior {
            SignerBehavior::IssueOnPoll(n) if approved && gets >= n => Some(self.ca.sign(&csr.spec.request.0)),
            SignerBehavior::Garbage if approved => Some(b"not a certificate".to_vec()),
            _ => None,
        };
        if let Some(pem) = certificate {
            state.issued_pem = Some(pem.clone());
            csr.status
                .get_or_insert_with(CertificateSigningRequestStatus::default)
                .certificate = Some(ByteString(pem));
            state.stored.insert(name.to_string(), csr.clone());
        }
        Ok(csr)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.deletes.push(name.to_string());
        if self.fail_delete {
            return Err(Error::api("delete", "connection reset"));
        }
        state.stored.remove(name);
        Ok(())
    }
}
