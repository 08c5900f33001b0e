// src/issuance/client.rs
use chrono::Utc;
use k8s_openapi::{
    api::certificates::v1::{
        CertificateSigningRequest, CertificateSigningRequestCondition,
        CertificateSigningRequestSpec,
    },
    apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time},
    ByteString,
};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use super::{api::SigningRequestApi, APPROVAL_MESSAGE, APPROVAL_REASON, APPROVED_CONDITION};
use crate::cert::CertificateRequest;
use crate::error::{Error, Result};

const MAX_NAME_PREFIX: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceState {
    Created,
    Submitted,
    Approved,
    Issued,
    TimedOut,
    Deleted,
}

/// What to put in the signing request besides the request bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningRequestSpec {
    pub name: String,
    pub groups: Vec<String>,
    pub signer_name: String,
    pub usages: Vec<String>,
    /// `None` leaves the lifetime to the signer.
    pub expiration_seconds: Option<i32>,
}

/// Unique resource name for one invocation: the username folded into DNS-1123
/// subdomain characters plus a random 8 hex suffix.
pub fn resource_name(username: &str) -> String {
    let folded: String = username
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let mut prefix = folded
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string();
    prefix.truncate(MAX_NAME_PREFIX);
    let prefix = prefix.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
    let prefix = if prefix.is_empty() { "user" } else { prefix };

    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..8])
}

fn has_condition(csr: &CertificateSigningRequest, type_: &str) -> bool {
    csr.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == type_ && c.status == "True")
        })
        .unwrap_or(false)
}

fn issued_certificate(csr: &CertificateSigningRequest) -> Option<&[u8]> {
    csr.status
        .as_ref()
        .and_then(|s| s.certificate.as_ref())
        .map(|c| c.0.as_slice())
        .filter(|c| !c.is_empty())
}

/// Drives one signing request through its lifecycle on the cluster.
pub struct IssuanceClient<A> {
    api: A,
    state: IssuanceState,
}

impl<A: SigningRequestApi> IssuanceClient<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: IssuanceState::Created,
        }
    }

    pub fn state(&self) -> IssuanceState {
        self.state
    }

    fn transition(&mut self, name: &str, next: IssuanceState) {
        debug!(name, from = ?self.state, to = ?next, "Signing request state change");
        self.state = next;
    }

    pub async fn submit(
        &mut self,
        request: &CertificateRequest,
        spec: &SigningRequestSpec,
    ) -> Result<CertificateSigningRequest> {
        let csr = CertificateSigningRequest {
            metadata: ObjectMeta {
                name: Some(spec.name.clone()),
                ..Default::default()
            },
            spec: CertificateSigningRequestSpec {
                groups: Some(spec.groups.clone()),
                signer_name: spec.signer_name.clone(),
                usages: Some(spec.usages.clone()),
                request: ByteString(request.to_pem()),
                expiration_seconds: spec.expiration_seconds,
                ..Default::default()
            },
            status: None,
        };

        info!(name = %spec.name, signer = %spec.signer_name, "Submitting certificate signing request");
        let created = self.api.create(&csr).await?;
        self.transition(&spec.name, IssuanceState::Submitted);
        Ok(created)
    }

    /// Appends one `Approved` condition and sends it through the approval subresource.
    /// A request that already carries one is returned unchanged.
    pub async fn approve(
        &mut self,
        mut csr: CertificateSigningRequest,
    ) -> Result<CertificateSigningRequest> {
        let name = csr.metadata.name.clone().unwrap_or_default();
        if has_condition(&csr, APPROVED_CONDITION) {
            debug!(name = %name, "Signing request already approved");
            self.transition(&name, IssuanceState::Approved);
            return Ok(csr);
        }

        let now = Time(Utc::now());
        csr.status
            .get_or_insert_with(Default::default)
            .conditions
            .get_or_insert_with(Vec::new)
            .push(CertificateSigningRequestCondition {
                type_: APPROVED_CONDITION.to_string(),
                status: "True".to_string(),
                reason: Some(APPROVAL_REASON.to_string()),
                message: Some(APPROVAL_MESSAGE.to_string()),
                last_update_time: Some(now),
                last_transition_time: None,
            });

        info!(name = %name, "Approving certificate signing request");
        let approved = self.api.update_approval(&csr).await?;
        self.transition(&name, IssuanceState::Approved);
        Ok(approved)
    }

    /// Polls until the signer attaches a certificate or `deadline` elapses. A poll
    /// still in flight at the deadline is abandoned. Dropping the returned future
    /// stops polling.
    pub async fn await_issuance(
        &mut self,
        name: &str,
        poll_interval: Duration,
        deadline: Duration,
    ) -> Result<CertificateSigningRequest> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let remaining = deadline.saturating_sub(started.elapsed());
            let csr = match timeout(remaining, self.api.get(name)).await {
                Ok(csr) => csr?,
                Err(_) => return Err(self.timed_out(name, started.elapsed())),
            };
            debug!(name, attempt, "Polled signing request");

            if issued_certificate(&csr).is_some() {
                info!(name, attempt, "Certificate issued");
                self.transition(name, IssuanceState::Issued);
                return Ok(csr);
            }
            if has_condition(&csr, "Denied") {
                return Err(Error::api("issuance", format!("signing request {} was denied", name)));
            }
            if has_condition(&csr, "Failed") {
                return Err(Error::api("issuance", format!("signer failed to issue {}", name)));
            }

            let elapsed = started.elapsed();
            if elapsed >= deadline {
                return Err(self.timed_out(name, elapsed));
            }
            sleep(poll_interval.min(deadline - elapsed)).await;
        }
    }

    fn timed_out(&mut self, name: &str, waited: Duration) -> Error {
        self.transition(name, IssuanceState::TimedOut);
        Error::IssuanceTimeout {
            name: name.to_string(),
            waited,
        }
    }

    /// Best-effort removal. The caller decides what a failure here means.
    pub async fn delete(&mut self, name: &str) -> Result<()> {
        info!(name, "Deleting certificate signing request");
        self.api.delete(name).await?;
        self.transition(name, IssuanceState::Deleted);
        Ok(())
    }
}
