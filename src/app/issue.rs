// src/app/issue.rs
use k8s_openapi::api::certificates::v1::CertificateSigningRequest;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cert::{self, IssuedCertificate, KeyPair};
use crate::config::IssuanceSettings;
use crate::error::{Error, Failure, Stage, StageExt};
use crate::issuance::{resource_name, IssuanceClient, SigningRequestApi, SigningRequestSpec};
use crate::kubeconfig::{assemble, write_profile, ClusterConnectionInfo};

/// Inputs for one credential.
#[derive(Debug, Clone)]
pub struct IssueOptions {
    pub username: String,
    pub group: String,
    pub output_file: PathBuf,
    pub expiration_seconds: Option<i32>,
    pub settings: IssuanceSettings,
}

#[derive(Debug)]
pub struct Issued {
    pub resource_name: String,
    pub certificate: IssuedCertificate,
    pub output_file: PathBuf,
}

/// Fails with `Interrupted` at `stage` once shutdown has been requested.
pub(super) fn ensure_running(shutdown: &CancellationToken, stage: Stage) -> Result<(), Failure> {
    if shutdown.is_cancelled() {
        return Err(Failure {
            stage,
            error: Error::Interrupted,
        });
    }
    Ok(())
}

/// Runs key generation through output write. Once the signing request exists on the
/// cluster it is deleted before returning, whatever the outcome; a failed delete is
/// logged and does not change the result. Nothing is created on the cluster after
/// shutdown is requested, and a request submitted meanwhile is deleted unapproved.
pub async fn issue_credential<A: SigningRequestApi>(
    client: &mut IssuanceClient<A>,
    cluster: &ClusterConnectionInfo,
    options: &IssueOptions,
    shutdown: &CancellationToken,
) -> Result<Issued, Failure> {
    let settings = &options.settings;

    let key_pair = cert::generate(settings.key_bits).at(Stage::KeyGeneration)?;
    let request = cert::build(&options.username, &options.group, &key_pair)
        .at(Stage::RequestEncoding)?;

    let spec = SigningRequestSpec {
        name: resource_name(&options.username),
        groups: settings.groups.clone(),
        signer_name: settings.signer_name.clone(),
        usages: settings.usages.clone(),
        expiration_seconds: options.expiration_seconds,
    };
    ensure_running(shutdown, Stage::Submit)?;
    let created = client.submit(&request, &spec).await.at(Stage::Submit)?;

    let outcome = finish_issuance(client, created, &spec.name, cluster, options, &key_pair, shutdown).await;

    if let Err(e) = client.delete(&spec.name).await {
        warn!(name = %spec.name, error = %e, "Failed to delete certificate signing request");
    }
    outcome
}

async fn finish_issuance<A: SigningRequestApi>(
    client: &mut IssuanceClient<A>,
    created: CertificateSigningRequest,
    name: &str,
    cluster: &ClusterConnectionInfo,
    options: &IssueOptions,
    key_pair: &KeyPair,
    shutdown: &CancellationToken,
) -> Result<Issued, Failure> {
    let settings = &options.settings;

    ensure_running(shutdown, Stage::Approve)?;
    client.approve(created).await.at(Stage::Approve)?;

    let issued = tokio::select! {
        result = client.await_issuance(name, settings.poll_interval(), settings.timeout()) => result,
        _ = shutdown.cancelled() => Err(Error::Interrupted),
    }
    .at(Stage::AwaitIssuance)?;

    let pem = issued
        .status
        .and_then(|status| status.certificate)
        .map(|certificate| certificate.0)
        .unwrap_or_default();
    let certificate = cert::decode(&pem).at(Stage::Decode)?;
    debug!(fingerprint = %certificate.fingerprint, "Decoded issued certificate");

    let doc = assemble(cluster, &options.username, &certificate, key_pair).at(Stage::Assemble)?;
    write_profile(&options.output_file, &doc).at(Stage::WriteOutput)?;
    info!(path = %options.output_file.display(), "Wrote kubeconfig");

    Ok(Issued {
        resource_name: name.to_string(),
        certificate,
        output_file: options.output_file.clone(),
    })
}
