mod issue;

pub use issue::{issue_credential, IssueOptions, Issued};

use issue::ensure_running;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Args;
use crate::error::{Error, Failure, Stage, StageExt};
use crate::issuance::{IssuanceClient, KubeSigningRequests};
use crate::kubeconfig::AmbientProfile;

/// Resolves configuration and the target cluster, then issues one credential.
pub async fn run(args: &Args, shutdown: &CancellationToken) -> Result<Issued, Failure> {
    args.validate().at(Stage::Configuration)?;
    let settings = args.settings().at(Stage::Configuration)?;
    let expiration_seconds = args.expiration().at(Stage::Configuration)?;
    let kubeconfig = args.kubeconfig_path().at(Stage::Configuration)?;

    info!(kubeconfig = %kubeconfig.display(), username = %args.username, "Issuing client certificate");

    ensure_running(shutdown, Stage::ClusterResolution)?;
    let cluster = AmbientProfile::load(&kubeconfig)
        .and_then(|profile| profile.resolve(args.context.as_deref()))
        .at(Stage::ClusterResolution)?;

    let api = tokio::select! {
        result = KubeSigningRequests::connect(&kubeconfig, args.context.as_deref()) => result,
        _ = shutdown.cancelled() => Err(Error::Interrupted),
    }
    .at(Stage::Connect)?;
    let mut client = IssuanceClient::new(api);

    let options = IssueOptions {
        username: args.username.clone(),
        group: args.group.clone(),
        output_file: args.output_path(),
        expiration_seconds,
        settings,
    };
    issue_credential(&mut client, &cluster, &options, shutdown).await
}
