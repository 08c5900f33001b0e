// src/issuance/api.rs
use async_trait::async_trait;
use k8s_openapi::api::certificates::v1::CertificateSigningRequest;
use kube::{
    api::{Api, DeleteParams, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// The calls made against `certificates.k8s.io/v1` signing requests.
#[async_trait]
pub trait SigningRequestApi: Send + Sync {
    async fn create(&self, csr: &CertificateSigningRequest) -> Result<CertificateSigningRequest>;

    /// Replaces the `approval` subresource with the conditions on `csr`.
    async fn update_approval(&self, csr: &CertificateSigningRequest)
        -> Result<CertificateSigningRequest>;

    async fn get(&self, name: &str) -> Result<CertificateSigningRequest>;

    /// Removes the resource. A resource that is already gone is not an error.
    async fn delete(&self, name: &str) -> Result<()>;
}

fn status_code(err: &kube::Error) -> Option<u16> {
    match err {
        kube::Error::Api(response) => Some(response.code),
        _ => None,
    }
}

/// Signing requests reached through a kube client built from a kubeconfig file.
pub struct KubeSigningRequests {
    api: Api<CertificateSigningRequest>,
}

impl KubeSigningRequests {
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }

    /// Connects with the credentials of `context` (or the current context) in `kubeconfig`.
    pub async fn connect(kubeconfig: &Path, context: Option<&str>) -> Result<Self> {
        debug!(path = %kubeconfig.display(), context, "Loading kubeconfig for API client");
        let config_file = Kubeconfig::read_from(kubeconfig).map_err(|e| {
            Error::Input(format!("cannot read kubeconfig {}: {}", kubeconfig.display(), e))
        })?;
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..Default::default()
        };
        let config = Config::from_custom_kubeconfig(config_file, &options)
            .await
            .map_err(|e| Error::Input(format!("invalid kubeconfig: {}", e)))?;
        let client = Client::try_from(config).map_err(|e| Error::api("connect", e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl SigningRequestApi for KubeSigningRequests {
    async fn create(&self, csr: &CertificateSigningRequest) -> Result<CertificateSigningRequest> {
        self.api
            .create(&PostParams::default(), csr)
            .await
            .map_err(|e| match status_code(&e) {
                Some(409) => Error::Conflict(csr.metadata.name.clone().unwrap_or_default()),
                _ => Error::api("create", e.to_string()),
            })
    }

    async fn update_approval(
        &self,
        csr: &CertificateSigningRequest,
    ) -> Result<CertificateSigningRequest> {
        let name = csr.metadata.name.as_deref().unwrap_or_default();
        let body = serde_json::to_vec(csr).map_err(|e| Error::api("approve", e.to_string()))?;
        self.api
            .replace_subresource("approval", name, &PostParams::default(), body)
            .await
            .map_err(|e| Error::api("approve", e.to_string()))
    }

    async fn get(&self, name: &str) -> Result<CertificateSigningRequest> {
        self.api
            .get(name)
            .await
            .map_err(|e| Error::api("get", e.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        match self.api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(e) if status_code(&e) == Some(404) => Ok(()),
            Err(e) => Err(Error::api("delete", e.to_string())),
        }
    }
}
