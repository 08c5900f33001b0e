// src/kubeconfig/ambient.rs
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// The parts of the caller's existing kubeconfig needed to describe the cluster.
#[derive(Debug, Deserialize)]
pub struct AmbientProfile {
    #[serde(default)]
    pub clusters: Vec<ClusterEntry>,
    #[serde(default)]
    pub contexts: Vec<ContextEntry>,
    #[serde(rename = "current-context", default)]
    pub current_context: Option<String>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct ClusterEntry {
    pub name: String,
    pub cluster: ClusterDetails,
}

#[derive(Debug, Deserialize)]
pub struct ClusterDetails {
    pub server: String,
    #[serde(rename = "certificate-authority-data")]
    pub certificate_authority_data: Option<String>,
    #[serde(rename = "certificate-authority")]
    pub certificate_authority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContextEntry {
    pub name: String,
    pub context: ContextDetails,
}

#[derive(Debug, Deserialize)]
pub struct ContextDetails {
    pub cluster: String,
    pub user: Option<String>,
}

/// Cluster connection metadata copied into the new kubeconfig.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConnectionInfo {
    pub cluster_name: String,
    pub server: String,
    /// Raw CA bytes (PEM), not base64.
    pub certificate_authority: Vec<u8>,
}

impl AmbientProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Input(format!("cannot read kubeconfig {}: {}", path.display(), e)))?;
        let mut profile = Self::parse(&content)?;
        profile.base_dir = path.parent().map(Path::to_path_buf);
        Ok(profile)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Input(format!("invalid kubeconfig: {}", e)))
    }

    /// Follows `context` (or `current-context`) to its cluster entry.
    pub fn resolve(&self, context: Option<&str>) -> Result<ClusterConnectionInfo> {
        let context_name = context
            .or(self.current_context.as_deref())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Input("kubeconfig has no current context".to_string()))?;

        let context = self
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .ok_or_else(|| Error::Input(format!("context {} not found in kubeconfig", context_name)))?;
        let cluster_name = &context.context.cluster;

        let entry = self
            .clusters
            .iter()
            .find(|c| &c.name == cluster_name)
            .ok_or_else(|| {
                Error::Input(format!(
                    "context {} refers to unknown cluster {}",
                    context_name, cluster_name
                ))
            })?;

        Url::parse(&entry.cluster.server).map_err(|e| {
            Error::Input(format!(
                "cluster {} has invalid server {:?}: {}",
                cluster_name, entry.cluster.server, e
            ))
        })?;

        debug!(context = context_name, cluster = %cluster_name, "Resolved cluster from kubeconfig");
        Ok(ClusterConnectionInfo {
            cluster_name: cluster_name.clone(),
            server: entry.cluster.server.clone(),
            certificate_authority: self.certificate_authority(entry)?,
        })
    }

    fn certificate_authority(&self, entry: &ClusterEntry) -> Result<Vec<u8>> {
        if let Some(data) = entry.cluster.certificate_authority_data.as_deref() {
            let compact: String = data.split_whitespace().collect();
            return general_purpose::STANDARD.decode(compact).map_err(|e| {
                Error::Input(format!(
                    "cluster {} has invalid certificate-authority-data: {}",
                    entry.name, e
                ))
            });
        }

        if let Some(file) = entry.cluster.certificate_authority.as_deref() {
            let expanded = PathBuf::from(shellexpand::tilde(file).to_string());
            let path = match &self.base_dir {
                Some(dir) if expanded.is_relative() => dir.join(expanded),
                _ => expanded,
            };
            return fs::read(&path).map_err(|e| {
                Error::Input(format!(
                    "cannot read certificate authority {}: {}",
                    path.display(),
                    e
                ))
            });
        }

        // insecure-skip-tls-verify clusters carry no CA
        Ok(Vec::new())
    }
}
