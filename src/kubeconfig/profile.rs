// src/kubeconfig/profile.rs
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use super::ambient::ClusterConnectionInfo;
use crate::cert::{IssuedCertificate, KeyPair};
use crate::error::{Error, Result};

/// Kubeconfig holding exactly one cluster, context and user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfileDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub clusters: Vec<NamedCluster>,
    pub contexts: Vec<NamedContext>,
    #[serde(rename = "current-context")]
    pub current_context: String,
    pub kind: String,
    pub preferences: Preferences,
    pub users: Vec<NamedUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub cluster: Cluster,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(rename = "certificate-authority-data")]
    pub certificate_authority_data: String,
    pub server: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub context: Context,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub cluster: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub user: User,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "client-certificate-data")]
    pub client_certificate_data: String,
    #[serde(rename = "client-key-data")]
    pub client_key_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {}

/// Builds the kubeconfig for `common_name`. Pure: no network or file access.
///
/// All `*-data` fields are base64 of raw bytes, encoded exactly once.
pub fn assemble(
    cluster: &ClusterConnectionInfo,
    common_name: &str,
    issued: &IssuedCertificate,
    key_pair: &KeyPair,
) -> Result<ConnectionProfileDocument> {
    if common_name.is_empty() {
        return Err(Error::Input("username is required".to_string()));
    }
    let key_pem = key_pair.private_key_pem()?;

    Ok(ConnectionProfileDocument {
        api_version: "v1".to_string(),
        clusters: vec![NamedCluster {
            cluster: Cluster {
                certificate_authority_data: general_purpose::STANDARD
                    .encode(&cluster.certificate_authority),
                server: cluster.server.clone(),
            },
            name: cluster.cluster_name.clone(),
        }],
        contexts: vec![NamedContext {
            context: Context {
                cluster: cluster.cluster_name.clone(),
                user: common_name.to_string(),
            },
            name: cluster.cluster_name.clone(),
        }],
        current_context: cluster.cluster_name.clone(),
        kind: "Config".to_string(),
        preferences: Preferences::default(),
        users: vec![NamedUser {
            user: User {
                client_certificate_data: general_purpose::STANDARD.encode(&issued.raw),
                client_key_data: general_purpose::STANDARD.encode(key_pem),
            },
            name: common_name.to_string(),
        }],
    })
}
