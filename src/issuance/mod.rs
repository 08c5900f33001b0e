// src/issuance/mod.rs
mod api;
mod client;

pub use api::{KubeSigningRequests, SigningRequestApi};
pub use client::{resource_name, IssuanceClient, IssuanceState, SigningRequestSpec};

pub const DEFAULT_SIGNER_NAME: &str = "kubernetes.io/kube-apiserver-client";
pub const DEFAULT_GROUP: &str = "system:authenticated";
pub const DEFAULT_USAGE: &str = "client auth";

pub const APPROVED_CONDITION: &str = "Approved";
pub const APPROVAL_REASON: &str = "User activation";
pub const APPROVAL_MESSAGE: &str = "This CSR was approved";
