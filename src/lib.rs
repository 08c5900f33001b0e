//! Issues a Kubernetes client certificate through the `certificates.k8s.io/v1`
//! CSR API and writes a kubeconfig that authenticates with it.

pub mod app;
pub mod cert;
pub mod config;
pub mod error;
pub mod issuance;
pub mod kubeconfig;
pub mod utils;

pub use error::{Error, Failure, Result, Stage};
