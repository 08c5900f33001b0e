// src/cert/mod.rs
pub mod keys;
pub mod reader;
pub mod request;
mod types;

pub use keys::{generate, DEFAULT_KEY_BITS};
pub use reader::{decode, NO_ORGANIZATION};
pub use request::build;
pub use types::{CertificateRequest, IssuedCertificate, KeyAlgorithm, KeyPair, SignatureAlgorithm};
