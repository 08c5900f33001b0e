// src/error.rs
use std::{fmt, io, path::PathBuf, time::Duration};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end an issuance run.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad command line input or an ambient kubeconfig that does not resolve.
    #[error("invalid input: {0}")]
    Input(String),

    /// Key generation failed.
    #[error("key generation failed: {0}")]
    Crypto(String),

    /// Subject encoding or request signing failed.
    #[error("certificate request encoding failed: {0}")]
    Encoding(String),

    /// The cluster rejected a call on the signing request.
    #[error("cluster API rejected {operation}: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    /// A signing request with this name is already in flight.
    #[error("signing request {0} already exists")]
    Conflict(String),

    /// The signer did not populate a certificate in time.
    #[error("no certificate issued for {name} within {waited:?}")]
    IssuanceTimeout { name: String, waited: Duration },

    /// The issued certificate is not a readable PEM certificate.
    #[error("could not decode issued certificate: {0}")]
    Decode(String),

    #[error("could not write {}: {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("interrupted while waiting for the certificate")]
    Interrupted,
}

impl Error {
    pub fn api(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Api {
            operation,
            message: message.into(),
        }
    }

    pub fn file_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error. Usage errors exit with 2 from clap itself.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Pipeline stage, named in the one-line failure diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    ClusterResolution,
    Connect,
    KeyGeneration,
    RequestEncoding,
    Submit,
    Approve,
    AwaitIssuance,
    Decode,
    Assemble,
    WriteOutput,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::ClusterResolution => "cluster resolution",
            Stage::Connect => "cluster connection",
            Stage::KeyGeneration => "key generation",
            Stage::RequestEncoding => "request encoding",
            Stage::Submit => "signing request submission",
            Stage::Approve => "signing request approval",
            Stage::AwaitIssuance => "waiting for issuance",
            Stage::Decode => "certificate decoding",
            Stage::Assemble => "kubeconfig assembly",
            Stage::WriteOutput => "output write",
        };
        f.write_str(name)
    }
}

/// A terminal error together with the stage it came from.
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct Failure {
    pub stage: Stage,
    #[source]
    pub error: Error,
}

impl Failure {
    pub fn exit_code(&self) -> u8 {
        self.error.exit_code()
    }
}

/// Tags a stage's error with the stage name.
pub trait StageExt<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, Failure>;
}

impl<T> StageExt<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, Failure> {
        self.map_err(|error| Failure { stage, error })
    }
}
