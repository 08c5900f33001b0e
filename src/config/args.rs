// config/args.rs
use clap::Parser;
use std::path::PathBuf;

use super::IssuanceSettings;
use crate::error::{Error, Result};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Issue a client certificate through the Kubernetes CSR API and write a kubeconfig for it",
    long_about = None
)]
pub struct Args {
    /// Username to generate the certificate for
    #[arg(long)]
    pub username: String,

    /// Group (certificate organization) to assign to the user
    #[arg(long, default_value = "")]
    pub group: String,

    /// Kubeconfig used to reach the cluster [default: ~/.kube/config]
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Context to use instead of the kubeconfig's current context
    #[arg(long)]
    pub context: Option<String>,

    /// File to write the new kubeconfig to [default: <username>.config]
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Requested certificate lifetime in seconds; 0 uses the signer default
    #[arg(long, default_value_t = 0)]
    pub expiration_seconds: u32,

    /// RSA key size
    #[arg(long)]
    pub key_bits: Option<u32>,

    /// Delay between checks for the issued certificate
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// How long to wait for the signer before giving up
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// JSON file with issuance settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    // Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Input("username is required".to_string()));
        }
        Ok(())
    }

    /// `--kubeconfig`, else the first `KUBECONFIG` entry, else `~/.kube/config`.
    pub fn kubeconfig_path(&self) -> Result<PathBuf> {
        let explicit = self
            .kubeconfig
            .as_deref()
            .and_then(|value| value.split(':').find(|entry| !entry.is_empty()));
        match explicit {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).to_string())),
            None => dirs::home_dir()
                .map(|home| home.join(".kube").join("config"))
                .ok_or_else(|| Error::Input("cannot locate home directory for kubeconfig".into())),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.config", self.username)))
    }

    /// Requested lifetime for the CSR; zero means the signer decides.
    pub fn expiration(&self) -> Result<Option<i32>> {
        if self.expiration_seconds == 0 {
            return Ok(None);
        }
        i32::try_from(self.expiration_seconds).map(Some).map_err(|_| {
            Error::Input(format!(
                "expiration-seconds {} is too large",
                self.expiration_seconds
            ))
        })
    }

    /// Settings file (if any) with command line overrides applied.
    pub fn settings(&self) -> Result<IssuanceSettings> {
        let mut settings = match &self.config {
            Some(path) => IssuanceSettings::load_from_file(path)?,
            None => IssuanceSettings::default(),
        };
        if let Some(bits) = self.key_bits {
            settings.key_bits = bits;
        }
        if let Some(ms) = self.poll_interval_ms {
            settings.poll_interval_ms = ms;
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout_secs = secs;
        }
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["kube-user-csr"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_username_is_required() {
        let err = Args::try_parse_from(["kube-user-csr", "--group", "eng"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--username", "alice", "--kubeconfig", "/tmp/kc"]);
        assert_eq!(args.group, "");
        assert_eq!(args.output_path(), PathBuf::from("alice.config"));
        assert_eq!(args.expiration().unwrap(), None);
        assert_eq!(args.kubeconfig_path().unwrap(), PathBuf::from("/tmp/kc"));
        assert_eq!(args.settings().unwrap(), IssuanceSettings::default());
    }

    #[test]
    fn test_kubeconfig_list_uses_first_entry() {
        let args = parse(&["--username", "alice", "--kubeconfig", ":/a/config:/b/config"]);
        assert_eq!(args.kubeconfig_path().unwrap(), PathBuf::from("/a/config"));
    }

    #[test]
    fn test_overrides_apply() {
        let args = parse(&[
            "--username",
            "alice",
            "--expiration-seconds",
            "86400",
            "--timeout-secs",
            "5",
            "--poll-interval-ms",
            "100",
            "--output-file",
            "out/alice.yaml",
        ]);
        assert_eq!(args.expiration().unwrap(), Some(86400));
        let settings = args.settings().unwrap();
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.poll_interval_ms, 100);
        assert_eq!(args.output_path(), PathBuf::from("out/alice.yaml"));
    }

    #[test]
    fn test_oversized_expiration_is_rejected() {
        let args = parse(&["--username", "alice", "--expiration-seconds", "4294967295"]);
        assert!(matches!(args.expiration(), Err(Error::Input(_))));
    }

    #[test]
    fn test_blank_username_is_rejected() {
        let args = parse(&["--username", " "]);
        assert!(args.validate().is_err());
    }
}
