// config/types.rs
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::cert::DEFAULT_KEY_BITS;
use crate::error::{Error, Result};
use crate::issuance::{DEFAULT_GROUP, DEFAULT_SIGNER_NAME, DEFAULT_USAGE};

/// Tunables for one issuance run. Loadable from a JSON file; every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuanceSettings {
    pub key_bits: u32,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
    pub signer_name: String,
    pub groups: Vec<String>,
    pub usages: Vec<String>,
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
            poll_interval_ms: 500,
            timeout_secs: 60,
            signer_name: DEFAULT_SIGNER_NAME.to_string(),
            groups: vec![DEFAULT_GROUP.to_string()],
            usages: vec![DEFAULT_USAGE.to_string()],
        }
    }
}

impl IssuanceSettings {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .map_err(|e| Error::Input(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&config_str)
            .map_err(|e| Error::Input(format!("invalid settings in {}: {}", path.display(), e)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Input("poll interval must be greater than zero".into()));
        }
        if self.timeout() < self.poll_interval() {
            return Err(Error::Input(format!(
                "timeout {}s is shorter than the poll interval {}ms",
                self.timeout_secs, self.poll_interval_ms
            )));
        }
        if self.signer_name.trim().is_empty() {
            return Err(Error::Input("signer name must not be empty".into()));
        }
        if self.usages.is_empty() {
            return Err(Error::Input("at least one key usage is required".into()));
        }
        Ok(())
    }
}
