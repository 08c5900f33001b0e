// src/kubeconfig/writer.rs
use std::{
    fs,
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::debug;

use super::profile::ConnectionProfileDocument;
use crate::error::{Error, Result};

/// Writes `doc` as YAML to `path`, replacing it atomically. The temporary file lives
/// next to the destination and is removed if anything fails before the rename.
pub fn write_profile(path: &Path, doc: &ConnectionProfileDocument) -> Result<()> {
    let yaml = serde_yaml::to_string(doc)
        .map_err(|e| Error::file_io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::file_io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::file_io(dir, e))?;
    debug!(tmp = %tmp.path().display(), "Writing kubeconfig to temporary file");

    tmp.write_all(yaml.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| Error::file_io(tmp.path(), e))?;

    // The file embeds a private key
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))
            .map_err(|e| Error::file_io(tmp.path(), e))?;
    }

    tmp.persist(path).map_err(|e| Error::file_io(path, e.error))?;
    Ok(())
}
