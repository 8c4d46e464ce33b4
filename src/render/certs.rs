//! Certificate staging.
//!
//! The certificate directory is reconciled by wiping every `*.crt`/`*.key`
//! file and rewriting what the model holds. There is no atomicity; a failed
//! run is repaired by the next successful one.

use std::fs::{self, OpenOptions, Permissions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Certificate, RouterConfig};

/// File stem used for the platform-wide certificate.
pub const PLATFORM_CONTEXT: &str = "platform";

const CERT_MODE: u32 = 0o644;
const KEY_MODE: u32 = 0o600;

/// Make `ssl_dir` hold exactly the certificates in `config`.
pub fn write_certs(config: &RouterConfig, ssl_dir: &Path) -> Result<()> {
    remove_staged(ssl_dir)?;

    if let Some(certificate) = &config.platform_certificate {
        write_cert(PLATFORM_CONTEXT, certificate, ssl_dir)?;
    }
    Ok(())
}

fn remove_staged(ssl_dir: &Path) -> Result<()> {
    let entries = fs::read_dir(ssl_dir).map_err(|e| Error::io(ssl_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(ssl_dir, e))?;
        let path = entry.path();
        let name = entry.file_name();
        let staged = name
            .to_str()
            .is_some_and(|n| n.ends_with(".crt") || n.ends_with(".key"));
        // file_type does not follow symlinks, so dangling links are removed too
        let is_dir = entry
            .file_type()
            .map_err(|e| Error::io(&path, e))?
            .is_dir();
        if staged && !is_dir {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
            debug!(path = %path.display(), "removed staged certificate file");
        }
    }
    Ok(())
}

fn write_cert(context: &str, certificate: &Certificate, ssl_dir: &Path) -> Result<()> {
    let cert_path = ssl_dir.join(format!("{}.crt", context));
    let key_path = ssl_dir.join(format!("{}.key", context));
    write_file(&cert_path, &certificate.cert, CERT_MODE)?;
    write_file(&key_path, &certificate.key, KEY_MODE)?;
    debug!(context, dir = %ssl_dir.display(), "staged certificate");
    Ok(())
}

fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    // umask may have narrowed the creation mode
    file.set_permissions(Permissions::from_mode(mode))
        .map_err(|e| Error::io(path, e))?;
    file.write_all(contents).map_err(|e| Error::io(path, e))
}
