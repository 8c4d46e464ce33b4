//! Reload handshake with the running proxy.
//!
//! # Protocol
//! - Read the pid file (decimal pid, surrounding whitespace allowed)
//! - Empty file: the proxy has not written its pid yet, nothing to reload
//! - Otherwise send `SIGUSR1`; Caddy re-reads its Caddyfile on receipt

use std::fs;
use std::path::{Path, PathBuf};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::proxy::{CONFIG_PATH, PID_FILE};

/// Something that can make the proxy pick up freshly written configuration.
pub trait Reload: Send + Sync {
    fn reload(&self) -> Result<()>;
}

/// Signals the process named by a pid file.
#[derive(Debug, Clone)]
pub struct PidFileReloader {
    pid_file: PathBuf,
    config_path: PathBuf,
}

impl PidFileReloader {
    pub fn new(pid_file: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            pid_file: pid_file.into(),
            config_path: config_path.into(),
        }
    }
}

impl Default for PidFileReloader {
    fn default() -> Self {
        Self::new(PID_FILE, CONFIG_PATH)
    }
}

impl Reload for PidFileReloader {
    fn reload(&self) -> Result<()> {
        info!("reloading proxy");
        match read_pid(&self.pid_file)? {
            Some(pid) => {
                kill(Pid::from_raw(pid), Signal::SIGUSR1)
                    .map_err(|source| Error::Signal { pid, source })?;
                debug!(pid, "sent SIGUSR1");
            }
            None => debug!(path = %self.pid_file.display(), "pid file empty; nothing to signal"),
        }

        // echo what the proxy is now serving
        match fs::read_to_string(&self.config_path) {
            Ok(contents) if !contents.is_empty() => {
                debug!(path = %self.config_path.display(), "active configuration:\n{}", contents)
            }
            Ok(_) => {}
            Err(e) => return Err(Error::io(&self.config_path, e)),
        }

        info!("proxy reloaded");
        Ok(())
    }
}

/// Parse the pid file. `Ok(None)` means the file is empty.
pub fn read_pid(path: &Path) -> Result<Option<i32>> {
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let trimmed = contents.trim();
    if contents.is_empty() {
        return Ok(None);
    }

    let pid: i32 = trimmed.parse().map_err(|e| Error::PidFile {
        path: path.to_path_buf(),
        reason: format!("{:?} is not a pid: {}", trimmed, e),
    })?;
    if pid <= 0 {
        return Err(Error::PidFile {
            path: path.to_path_buf(),
            reason: format!("{} is not a valid process id", pid),
        });
    }
    Ok(Some(pid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid_file(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn test_reads_pid_with_whitespace() {
        let file = pid_file("  4242\n");
        assert_eq!(read_pid(file.path()).unwrap(), Some(4242));
    }

    #[test]
    fn test_empty_file_means_nothing_to_reload() {
        let file = pid_file("");
        assert_eq!(read_pid(file.path()).unwrap(), None);
    }

    #[test]
    fn test_garbage_is_an_error() {
        for contents in ["caddy", "\n", "-1", "0", "12 34"] {
            let file = pid_file(contents);
            assert!(
                matches!(read_pid(file.path()), Err(Error::PidFile { .. })),
                "accepted {:?}",
                contents
            );
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_pid(&dir.path().join("caddy.pid")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_reload_with_empty_pid_file_only_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        let pid = dir.path().join("caddy.pid");
        let conf = dir.path().join("Caddyfile");
        fs::write(&pid, "").unwrap();
        fs::write(&conf, "0.0.0.0 {\n}\n").unwrap();

        PidFileReloader::new(&pid, &conf).reload().unwrap();
    }

    #[test]
    fn test_reload_signals_live_process() {
        let mut child = std::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let pid = dir.path().join("caddy.pid");
        let conf = dir.path().join("Caddyfile");
        fs::write(&pid, format!("{}\n", child.id())).unwrap();
        fs::write(&conf, "").unwrap();

        let result = PidFileReloader::new(&pid, &conf).reload();
        let _ = child.kill();
        let _ = child.wait();
        result.unwrap();
    }

    #[test]
    fn test_reload_of_dead_process_fails() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let dead = child.id();
        child.wait().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let pid = dir.path().join("caddy.pid");
        let conf = dir.path().join("Caddyfile");
        fs::write(&pid, dead.to_string()).unwrap();
        fs::write(&conf, "").unwrap();

        let err = PidFileReloader::new(&pid, &conf).reload().unwrap_err();
        assert!(matches!(err, Error::Signal { .. }));
    }
}
