//! Proxy process startup.

use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::proxy::{CONFIG_PATH, PID_FILE, PROXY_BIN};

/// Fixed command line the proxy runs with.
pub fn proxy_args() -> Vec<String> {
    vec![
        format!("--pidfile={}", PID_FILE),
        format!("--conf={}", CONFIG_PATH),
        "--log=stdout".to_string(),
        "--agree=true".to_string(),
        "--port=80".to_string(),
    ]
}

/// Spawn the proxy with its output passed through to ours.
///
/// The returned handle must be kept alive for as long as the proxy should run.
pub fn start() -> Result<Child> {
    info!(bin = PROXY_BIN, "starting proxy");
    let child = Command::new(PROXY_BIN)
        .args(proxy_args())
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(Error::ProxyStart)?;
    info!(pid = child.id(), "proxy started");
    Ok(child)
}

/// Reap the proxy when it exits.
///
/// Once reaped its pid is gone, so the next reload fails to signal and ends
/// the reconciliation loop.
pub fn supervise(mut child: Child) -> JoinHandle<Option<ExitStatus>> {
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => {
                error!(%status, "proxy exited");
                Some(status)
            }
            Err(e) => {
                error!(error = %e, "failed to wait on proxy");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_points_at_managed_files() {
        let args = proxy_args();
        assert!(args.contains(&"--pidfile=/var/run/caddy.pid".to_string()));
        assert!(args.contains(&"--conf=/opt/router/Caddyfile".to_string()));
        assert!(args.contains(&"--agree=true".to_string()));
        assert!(args.contains(&"--port=80".to_string()));
    }

    #[tokio::test]
    async fn test_supervise_reaps_exited_proxy() {
        let child = Command::new("true").spawn().unwrap();
        let pid = child.id().unwrap();

        let status = supervise(child).await.unwrap();
        assert!(status.unwrap().success());
        // reaped: the pid no longer names a process we can signal
        let signalled = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None);
        assert!(signalled.is_err());
    }
}
