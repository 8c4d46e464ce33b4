//! Crate-wide error type.
//!
//! # Design Decisions
//! - One enum for every failure a reconciliation cycle can hit
//! - Cluster errors are carried unmodified so callers can inspect status codes
//! - Whether an error is fatal is decided by the driver, not here

use std::path::PathBuf;

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors produced while building, rendering, or applying router configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// An annotation value did not match the constraint declared for its field.
    #[error("annotation {key} has invalid value {value:?}")]
    Validation { key: String, value: String },

    /// The cluster API rejected or failed a request.
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Reading or writing a file under the proxy's directories failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The proxy pid file exists but does not hold a usable pid.
    #[error("invalid pid file {}: {reason}", path.display())]
    PidFile { path: PathBuf, reason: String },

    /// The reload signal could not be delivered.
    #[error("failed to signal proxy process {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: nix::errno::Errno,
    },

    /// The proxy subprocess could not be spawned.
    #[error("failed to start proxy: {0}")]
    ProxyStart(#[source] std::io::Error),

    /// Controller configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the cluster API answered 404 for the requested object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Kube(kube::Error::Api(ae)) if ae.code == 404)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
