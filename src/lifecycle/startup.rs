//! Startup orchestration.
//!
//! # Responsibilities
//! - Launch the proxy subprocess
//! - Connect to the cluster API
//! - Assemble the reconciler from validated configuration
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The proxy starts first so it is serving the catch-all site while the
//!   first model is built

use std::process::ExitStatus;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cluster::KubeCluster;
use crate::config::ControllerConfig;
use crate::error::Result;
use crate::model::BuildSettings;
use crate::proxy::{self, PidFileReloader};
use crate::reconcile::{Layout, Reconciler, TokenBucket};

/// Everything `main` needs to keep alive and drive.
pub struct Runtime {
    /// Resolves with the proxy's exit status once it has been reaped.
    pub proxy: JoinHandle<Option<ExitStatus>>,
    pub reconciler: Reconciler<KubeCluster, PidFileReloader>,
}

/// Start the proxy and wire the reconciler to the live cluster.
pub async fn start(config: &ControllerConfig) -> Result<Runtime> {
    let proxy = proxy::supervise(proxy::start()?);

    let cluster = KubeCluster::try_default().await?;
    info!(namespace = %config.namespace, "connected to cluster API");

    let reconciler = Reconciler::new(
        cluster,
        PidFileReloader::default(),
        BuildSettings::from(config),
        Layout::default(),
        TokenBucket::from_config(&config.reconcile),
    );

    Ok(Runtime { proxy, reconciler })
}
