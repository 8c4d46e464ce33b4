//! The reconciliation loop.
//!
//! # State Machine
//! ```text
//!  Idle ──tick──▶ Applying: build ─▶ compare ─▶ certs ─▶ config ─▶ reload
//!   ▲                 │ equal / build, cert or config error        │
//!   └─────────────────┴───────────────────────────────────────────┘
//!                                 reload error ─▶ fatal (loop returns)
//! ```
//!
//! # Design Decisions
//! - The last applied model only changes after a fully successful apply
//! - Failures before the reload step are logged and retried on the next tick
//! - A failed reload ends the loop: config on disk may not be what is served

use std::path::PathBuf;

use tracing::{error, info};

use crate::cluster::ClusterApi;
use crate::error::{Error, Result};
use crate::model::{self, BuildSettings, RouterConfig};
use crate::proxy::{Reload, CONFIG_PATH, SSL_DIR};
use crate::reconcile::rate_limit::TokenBucket;
use crate::render::{caddyfile, certs};

/// Files the driver writes for the proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub ssl_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            ssl_dir: PathBuf::from(SSL_DIR),
            config_path: PathBuf::from(CONFIG_PATH),
        }
    }
}

/// Result of a single non-fatal cycle.
#[derive(Debug)]
pub enum Outcome {
    /// Cluster state matches what was last applied.
    Unchanged,
    /// New configuration written and the proxy signalled.
    Applied,
    /// The cycle stopped early; nothing was committed.
    Aborted { stage: Stage, error: Error },
}

/// Step at which a cycle was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    WriteCerts,
    WriteConfig,
}

/// Owns the loop state: collaborators plus the last applied model.
pub struct Reconciler<C, R> {
    cluster: C,
    reloader: R,
    settings: BuildSettings,
    layout: Layout,
    limiter: TokenBucket,
    known: Option<RouterConfig>,
}

impl<C, R> Reconciler<C, R>
where
    C: ClusterApi,
    R: Reload,
{
    pub fn new(
        cluster: C,
        reloader: R,
        settings: BuildSettings,
        layout: Layout,
        limiter: TokenBucket,
    ) -> Self {
        Self {
            cluster,
            reloader,
            settings,
            layout,
            limiter,
            known: None,
        }
    }

    /// Last model that was fully applied, if any.
    pub fn known(&self) -> Option<&RouterConfig> {
        self.known.as_ref()
    }

    /// Loop forever. Returns only when a reload could not be delivered.
    pub async fn run(mut self) -> Result<()> {
        info!(namespace = %self.settings.namespace, "reconciliation loop started");
        loop {
            self.limiter.acquire().await;
            self.reconcile_once().await?;
        }
    }

    /// Run one build-compare-apply cycle.
    ///
    /// `Err` is reserved for fatal failures; everything else is an [`Outcome`].
    pub async fn reconcile_once(&mut self) -> Result<Outcome> {
        let config = match model::build(&self.cluster, &self.settings).await {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "error building model; not modifying certs or configuration");
                return Ok(Outcome::Aborted {
                    stage: Stage::Build,
                    error: e,
                });
            }
        };

        if self.known.as_ref() == Some(&config) {
            return Ok(Outcome::Unchanged);
        }
        info!(apps = config.app_configs.len(), "router configuration has changed");

        if let Err(e) = certs::write_certs(&config, &self.layout.ssl_dir) {
            error!(error = %e, "failed to write certs; continuing with existing certs and configuration");
            return Ok(Outcome::Aborted {
                stage: Stage::WriteCerts,
                error: e,
            });
        }

        if let Err(e) =
            caddyfile::write_config(&config, &self.layout.ssl_dir, &self.layout.config_path)
        {
            error!(error = %e, "failed to write proxy configuration; continuing with existing configuration");
            return Ok(Outcome::Aborted {
                stage: Stage::WriteConfig,
                error: e,
            });
        }

        if let Err(e) = self.reloader.reload() {
            error!(error = %e, "failed to reload proxy");
            return Err(e);
        }

        self.known = Some(config);
        Ok(Outcome::Applied)
    }
}
