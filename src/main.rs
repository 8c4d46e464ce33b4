//! Caddy edge router controller.
//!
//! Keeps a Caddy reverse proxy's routing table in step with the services a
//! Kubernetes cluster marks as routable.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────── Kubernetes API ────────────────┐
//!   │ deployment/deis-router   services (routable)   │
//!   │ service/deis-builder     endpoints   secret    │
//!   └───────────────────────┬────────────────────────┘
//!                           │ every tick (token bucket)
//!                           ▼
//!                   ┌───────────────┐   unchanged
//!                   │ model builder │──────────────▶ idle
//!                   └───────┬───────┘
//!                           │ RouterConfig
//!                           ▼
//!        ┌──────────────────────────────────────┐
//!        │ render: ssl/*.crt|key  →  Caddyfile  │
//!        └──────────────────┬───────────────────┘
//!                           │ SIGUSR1 (pid file)
//!                           ▼
//!                     ┌───────────┐
//!                     │   caddy   │
//!                     └───────────┘
//! ```

use caddy_router::config::loader::load_from_env;
use caddy_router::lifecycle::{self, Runtime};
use caddy_router::observability::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;
    init_logging(&config.observability);

    tracing::info!(
        namespace = %config.namespace,
        ticks_per_second = config.reconcile.ticks_per_second,
        burst = config.reconcile.burst,
        platform_cert_secret = ?config.platform_cert_secret,
        "caddy-router v0.1.0 starting"
    );

    let Runtime {
        proxy: _proxy,
        reconciler,
    } = lifecycle::start(&config).await.inspect_err(|e| {
        tracing::error!(error = %e, "startup failed");
    })?;

    reconciler.run().await.inspect_err(|e| {
        tracing::error!(error = %e, "reconciliation stopped");
    })?;

    Ok(())
}
