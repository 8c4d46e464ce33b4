//! Configuration schema definitions.
//!
//! These settings tune the controller itself. The proxy command line and the
//! files it reads are fixed (see [`crate::proxy`]) and deliberately absent here.

use serde::{Deserialize, Serialize};

/// Root configuration for the router controller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Namespace holding the router deployment and the builder service.
    pub namespace: String,

    /// Name of a `kubernetes.io/tls` Secret holding the platform certificate.
    /// Left unset, no platform certificate is staged.
    pub platform_cert_secret: Option<String>,

    /// Reconciliation loop pacing.
    pub reconcile: ReconcileConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            platform_cert_secret: None,
            reconcile: ReconcileConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Token bucket settings for the reconciliation loop.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Sustained cycle rate (0.1 = one cycle every ten seconds).
    pub ticks_per_second: f64,

    /// Cycles allowed back-to-back before throttling kicks in.
    pub burst: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 0.1,
            burst: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "caddy_router=info".to_string(),
        }
    }
}
