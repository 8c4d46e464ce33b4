//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rate > 0, burst >= 1)
//! - Check Kubernetes object names are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControllerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::schema::ControllerConfig;

static DNS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$").expect("valid DNS label regex")
});

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending setting.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ControllerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !DNS_LABEL.is_match(&config.namespace) {
        errors.push(ValidationError {
            field: "namespace",
            message: format!("{:?} is not a valid namespace name", config.namespace),
        });
    }

    if let Some(secret) = &config.platform_cert_secret {
        if secret.trim().is_empty() {
            errors.push(ValidationError {
                field: "platform_cert_secret",
                message: "must not be empty when set".to_string(),
            });
        }
    }

    let rate = config.reconcile.ticks_per_second;
    if !rate.is_finite() || rate <= 0.0 {
        errors.push(ValidationError {
            field: "reconcile.ticks_per_second",
            message: format!("must be a positive number, got {}", rate),
        });
    }

    if config.reconcile.burst == 0 {
        errors.push(ValidationError {
            field: "reconcile.burst",
            message: "must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
