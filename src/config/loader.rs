//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ControllerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming an optional TOML settings file.
pub const CONFIG_PATH_ENV: &str = "ROUTER_CONFIG";

/// Environment variable injected by the downward API with the pod's namespace.
pub const NAMESPACE_ENV: &str = "POD_NAMESPACE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without semantic checks.
fn read_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Resolve the controller configuration from the process environment.
pub fn load_from_env() -> Result<ControllerConfig, ConfigError> {
    let path = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let namespace = env::var(NAMESPACE_ENV).ok();
    resolve(path.as_deref(), namespace)
}

/// File settings (or defaults) with the pod namespace layered on top.
pub fn resolve(
    path: Option<&Path>,
    namespace: Option<String>,
) -> Result<ControllerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ControllerConfig::default(),
    };

    if let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) {
        config.namespace = namespace;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
