//! Caddy edge router controller library.

pub mod cluster;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod proxy;
pub mod reconcile;
pub mod render;

pub use config::ControllerConfig;
pub use error::{Error, Result};
pub use model::{AppConfig, BuilderConfig, Certificate, RouterConfig};
pub use reconcile::Reconciler;
