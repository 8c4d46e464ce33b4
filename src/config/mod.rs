//! Controller configuration subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file ($ROUTER_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → $POD_NAMESPACE override
//!     → validation.rs (semantic checks)
//!     → ControllerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup; there is no hot reload of controller settings
//! - All fields have defaults so the controller runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ControllerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ReconcileConfig;
