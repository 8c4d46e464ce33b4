//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! rate_limit.rs (token bucket tick)
//!     → driver.rs: model::build → compare with last applied
//!     → render::certs → render::caddyfile → proxy::reload
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: one cycle at a time, no shared state
//! - Change detection is structural equality on the model

pub mod driver;
pub mod rate_limit;

pub use driver::{Layout, Outcome, Reconciler, Stage};
pub use rate_limit::TokenBucket;
