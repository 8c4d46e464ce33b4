//! Rendering the model into proxy inputs.
//!
//! # Data Flow
//! ```text
//! RouterConfig
//!     → certs.rs     (<ssl>/<context>.crt, <ssl>/<context>.key)
//!     → caddyfile.rs (Caddyfile text → config path)
//! ```
//!
//! # Design Decisions
//! - Rendering is pure and testable without touching disk
//! - Writes fully replace prior content; no diffing

pub mod caddyfile;
pub mod certs;

pub use caddyfile::{render, write_config};
pub use certs::write_certs;
