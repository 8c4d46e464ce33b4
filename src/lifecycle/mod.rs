//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Start proxy → Connect to cluster → Build reconciler
//!
//! Run (main.rs):
//!     Reconciler loop until a reload fails → exit non-zero
//! ```
//!
//! # Design Decisions
//! - Ordered startup: proxy first, then cluster client
//! - No graceful shutdown path; the loop runs until the process is killed

pub mod startup;

pub use startup::{start, Runtime};
