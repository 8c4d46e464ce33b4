//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! model / render / reconcile / proxy
//!     → tracing events with structured fields
//!     → logging.rs subscriber (EnvFilter + fmt) → stdout
//! ```
//!
//! # Design Decisions
//! - Structured fields (`apps = 3`) over interpolated strings
//! - Every aborted cycle logs at `error` before the loop goes idle

pub mod logging;

pub use logging::init_logging;
