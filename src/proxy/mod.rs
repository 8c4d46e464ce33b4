//! The managed Caddy process.
//!
//! # Responsibilities
//! - Launch the proxy once at startup and reap it on exit (process.rs)
//! - Ask the running proxy to re-read its configuration (reload.rs)
//!
//! # Design Decisions
//! - Command line and file locations are fixed, not configurable
//! - Reload is fire-and-forget: only signal delivery is checked

pub mod process;
pub mod reload;

pub use process::{start, supervise};
pub use reload::{PidFileReloader, Reload};

/// Proxy binary, resolved through `PATH`.
pub const PROXY_BIN: &str = "caddy";

/// Caddyfile the proxy is started with.
pub const CONFIG_PATH: &str = "/opt/router/Caddyfile";

/// Directory holding staged `<context>.crt` / `<context>.key` pairs.
pub const SSL_DIR: &str = "/opt/router/ssl";

/// Where the proxy records its pid.
pub const PID_FILE: &str = "/var/run/caddy.pid";
