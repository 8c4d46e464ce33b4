//! Typed routing model.
//!
//! # Data Flow
//! ```text
//! Deployment annotations ──┐
//! routable Services ───────┼─→ builder.rs ─→ RouterConfig
//! Endpoints / Secret ──────┘        │
//!                                   └─ modeler.rs (annotation → field mapping)
//! ```
//!
//! # Design Decisions
//! - Rebuilt from scratch every cycle; never mutated after `build` returns
//! - Plain value types with `PartialEq` so change detection is structural
//! - Annotation bindings are declared per type in a static field table

use std::sync::LazyLock;

use regex::Regex;

pub mod builder;
pub mod modeler;

pub use builder::{build, BuildSettings};
pub use modeler::{Annotated, Field, Modeler};

static PLATFORM_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}$").expect("valid platform domain regex")
});

static TLS_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(off)$").expect("valid TLS mode regex"));

static DOMAINS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^((([a-z0-9]+(-[a-z0-9]+)*)|((\*\.)?[a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,})(\s*,\s*)?)+$",
    )
    .expect("valid domains regex")
});

/// At most one Caddyfile token: no whitespace, braces, quotes or comment marks.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"^[^\s{}"#]*$"##).expect("valid token regex"));

/// TLS mode value that disables TLS.
pub const TLS_OFF: &str = "off";

/// Root of the routing model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterConfig {
    /// Suffix appended to bare app domains.
    pub platform_domain: Option<String>,
    /// Global TLS mode; only `off` is meaningful.
    pub tls: Option<String>,
    /// Contact address for automatic certificate issuance.
    pub tls_email: Option<String>,
    /// One entry per routable service with at least one domain.
    pub app_configs: Vec<AppConfig>,
    pub builder_config: Option<BuilderConfig>,
    pub platform_certificate: Option<Certificate>,
}

impl RouterConfig {
    /// True when TLS is switched off for every host.
    pub fn tls_disabled(&self) -> bool {
        self.tls.as_deref() == Some(TLS_OFF)
    }
}

impl Annotated for RouterConfig {
    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<RouterConfig>; 3] = [
            Field {
                key: "platformDomain",
                constraint: Some(&PLATFORM_DOMAIN),
                apply: |c, v| c.platform_domain = Some(v.to_string()),
            },
            Field {
                key: "tls",
                constraint: Some(&TLS_MODE),
                apply: |c, v| c.tls = Some(v.to_string()),
            },
            Field {
                key: "tlsEmail",
                constraint: Some(&TOKEN),
                apply: |c, v| c.tls_email = Some(v.to_string()),
            },
        ];
        &FIELDS
    }
}

/// Routing settings for a single backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub name: String,
    /// Hostnames, or bare tokens to be qualified with the platform domain.
    pub domains: Vec<String>,
    pub tls: Option<String>,
    pub tls_email: Option<String>,
    pub basic_auth_path: String,
    pub basic_auth_user: String,
    pub basic_auth_pass: String,
    /// Cluster IP the proxy forwards to.
    pub service_ip: String,
    /// At least one ready endpoint backs the service.
    pub available: bool,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domains: Vec::new(),
            tls: None,
            tls_email: None,
            basic_auth_path: "/".to_string(),
            basic_auth_user: String::new(),
            basic_auth_pass: String::new(),
            service_ip: String::new(),
            available: false,
        }
    }

    pub fn tls_disabled(&self) -> bool {
        self.tls.as_deref() == Some(TLS_OFF)
    }

    /// Path, user and password, only when all three are set.
    pub fn basic_auth(&self) -> Option<(&str, &str, &str)> {
        let (path, user, pass) = (
            self.basic_auth_path.as_str(),
            self.basic_auth_user.as_str(),
            self.basic_auth_pass.as_str(),
        );
        if path.is_empty() || user.is_empty() || pass.is_empty() {
            return None;
        }
        Some((path, user, pass))
    }
}

impl Annotated for AppConfig {
    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<AppConfig>; 6] = [
            Field {
                key: "domains",
                constraint: Some(&DOMAINS),
                apply: |c, v| {
                    c.domains = v
                        .split(',')
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(String::from)
                        .collect()
                },
            },
            Field {
                key: "tls",
                constraint: Some(&TLS_MODE),
                apply: |c, v| c.tls = Some(v.to_string()),
            },
            Field {
                key: "tlsEmail",
                constraint: Some(&TOKEN),
                apply: |c, v| c.tls_email = Some(v.to_string()),
            },
            Field {
                key: "basicAuthPath",
                constraint: Some(&TOKEN),
                apply: |c, v| c.basic_auth_path = v.to_string(),
            },
            Field {
                key: "basicAuthUser",
                constraint: Some(&TOKEN),
                apply: |c, v| c.basic_auth_user = v.to_string(),
            },
            Field {
                key: "basicAuthPass",
                constraint: Some(&TOKEN),
                apply: |c, v| c.basic_auth_pass = v.to_string(),
            },
        ];
        &FIELDS
    }
}

/// Present only when the builder service exists in the router namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    pub service_ip: String,
}

/// Opaque PEM material. Never parsed, only staged to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("cert", &format_args!("{} bytes", self.cert.len()))
            .field("key", &"<redacted>")
            .finish()
    }
}
