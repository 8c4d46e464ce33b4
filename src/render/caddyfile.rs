//! Caddyfile rendering.
//!
//! # Responsibilities
//! - Turn a [`RouterConfig`] into Caddyfile text (pure)
//! - Write that text to the proxy's config path
//!
//! # Design Decisions
//! - A catch-all `0.0.0.0` site answering 404 is always emitted first
//! - Apps without ready endpoints get no site at all (fail closed)
//! - TLS directive precedence: global off, app off, platform certificate,
//!   app email, global email, proxy default

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{AppConfig, RouterConfig};
use crate::render::certs::PLATFORM_CONTEXT;

const HEADER: &str = "# Automatically generated Caddyfile";

/// [`fmt::Display`] adapter rendering a full Caddyfile.
///
/// `ssl_dir` is where [`write_certs`](crate::render::write_certs) staged the
/// certificates the document refers to.
pub struct Caddyfile<'a> {
    pub config: &'a RouterConfig,
    pub ssl_dir: &'a Path,
}

/// Render the configuration document for `config`.
pub fn render(config: &RouterConfig, ssl_dir: &Path) -> String {
    Caddyfile { config, ssl_dir }.to_string()
}

/// Render `config` and replace the file at `path` with the result.
pub fn write_config(config: &RouterConfig, ssl_dir: &Path, path: &Path) -> Result<()> {
    let rendered = render(config, ssl_dir);
    fs::write(path, &rendered).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), bytes = rendered.len(), "wrote proxy configuration");
    Ok(())
}

/// Fully qualified site address for one of an app's domains.
pub fn qualify(domain: &str, platform_domain: Option<&str>) -> String {
    match platform_domain {
        _ if domain.contains('.') => domain.to_string(),
        Some(platform) if !platform.is_empty() => format!("{}.{}", domain, platform),
        _ => domain.to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum TlsDirective<'a> {
    Off,
    PlatformCertificate,
    Email(&'a str),
}

fn tls_directive<'a>(
    config: &'a RouterConfig,
    app: &'a AppConfig,
    domain: &str,
) -> Option<TlsDirective<'a>> {
    let non_empty = |email: &'a Option<String>| email.as_deref().filter(|e| !e.is_empty());

    if config.tls_disabled() || app.tls_disabled() {
        return Some(TlsDirective::Off);
    }
    let under_platform =
        !domain.contains('.') && config.platform_domain.as_deref().is_some_and(|p| !p.is_empty());
    if under_platform && config.platform_certificate.is_some() {
        return Some(TlsDirective::PlatformCertificate);
    }
    non_empty(&app.tls_email)
        .or_else(|| non_empty(&config.tls_email))
        .map(TlsDirective::Email)
}

impl fmt::Display for Caddyfile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;

        writeln!(f, "{}", HEADER)?;
        writeln!(f, "0.0.0.0 {{")?;
        writeln!(f, "    status 404 /")?;
        writeln!(f, "}}")?;

        for app in config.app_configs.iter().filter(|app| app.available) {
            for domain in &app.domains {
                writeln!(f)?;
                write_site(f, config, self.ssl_dir, app, domain)?;
            }
        }
        Ok(())
    }
}

fn write_site(
    f: &mut fmt::Formatter<'_>,
    config: &RouterConfig,
    ssl_dir: &Path,
    app: &AppConfig,
    domain: &str,
) -> fmt::Result {
    writeln!(
        f,
        "{} {{",
        qualify(domain, config.platform_domain.as_deref())
    )?;
    writeln!(f, "    proxy / {}:80 {{", app.service_ip)?;
    writeln!(f, "        proxy_header Host {{host}}")?;
    writeln!(f, "        proxy_header X-Forwarded-Proto {{scheme}}")?;
    writeln!(f, "    }}")?;

    match tls_directive(config, app, domain) {
        Some(TlsDirective::Off) => writeln!(f, "    tls off")?,
        Some(TlsDirective::PlatformCertificate) => writeln!(
            f,
            "    tls {dir}/{ctx}.crt {dir}/{ctx}.key",
            dir = ssl_dir.display(),
            ctx = PLATFORM_CONTEXT
        )?,
        Some(TlsDirective::Email(email)) => writeln!(f, "    tls {}", email)?,
        None => {}
    }

    if let Some((path, user, pass)) = app.basic_auth() {
        writeln!(f, "    basicauth {} {} {}", path, user, pass)?;
    }
    writeln!(f, "}}")
}
