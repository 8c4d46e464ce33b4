//! Builds a [`RouterConfig`] from cluster state.
//!
//! # Responsibilities
//! - Read the router deployment, routable services, and builder service
//! - Map annotations onto typed config through the [`Modeler`]
//! - Derive per-app availability from endpoints
//!
//! # Design Decisions
//! - All-or-nothing: any error discards the whole model
//! - Services without domains are skipped, not reported as errors
//! - Apps are ordered by (namespace, name) so equal cluster state yields equal models

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Endpoints, Secret, Service};
use kube::ResourceExt;
use tracing::{debug, warn};

use crate::cluster::ClusterApi;
use crate::config::ControllerConfig;
use crate::error::Result;
use crate::model::modeler::Modeler;
use crate::model::{AppConfig, BuilderConfig, Certificate, RouterConfig};

/// Prefix shared by every router annotation and label.
pub const ANNOTATION_PREFIX: &str = "router.deis.io";

/// Context scoping root-level annotations to this router flavour.
pub const ROUTER_CONTEXT: &str = "caddy";

/// Selects services that opted into edge routing.
pub const ROUTABLE_SELECTOR: &str = "router.deis.io/routable=true";

/// Deployment whose annotations configure the router itself.
pub const ROUTER_DEPLOYMENT: &str = "deis-router";

/// Optional builder service in the router namespace.
pub const BUILDER_SERVICE: &str = "deis-builder";

const APP_LABEL: &str = "app";

static MODELER: Modeler = Modeler::new(ANNOTATION_PREFIX);

/// Inputs to a build besides the cluster itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSettings {
    /// Namespace of the router deployment and builder service.
    pub namespace: String,
    /// Secret holding the platform certificate, if one is in use.
    pub platform_cert_secret: Option<String>,
}

impl From<&ControllerConfig> for BuildSettings {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            platform_cert_secret: config.platform_cert_secret.clone(),
        }
    }
}

/// Query the cluster and assemble a complete routing model.
pub async fn build<C>(cluster: &C, settings: &BuildSettings) -> Result<RouterConfig>
where
    C: ClusterApi + ?Sized,
{
    let router = cluster
        .get_deployment(&settings.namespace, ROUTER_DEPLOYMENT)
        .await?;
    let mut services = cluster.list_services(ROUTABLE_SELECTOR).await?;
    let builder = get_builder_service(cluster, &settings.namespace).await?;
    let platform_certificate = match &settings.platform_cert_secret {
        Some(name) => get_platform_certificate(cluster, &settings.namespace, name).await?,
        None => None,
    };

    let mut config = build_router_config(&router)?;

    services.sort_by(|a, b| {
        (a.namespace(), a.name_any()).cmp(&(b.namespace(), b.name_any()))
    });
    for service in &services {
        if let Some(app) = build_app_config(cluster, service).await? {
            config.app_configs.push(app);
        }
    }

    config.builder_config = builder.as_ref().map(build_builder_config);
    config.platform_certificate = platform_certificate;

    debug!(
        apps = config.app_configs.len(),
        builder = config.builder_config.is_some(),
        platform_certificate = config.platform_certificate.is_some(),
        "router model built"
    );
    Ok(config)
}

/// The builder service, or `None` when it does not exist.
async fn get_builder_service<C>(cluster: &C, namespace: &str) -> Result<Option<Service>>
where
    C: ClusterApi + ?Sized,
{
    match cluster.get_service(namespace, BUILDER_SERVICE).await {
        Ok(service) => Ok(Some(service)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

async fn get_platform_certificate<C>(
    cluster: &C,
    namespace: &str,
    name: &str,
) -> Result<Option<Certificate>>
where
    C: ClusterApi + ?Sized,
{
    match cluster.get_secret(namespace, name).await {
        Ok(secret) => Ok(certificate_from_secret(&secret)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn certificate_from_secret(secret: &Secret) -> Option<Certificate> {
    let data = secret.data.as_ref();
    let cert = data.and_then(|d| d.get("tls.crt"));
    let key = data.and_then(|d| d.get("tls.key"));
    match (cert, key) {
        (Some(cert), Some(key)) => Some(Certificate {
            cert: cert.0.clone(),
            key: key.0.clone(),
        }),
        _ => {
            warn!(
                secret = %secret.name_any(),
                "platform certificate secret lacks tls.crt or tls.key; ignoring it"
            );
            None
        }
    }
}

fn build_router_config(router: &Deployment) -> Result<RouterConfig> {
    let mut config = RouterConfig::default();
    MODELER.map_to_model(router.annotations(), ROUTER_CONTEXT, &mut config)?;
    Ok(config)
}

async fn build_app_config<C>(cluster: &C, service: &Service) -> Result<Option<AppConfig>>
where
    C: ClusterApi + ?Sized,
{
    let name = service
        .labels()
        .get(APP_LABEL)
        .filter(|app| !app.is_empty())
        .cloned()
        .unwrap_or_else(|| service.name_any());

    let mut app = AppConfig::new(name);
    MODELER.map_to_model(service.annotations(), "", &mut app)?;
    if app.domains.is_empty() {
        debug!(service = %service.name_any(), "routable service has no domains; skipping");
        return Ok(None);
    }

    app.service_ip = cluster_ip(service);

    let namespace = service.namespace().unwrap_or_default();
    let endpoints = cluster
        .get_endpoints(&namespace, &service.name_any())
        .await?;
    app.available = has_ready_address(&endpoints);

    Ok(Some(app))
}

fn build_builder_config(service: &Service) -> BuilderConfig {
    BuilderConfig {
        service_ip: cluster_ip(service),
    }
}

fn cluster_ip(service: &Service) -> String {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.cluster_ip.clone())
        .unwrap_or_default()
}

/// True when any subset lists at least one ready address.
fn has_ready_address(endpoints: &Endpoints) -> bool {
    endpoints.subsets.as_ref().is_some_and(|subsets| {
        subsets
            .iter()
            .any(|subset| subset.addresses.as_ref().is_some_and(|a| !a.is_empty()))
    })
}
