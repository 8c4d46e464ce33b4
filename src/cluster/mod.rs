//! Read-only view of the cluster API.
//!
//! # Responsibilities
//! - Name the handful of calls the model builder needs
//! - Keep `kube` specifics behind one seam so builder logic is testable
//!
//! # Design Decisions
//! - Errors surface unmodified; callers decide which status codes are benign
//! - No caching, no watches: every cycle reads fresh state

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Endpoints, Secret, Service};

#[cfg(test)]
use mockall::automock;

use crate::error::Result;

pub mod client;

pub use client::KubeCluster;

/// Cluster API operations used to build the routing model.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Get the deployment carrying the router's own annotations.
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment>;

    /// List services in every namespace matching a label selector.
    async fn list_services(&self, label_selector: &str) -> Result<Vec<Service>>;

    /// Get a single service by name.
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service>;

    /// Get the endpoints object backing a service.
    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints>;

    /// Get a secret by name.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret>;
}
