//! [`ClusterApi`] backed by a live `kube` client.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Endpoints, Secret, Service};
use kube::api::{Api, ListParams};
use kube::Client;
use tracing::debug;

use crate::cluster::ClusterApi;
use crate::error::Result;

/// Cluster access through the in-cluster (or kubeconfig) client.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the default client configuration.
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn list_services(&self, label_selector: &str) -> Result<Vec<Service>> {
        let api: Api<Service> = Api::all(self.client.clone());
        let lp = ListParams::default().labels(label_selector);
        let services = api.list(&lp).await?.items;
        debug!(selector = %label_selector, count = services.len(), "listed services");
        Ok(services)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints> {
        let api: Api<Endpoints> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }
}
