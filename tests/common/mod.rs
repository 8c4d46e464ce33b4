//! Shared fixtures for integration tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use caddy_router::cluster::ClusterApi;
use caddy_router::error::{Error, Result};
use caddy_router::proxy::Reload;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    EndpointAddress, EndpointSubset, Endpoints, Secret, Service, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::core::ErrorResponse;

pub fn api_error(code: u16) -> Error {
    Error::Kube(kube::Error::Api(ErrorResponse {
        status: "Failure".into(),
        message: "injected".into(),
        reason: "Injected".into(),
        code,
    }))
}

fn string_map(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[derive(Default)]
struct ClusterState {
    router_annotations: BTreeMap<String, String>,
    services: Vec<Service>,
    ready: BTreeMap<(String, String), bool>,
    builder_ip: Option<String>,
    builder_error: Option<u16>,
    secret: Option<(Vec<u8>, Vec<u8>)>,
}

/// In-memory cluster that tests can mutate between cycles.
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

#[allow(dead_code)]
impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_router_annotation(&self, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .router_annotations
            .insert(key.to_string(), value.to_string());
    }

    pub fn remove_router_annotation(&self, key: &str) {
        self.state.lock().unwrap().router_annotations.remove(key);
    }

    /// Add a routable service with the given domains annotation.
    pub fn add_app(&self, namespace: &str, name: &str, domains: &str, ip: &str, ready: bool) {
        let service = Service {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                labels: string_map(&[("router.deis.io/routable", "true"), ("app", name)]),
                annotations: string_map(&[("router.deis.io/domains", domains)]),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                cluster_ip: Some(ip.into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut state = self.state.lock().unwrap();
        state.services.push(service);
        state
            .ready
            .insert((namespace.to_string(), name.to_string()), ready);
    }

    pub fn set_ready(&self, namespace: &str, name: &str, ready: bool) {
        self.state
            .lock()
            .unwrap()
            .ready
            .insert((namespace.to_string(), name.to_string()), ready);
    }

    pub fn set_builder(&self, ip: Option<&str>) {
        self.state.lock().unwrap().builder_ip = ip.map(String::from);
    }

    pub fn fail_builder_lookup(&self, code: Option<u16>) {
        self.state.lock().unwrap().builder_error = code;
    }

    pub fn set_platform_secret(&self, pair: Option<(&[u8], &[u8])>) {
        self.state.lock().unwrap().secret = pair.map(|(c, k)| (c.to_vec(), k.to_vec()));
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        let state = self.state.lock().unwrap();
        Ok(Deployment {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                annotations: Some(state.router_annotations.clone()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn list_services(&self, _label_selector: &str) -> Result<Vec<Service>> {
        Ok(self.state.lock().unwrap().services.clone())
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        let state = self.state.lock().unwrap();
        if let Some(code) = state.builder_error {
            return Err(api_error(code));
        }
        match &state.builder_ip {
            Some(ip) => Ok(Service {
                metadata: ObjectMeta {
                    name: Some(name.into()),
                    namespace: Some(namespace.into()),
                    ..Default::default()
                },
                spec: Some(ServiceSpec {
                    cluster_ip: Some(ip.clone()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            None => Err(api_error(404)),
        }
    }

    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints> {
        let state = self.state.lock().unwrap();
        let ready = state
            .ready
            .get(&(namespace.to_string(), name.to_string()))
            .copied()
            .ok_or_else(|| api_error(404))?;
        let addresses = if ready {
            vec![EndpointAddress {
                ip: "10.244.0.10".into(),
                ..Default::default()
            }]
        } else {
            vec![]
        };
        Ok(Endpoints {
            subsets: Some(vec![EndpointSubset {
                addresses: Some(addresses),
                ..Default::default()
            }]),
            ..Default::default()
        })
    }

    async fn get_secret(&self, _namespace: &str, _name: &str) -> Result<Secret> {
        let state = self.state.lock().unwrap();
        match &state.secret {
            Some((cert, key)) => Ok(Secret {
                data: Some(BTreeMap::from([
                    ("tls.crt".to_string(), ByteString(cert.clone())),
                    ("tls.key".to_string(), ByteString(key.clone())),
                ])),
                ..Default::default()
            }),
            None => Err(api_error(404)),
        }
    }
}

/// Reloader that counts calls and can be told to fail.
#[derive(Clone, Default)]
pub struct CountingReloader {
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl CountingReloader {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Reload for CountingReloader {
    fn reload(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Signal {
                pid: 4242,
                source: nix::errno::Errno::ESRCH,
            });
        }
        Ok(())
    }
}
