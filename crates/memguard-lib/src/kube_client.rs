//! Kubernetes-backed implementation of [`ClusterStateClient`]
//!
//! Pods come from the core/v1 API, the usage snapshot from the
//! `metrics.k8s.io/v1beta1` aggregated API, and controller status from the
//! typed apps/v1 and core/v1 objects named by a pod's owner reference.

use crate::client::{async_trait, ClusterStateClient};
use crate::error::GuardError;
use crate::models::{
    ControllerKind, ControllerStatus, OwnerRef, PodContainer, PodMeta, UsageSample,
};
use anyhow::Context;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Pod, ReplicationController};
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, GroupVersionKind, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Per-container entry in a `PodMetrics` object.
#[derive(Debug, Deserialize)]
struct ContainerUsage {
    name: String,
    usage: ResourceUsage,
}

#[derive(Debug, Deserialize)]
struct ResourceUsage {
    memory: Option<String>,
}

/// Cluster client backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Connect using an explicit kubeconfig, or fall back to the inferred
    /// configuration (kubeconfig from the environment, else the in-cluster
    /// service account). Failure here happens before the first cycle and is
    /// fatal to the process.
    pub async fn connect(kubeconfig: Option<&Path>) -> anyhow::Result<Self> {
        let config = match kubeconfig {
            Some(path) => {
                debug!(path = %path.display(), "Using explicit kubeconfig");
                let kc = Kubeconfig::read_from(path)
                    .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
                Config::from_custom_kubeconfig(kc, &KubeConfigOptions::default())
                    .await
                    .context("failed to load kubeconfig")?
            }
            None => Config::infer()
                .await
                .context("failed to infer cluster configuration")?,
        };
        let client = Client::try_from(config).context("failed to build Kubernetes client")?;
        Ok(Self { client })
    }

    /// Wrap an already-constructed client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Map a status fetch failure, distinguishing a vanished controller from a
/// transport problem.
fn status_error(err: kube::Error, kind: ControllerKind, name: &str, namespace: &str) -> GuardError {
    match &err {
        kube::Error::Api(resp) if resp.code == 404 => GuardError::ControllerMissing {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: namespace.to_string(),
        },
        _ => GuardError::Collaborator(err),
    }
}

#[async_trait]
impl ClusterStateClient for KubeClusterClient {
    async fn list_pods(&self) -> Result<Vec<(PodMeta, Vec<PodContainer>)>, GuardError> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let list = pods.list(&ListParams::default()).await?;

        let mut out = Vec::with_capacity(list.items.len());
        for pod in list.items {
            let meta = PodMeta {
                namespace: pod.metadata.namespace.unwrap_or_default(),
                name: pod.metadata.name.unwrap_or_default(),
                annotations: pod.metadata.annotations.unwrap_or_default(),
                owner_references: pod
                    .metadata
                    .owner_references
                    .unwrap_or_default()
                    .into_iter()
                    .map(|o| OwnerRef {
                        kind: o.kind,
                        name: o.name,
                        is_controller: o.controller.unwrap_or(false),
                    })
                    .collect(),
            };
            let containers = pod
                .spec
                .map(|spec| {
                    spec.containers
                        .into_iter()
                        .map(|c| PodContainer { name: c.name })
                        .collect()
                })
                .unwrap_or_default();
            out.push((meta, containers));
        }
        Ok(out)
    }

    async fn fetch_usage_snapshot(&self) -> Result<Vec<UsageSample>, GuardError> {
        let gvk = GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "PodMetrics");
        let resource = ApiResource::from_gvk_with_plural(&gvk, "pods");
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);
        let list = api.list(&ListParams::default()).await?;

        let mut samples = Vec::new();
        for item in list.items {
            let namespace = item.metadata.namespace.clone().unwrap_or_default();
            let pod = item.metadata.name.clone().unwrap_or_default();
            let containers = item
                .data
                .get("containers")
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            let containers: Vec<ContainerUsage> = match serde_json::from_value(containers) {
                Ok(containers) => containers,
                Err(err) => {
                    warn!(
                        namespace = %namespace,
                        pod = %pod,
                        error = %err,
                        "Skipping pod metrics with unexpected shape"
                    );
                    continue;
                }
            };
            for container in containers {
                let Some(memory) = container.usage.memory else {
                    debug!(
                        namespace = %namespace,
                        pod = %pod,
                        container = %container.name,
                        "Metrics entry has no memory usage"
                    );
                    continue;
                };
                samples.push(UsageSample {
                    namespace: namespace.clone(),
                    pod: pod.clone(),
                    container: container.name,
                    memory,
                });
            }
        }
        Ok(samples)
    }

    async fn fetch_controller_status(
        &self,
        kind: ControllerKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<ControllerStatus>, GuardError> {
        debug!(%kind, name, namespace, "Retrieving controller status");
        let status = match kind {
            ControllerKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
                let obj = api
                    .get(name)
                    .await
                    .map_err(|e| status_error(e, kind, name, namespace))?;
                obj.status.map(|s| ControllerStatus {
                    desired_replicas: s.replicas,
                    ready_replicas: s.ready_replicas,
                })
            }
            ControllerKind::StatefulSet => {
                let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
                let obj = api
                    .get(name)
                    .await
                    .map_err(|e| status_error(e, kind, name, namespace))?;
                obj.status.map(|s| ControllerStatus {
                    desired_replicas: Some(s.replicas),
                    ready_replicas: s.ready_replicas,
                })
            }
            ControllerKind::ReplicaSet => {
                let api: Api<ReplicaSet> = Api::namespaced(self.client.clone(), namespace);
                let obj = api
                    .get(name)
                    .await
                    .map_err(|e| status_error(e, kind, name, namespace))?;
                obj.status.map(|s| ControllerStatus {
                    desired_replicas: Some(s.replicas),
                    ready_replicas: s.ready_replicas,
                })
            }
            ControllerKind::ReplicationController => {
                let api: Api<ReplicationController> =
                    Api::namespaced(self.client.clone(), namespace);
                let obj = api
                    .get(name)
                    .await
                    .map_err(|e| status_error(e, kind, name, namespace))?;
                obj.status.map(|s| ControllerStatus {
                    desired_replicas: Some(s.replicas),
                    ready_replicas: s.ready_replicas,
                })
            }
            ControllerKind::Unsupported => None,
        };
        Ok(status)
    }

    async fn delete_pod(&self, name: &str, namespace: &str) -> Result<(), GuardError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}
