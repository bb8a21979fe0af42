//! Cluster state access
//!
//! The reconciliation engine and eviction policy consume cluster state
//! through this trait so cycles can run against a mock in tests. The
//! production implementation backed by the Kubernetes API lives in
//! [`crate::kube_client`].

use crate::error::GuardError;
use crate::models::{ControllerKind, ControllerStatus, PodContainer, PodMeta, UsageSample};

pub use async_trait::async_trait;

/// Read and mutate operations the guardian needs from the cluster.
#[async_trait]
pub trait ClusterStateClient: Send + Sync {
    /// Enumerate every pod in the cluster with its declared containers.
    async fn list_pods(&self) -> Result<Vec<(PodMeta, Vec<PodContainer>)>, GuardError>;

    /// Fetch the live memory-usage snapshot, one sample per container.
    async fn fetch_usage_snapshot(&self) -> Result<Vec<UsageSample>, GuardError>;

    /// Fetch replica status for a controller. Returns `Ok(None)` for kinds
    /// with no status endpoint.
    async fn fetch_controller_status(
        &self,
        kind: ControllerKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<ControllerStatus>, GuardError>;

    /// Delete a pod so its controller recreates it.
    async fn delete_pod(&self, name: &str, namespace: &str) -> Result<(), GuardError>;
}
