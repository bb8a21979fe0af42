//! Container identity and memory-ceiling resolution
//!
//! A ceiling is declared on the pod through annotations: the container-scoped
//! key `memguard.limit.memory/<container>` wins over the pod-wide key
//! `memguard.limit.memory`. A pod with neither key is simply not monitored.

use crate::error::GuardError;
use crate::models::PodMeta;
use crate::quantity::parse_quantity;
use std::fmt;

/// Base annotation key declaring a memory ceiling. The container-scoped
/// form appends `/<containerName>`.
pub const LIMIT_ANNOTATION: &str = "memguard.limit.memory";

/// Composite identity of one container within the cluster.
///
/// The tuple (namespace, pod, container) is injective, so identities are
/// unique within a cycle's index. Displayed as `namespace/pod/container`;
/// '/' cannot appear in any of the three names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerIdentity {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

impl ContainerIdentity {
    pub fn new(namespace: &str, pod: &str, container: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: container.to_string(),
        }
    }

    pub fn from_pod(meta: &PodMeta, container: &str) -> Self {
        Self::new(&meta.namespace, &meta.name, container)
    }
}

impl fmt::Display for ContainerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.pod, self.container)
    }
}

/// Resolve the effective memory ceiling for one container.
///
/// Returns `Ok(None)` when neither annotation key is present (the container
/// is unmonitored). A present but unparsable value is a `MalformedQuantity`
/// error scoped to this container.
pub fn resolve_limit(meta: &PodMeta, container: &str) -> Result<Option<u64>, GuardError> {
    let scoped = format!("{LIMIT_ANNOTATION}/{container}");
    for key in [scoped.as_str(), LIMIT_ANNOTATION] {
        if let Some(value) = meta.annotations.get(key) {
            return parse_quantity(value).map(Some);
        }
    }
    Ok(None)
}
