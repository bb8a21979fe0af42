//! Core data models for the guardian

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pod metadata as captured at the start of a cycle. Immutable for the
/// lifetime of that cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodMeta {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerRef>,
}

impl PodMeta {
    /// The owner reference flagged as the managing controller, if any.
    pub fn controller(&self) -> Option<&OwnerRef> {
        self.owner_references.iter().find(|o| o.is_controller)
    }
}

/// A single owner reference from pod metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub is_controller: bool,
}

/// A container declared in a pod spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodContainer {
    pub name: String,
}

/// Controller kinds we can read replica status from.
///
/// Kind dispatch is a closed enum rather than a string-keyed table of
/// accessors; anything else maps to `Unsupported` and never yields status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    Deployment,
    StatefulSet,
    ReplicaSet,
    ReplicationController,
    Unsupported,
}

impl ControllerKind {
    /// Map an owner-reference kind string, case-insensitively.
    pub fn from_kind(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "deployment" => ControllerKind::Deployment,
            "statefulset" => ControllerKind::StatefulSet,
            "replicaset" => ControllerKind::ReplicaSet,
            "replicationcontroller" => ControllerKind::ReplicationController,
            _ => ControllerKind::Unsupported,
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerKind::Deployment => write!(f, "Deployment"),
            ControllerKind::StatefulSet => write!(f, "StatefulSet"),
            ControllerKind::ReplicaSet => write!(f, "ReplicaSet"),
            ControllerKind::ReplicationController => write!(f, "ReplicationController"),
            ControllerKind::Unsupported => write!(f, "Unsupported"),
        }
    }
}

/// Identity of a pod's owning controller, scoped to a namespace.
///
/// Used as the dedup key that caps evictions at one per controller per
/// cycle, and as the owner label on the deletion counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerId {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl ControllerId {
    pub fn new(owner: &OwnerRef, namespace: &str) -> Self {
        Self {
            kind: owner.kind.clone(),
            name: owner.name.clone(),
            namespace: namespace.to_string(),
        }
    }

    /// "kind/name" form used for logs and metric labels.
    pub fn owner_label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Replica status of a controller, fetched on demand.
///
/// Both fields mirror the optionality of the API: a freshly created
/// controller may report neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub desired_replicas: Option<i32>,
    pub ready_replicas: Option<i32>,
}

/// One memory-usage reading for one container, as reported by the metrics
/// source. The quantity stays a string until the engine parses it so a
/// malformed sample can be skipped without touching its neighbors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSample {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub memory: String,
}
