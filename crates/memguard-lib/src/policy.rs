//! Eviction gating
//!
//! Deleting a pod is only safe when its controller can absorb the loss:
//! every sibling replica must be ready, and a controller gets at most one
//! eviction per cycle. The policy is deliberately conservative; a denied
//! candidate is simply reconsidered on a later cycle.

use crate::client::ClusterStateClient;
use crate::models::{ControllerId, ControllerKind, PodMeta};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stand-in for an absent desired-replica count. With ready defaulting to 0,
/// an absent desired count blocks eviction unless the controller reports an
/// equally absurd ready count.
pub const EXPECTED_REPLICAS_SENTINEL: i32 = i32::MAX;

/// Outcome of a policy check for one eviction candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Eviction may proceed; the caller must record the controller as used
    /// this cycle and issue the deletion.
    Approve(ControllerId),
    Deny(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The pod has no owning controller, so nothing would recreate it.
    NoController,
    /// The controller already had a pod evicted this cycle.
    ControllerAlreadyUsed,
    /// Controller status could not be fetched (unsupported kind, vanished
    /// object, or transport failure).
    StatusUnavailable,
    /// Not all sibling replicas are ready.
    UnreadySiblings { ready: i32, expected: i32 },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoController => write!(f, "no-controller"),
            DenyReason::ControllerAlreadyUsed => {
                write!(f, "controller-already-used-this-cycle")
            }
            DenyReason::StatusUnavailable => write!(f, "status-unavailable"),
            DenyReason::UnreadySiblings { ready, expected } => {
                write!(f, "unready-siblings ({ready}/{expected} ready)")
            }
        }
    }
}

/// Gate deciding whether a candidate eviction may proceed this cycle.
pub struct EvictionPolicy {
    client: Arc<dyn ClusterStateClient>,
}

impl EvictionPolicy {
    pub fn new(client: Arc<dyn ClusterStateClient>) -> Self {
        Self { client }
    }

    /// Check one candidate against the availability gates.
    ///
    /// `used_controllers` is the cycle-scoped set of controllers that have
    /// already had an eviction approved.
    pub async fn may_evict(
        &self,
        meta: &PodMeta,
        used_controllers: &HashSet<ControllerId>,
    ) -> Decision {
        let Some(owner) = meta.controller() else {
            debug!(
                namespace = %meta.namespace,
                pod = %meta.name,
                "Pod has no owning controller, cannot be evicted"
            );
            return Decision::Deny(DenyReason::NoController);
        };
        let controller = ControllerId::new(owner, &meta.namespace);
        if used_controllers.contains(&controller) {
            debug!(
                %controller,
                namespace = %meta.namespace,
                pod = %meta.name,
                "Controller already had a pod evicted this cycle"
            );
            return Decision::Deny(DenyReason::ControllerAlreadyUsed);
        }

        let kind = ControllerKind::from_kind(&owner.kind);
        let status = match self
            .client
            .fetch_controller_status(kind, &owner.name, &meta.namespace)
            .await
        {
            Ok(Some(status)) => status,
            Ok(None) => {
                debug!(%controller, "No status available for controller kind");
                return Decision::Deny(DenyReason::StatusUnavailable);
            }
            Err(err) => {
                warn!(%controller, error = %err, "Failed to fetch controller status");
                return Decision::Deny(DenyReason::StatusUnavailable);
            }
        };

        let ready = status.ready_replicas.unwrap_or(0);
        let expected = status.desired_replicas.unwrap_or(EXPECTED_REPLICAS_SENTINEL);
        if ready < expected {
            warn!(
                %controller,
                ready,
                expected,
                "Controller may have unready siblings, pod will not be deleted"
            );
            return Decision::Deny(DenyReason::UnreadySiblings { ready, expected });
        }

        Decision::Approve(controller)
    }
}
