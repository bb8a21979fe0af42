//! Error taxonomy for the guardian

use thiserror::Error;

/// Errors raised while resolving ceilings, gating evictions, or talking to
/// the cluster.
///
/// Quantity and controller errors are scoped to a single container or
/// candidate and are downgraded to soft errors by the engine. A
/// `Collaborator` failure while listing pods or fetching the usage snapshot
/// aborts the whole cycle.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A quantity string (ceiling annotation or usage sample) could not be
    /// parsed into a byte count.
    #[error("malformed quantity {text:?}: {reason}")]
    MalformedQuantity { text: String, reason: String },

    /// The owning controller kind has no status endpoint we know how to read.
    #[error("controller kind {kind:?} has no status endpoint")]
    ControllerUnsupported { kind: String },

    /// The owning controller object no longer exists.
    #[error("controller {kind}/{name} not found in namespace {namespace}")]
    ControllerMissing {
        kind: String,
        name: String,
        namespace: String,
    },

    /// A call to the Kubernetes API failed.
    #[error("cluster API call failed: {0}")]
    Collaborator(#[from] kube::Error),
}

impl GuardError {
    pub(crate) fn malformed(text: &str, reason: impl Into<String>) -> Self {
        Self::MalformedQuantity {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}
