//! Memory guardian library
//!
//! This crate provides the core functionality for:
//! - Resource-quantity parsing
//! - Ceiling resolution from pod annotations
//! - The per-cycle reconciliation engine
//! - Eviction gating against controller readiness
//! - Cluster access (trait plus the Kubernetes implementation)
//! - Prometheus observability

pub mod client;
pub mod engine;
pub mod error;
pub mod kube_client;
pub mod limits;
pub mod models;
pub mod observability;
pub mod policy;
pub mod quantity;

pub use client::ClusterStateClient;
pub use engine::{CycleReport, ReconciliationEngine};
pub use error::GuardError;
pub use kube_client::KubeClusterClient;
pub use limits::{resolve_limit, ContainerIdentity, LIMIT_ANNOTATION};
pub use models::*;
pub use observability::GuardMetrics;
pub use policy::{Decision, DenyReason, EvictionPolicy};
pub use quantity::parse_quantity;
