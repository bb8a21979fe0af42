//! The reconciliation engine
//!
//! One cycle: snapshot the pods that declare a memory ceiling, fetch live
//! usage, and delete the owning pod of any container over its ceiling that
//! passes the eviction gates. Cycles are stateless; everything here is
//! rebuilt from fresh cluster reads, and the only state that outlives a
//! cycle is the published metric values.

use crate::client::ClusterStateClient;
use crate::error::GuardError;
use crate::limits::{resolve_limit, ContainerIdentity};
use crate::models::{ControllerId, PodMeta};
use crate::observability::GuardMetrics;
use crate::policy::{Decision, DenyReason, EvictionPolicy};
use crate::quantity::parse_quantity;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A container with a declared ceiling, indexed for one cycle.
struct MonitoredContainer {
    meta: Arc<PodMeta>,
    limit_bytes: u64,
}

/// Counts from one reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Containers with a resolvable ceiling.
    pub monitored: usize,
    /// Containers observed over their ceiling.
    pub candidates: usize,
    /// Deletions issued (or, in dry-run, deletions that would have been).
    pub evicted: usize,
    /// Malformed quantities, missing controllers, failed status fetches and
    /// failed deletions; none of these abort the cycle.
    pub soft_errors: usize,
}

/// The orchestrating decision loop.
pub struct ReconciliationEngine {
    client: Arc<dyn ClusterStateClient>,
    policy: EvictionPolicy,
    metrics: Arc<GuardMetrics>,
    dry_run: bool,
}

impl ReconciliationEngine {
    pub fn new(client: Arc<dyn ClusterStateClient>, metrics: Arc<GuardMetrics>) -> Self {
        Self {
            policy: EvictionPolicy::new(client.clone()),
            client,
            metrics,
            dry_run: false,
        }
    }

    /// Evaluate policy and report, but never actually delete.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one full reconciliation cycle.
    ///
    /// A collaborator failure while listing pods or fetching the usage
    /// snapshot aborts the cycle; every later failure is scoped to the
    /// single candidate being processed.
    pub async fn run_cycle(&self) -> Result<CycleReport, GuardError> {
        let mut report = CycleReport::default();
        let monitored = self.build_monitored_index(&mut report).await?;
        report.monitored = monitored.len();

        let snapshot = self.client.fetch_usage_snapshot().await?;

        // Controllers that already had an eviction approved this cycle.
        // Created fresh per cycle and discarded with it.
        let mut used_controllers: HashSet<ControllerId> = HashSet::new();

        // Snapshot order is whatever the metrics source returned; it only
        // matters that no controller gets a second eviction.
        for sample in snapshot {
            let identity = ContainerIdentity::new(&sample.namespace, &sample.pod, &sample.container);
            // Every sample is parsed, monitored or not, so bad quantities
            // from the metrics source always surface.
            let usage = match parse_quantity(&sample.memory) {
                Ok(usage) => usage,
                Err(err) => {
                    warn!(container = %identity, error = %err, "Skipping unparsable usage sample");
                    report.soft_errors += 1;
                    continue;
                }
            };
            let Some(record) = monitored.get(&identity) else {
                continue;
            };
            if usage <= record.limit_bytes {
                continue;
            }

            report.candidates += 1;
            debug!(
                container = %identity,
                usage_bytes = usage,
                limit_bytes = record.limit_bytes,
                "Container exceeded its memory ceiling"
            );

            match self.policy.may_evict(&record.meta, &used_controllers).await {
                Decision::Approve(controller) => {
                    self.evict(&record.meta, &controller, &mut report).await;
                    used_controllers.insert(controller);
                }
                Decision::Deny(reason) => {
                    debug!(container = %identity, %reason, "Eviction denied");
                    // Missing or unreadable controllers are errors; the
                    // other denials are the policy working as intended.
                    if matches!(
                        reason,
                        DenyReason::NoController | DenyReason::StatusUnavailable
                    ) {
                        report.soft_errors += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Index every container that declares a ceiling, and publish the
    /// per-namespace monitored gauge.
    async fn build_monitored_index(
        &self,
        report: &mut CycleReport,
    ) -> Result<HashMap<ContainerIdentity, MonitoredContainer>, GuardError> {
        let pods = self.client.list_pods().await?;

        let mut index = HashMap::new();
        let mut per_namespace: HashMap<String, i64> = HashMap::new();
        for (meta, containers) in pods {
            let meta = Arc::new(meta);
            for container in containers {
                let limit_bytes = match resolve_limit(&meta, &container.name) {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => continue,
                    Err(err) => {
                        warn!(
                            namespace = %meta.namespace,
                            pod = %meta.name,
                            container = %container.name,
                            error = %err,
                            "Skipping container with malformed ceiling annotation"
                        );
                        report.soft_errors += 1;
                        continue;
                    }
                };
                let identity = ContainerIdentity::from_pod(&meta, &container.name);
                debug!(container = %identity, limit_bytes, "Found declared memory ceiling");
                *per_namespace.entry(meta.namespace.clone()).or_default() += 1;
                index.insert(
                    identity,
                    MonitoredContainer {
                        meta: meta.clone(),
                        limit_bytes,
                    },
                );
            }
        }

        self.metrics.reset_monitored();
        for (namespace, count) in &per_namespace {
            self.metrics.set_monitored(namespace, *count);
        }
        Ok(index)
    }

    /// Issue (or, in dry-run, log) the deletion for an approved candidate.
    async fn evict(&self, meta: &PodMeta, controller: &ControllerId, report: &mut CycleReport) {
        if self.dry_run {
            info!(
                namespace = %meta.namespace,
                pod = %meta.name,
                %controller,
                "Dry run: pod would be deleted"
            );
            report.evicted += 1;
            return;
        }
        match self.client.delete_pod(&meta.name, &meta.namespace).await {
            Ok(()) => {
                info!(
                    namespace = %meta.namespace,
                    pod = %meta.name,
                    %controller,
                    "Deleted pod over its memory ceiling"
                );
                self.metrics
                    .inc_deleted(&meta.namespace, &controller.owner_label());
                report.evicted += 1;
            }
            Err(err) => {
                warn!(
                    namespace = %meta.namespace,
                    pod = %meta.name,
                    error = %err,
                    "Failed to delete pod"
                );
                report.soft_errors += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::async_trait;
    use crate::limits::LIMIT_ANNOTATION;
    use crate::models::{ControllerKind, ControllerStatus, OwnerRef, PodContainer, UsageSample};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Mock cluster: canned pods, usage samples and controller statuses,
    /// with a log of issued deletions.
    #[derive(Default)]
    struct MockCluster {
        pods: Vec<(PodMeta, Vec<PodContainer>)>,
        usage: Vec<UsageSample>,
        statuses: HashMap<(String, String), ControllerStatus>,
        deleted: Mutex<Vec<String>>,
        fail_list: bool,
        fail_snapshot: bool,
        fail_delete: bool,
    }

    /// A transient API failure as the kube client would surface it.
    fn api_failure() -> GuardError {
        GuardError::Collaborator(kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".into(),
            message: "transient API error".into(),
            reason: "InternalError".into(),
            code: 500,
        }))
    }

    #[async_trait]
    impl ClusterStateClient for MockCluster {
        async fn list_pods(&self) -> Result<Vec<(PodMeta, Vec<PodContainer>)>, GuardError> {
            if self.fail_list {
                return Err(api_failure());
            }
            Ok(self.pods.clone())
        }

        async fn fetch_usage_snapshot(&self) -> Result<Vec<UsageSample>, GuardError> {
            if self.fail_snapshot {
                return Err(api_failure());
            }
            Ok(self.usage.clone())
        }

        async fn fetch_controller_status(
            &self,
            kind: ControllerKind,
            name: &str,
            namespace: &str,
        ) -> Result<Option<ControllerStatus>, GuardError> {
            if kind == ControllerKind::Unsupported {
                return Ok(None);
            }
            Ok(self
                .statuses
                .get(&(namespace.to_string(), name.to_string()))
                .copied())
        }

        async fn delete_pod(&self, name: &str, namespace: &str) -> Result<(), GuardError> {
            if self.fail_delete {
                return Err(GuardError::ControllerMissing {
                    kind: "Pod".into(),
                    name: name.into(),
                    namespace: namespace.into(),
                });
            }
            self.deleted
                .lock()
                .unwrap()
                .push(format!("{namespace}/{name}"));
            Ok(())
        }
    }

    fn pod(
        namespace: &str,
        name: &str,
        containers: &[&str],
        annotations: &[(&str, &str)],
        owner: Option<(&str, &str)>,
    ) -> (PodMeta, Vec<PodContainer>) {
        let meta = PodMeta {
            namespace: namespace.into(),
            name: name.into(),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            owner_references: owner
                .map(|(kind, owner_name)| {
                    vec![OwnerRef {
                        kind: kind.into(),
                        name: owner_name.into(),
                        is_controller: true,
                    }]
                })
                .unwrap_or_default(),
        };
        let containers = containers
            .iter()
            .map(|c| PodContainer {
                name: c.to_string(),
            })
            .collect();
        (meta, containers)
    }

    fn sample(namespace: &str, pod: &str, container: &str, memory: &str) -> UsageSample {
        UsageSample {
            namespace: namespace.into(),
            pod: pod.into(),
            container: container.into(),
            memory: memory.into(),
        }
    }

    fn ready_status(desired: i32, ready: i32) -> ControllerStatus {
        ControllerStatus {
            desired_replicas: Some(desired),
            ready_replicas: Some(ready),
        }
    }

    fn engine(cluster: Arc<MockCluster>) -> (ReconciliationEngine, Arc<GuardMetrics>) {
        let metrics = Arc::new(GuardMetrics::new().unwrap());
        (
            ReconciliationEngine::new(cluster, metrics.clone()),
            metrics,
        )
    }

    #[tokio::test]
    async fn end_to_end_eviction_over_ceiling() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[("memguard.limit.memory/web", "100Mi")],
                Some(("Deployment", "app")),
            )],
            usage: vec![sample("ns", "app-1", "web", "150Mi")],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            ..Default::default()
        });
        let (engine, metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.monitored, 1);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.evicted, 1);
        assert_eq!(report.soft_errors, 0);
        assert_eq!(*cluster.deleted.lock().unwrap(), vec!["ns/app-1"]);
        assert_eq!(metrics.deleted_total("ns", "Deployment/app"), 1);
    }

    #[tokio::test]
    async fn usage_at_or_below_ceiling_is_idempotent() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[(LIMIT_ANNOTATION, "100Mi")],
                Some(("Deployment", "app")),
            )],
            usage: vec![sample("ns", "app-1", "web", "100Mi")],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        for _ in 0..2 {
            let report = engine.run_cycle().await.unwrap();
            assert_eq!(report.monitored, 1);
            assert_eq!(report.candidates, 0);
            assert_eq!(report.evicted, 0);
        }
        assert!(cluster.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn at_most_one_eviction_per_controller_per_cycle() {
        let cluster = Arc::new(MockCluster {
            pods: vec![
                pod(
                    "ns",
                    "app-1",
                    &["web"],
                    &[(LIMIT_ANNOTATION, "100Mi")],
                    Some(("Deployment", "app")),
                ),
                pod(
                    "ns",
                    "app-2",
                    &["web"],
                    &[(LIMIT_ANNOTATION, "100Mi")],
                    Some(("Deployment", "app")),
                ),
            ],
            usage: vec![
                sample("ns", "app-1", "web", "200Mi"),
                sample("ns", "app-2", "web", "200Mi"),
            ],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(2, 2))]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.candidates, 2);
        assert_eq!(report.evicted, 1);
        assert_eq!(cluster.deleted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn distinct_controllers_may_each_lose_one_pod() {
        let cluster = Arc::new(MockCluster {
            pods: vec![
                pod(
                    "ns",
                    "a-1",
                    &["web"],
                    &[(LIMIT_ANNOTATION, "100Mi")],
                    Some(("Deployment", "a")),
                ),
                pod(
                    "ns",
                    "b-1",
                    &["web"],
                    &[(LIMIT_ANNOTATION, "100Mi")],
                    Some(("StatefulSet", "b")),
                ),
            ],
            usage: vec![
                sample("ns", "a-1", "web", "200Mi"),
                sample("ns", "b-1", "web", "200Mi"),
            ],
            statuses: HashMap::from([
                (("ns".into(), "a".into()), ready_status(1, 1)),
                (("ns".into(), "b".into()), ready_status(1, 1)),
            ]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.evicted, 2);
        assert_eq!(cluster.deleted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unready_siblings_block_eviction() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[(LIMIT_ANNOTATION, "100Mi")],
                Some(("Deployment", "app")),
            )],
            usage: vec![sample("ns", "app-1", "web", "200Mi")],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(3, 2))]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.evicted, 0);
        assert!(cluster.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unannotated_containers_are_never_candidates() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[],
                Some(("Deployment", "app")),
            )],
            usage: vec![sample("ns", "app-1", "web", "10Gi")],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.monitored, 0);
        assert_eq!(report.candidates, 0);
        assert!(cluster.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn container_scoped_ceiling_overrides_pod_wide() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web", "sidecar"],
                &[
                    (LIMIT_ANNOTATION, "1Gi"),
                    ("memguard.limit.memory/web", "100Mi"),
                ],
                Some(("Deployment", "app")),
            )],
            // web is over its scoped 100Mi ceiling; sidecar is under the
            // pod-wide 1Gi one.
            usage: vec![
                sample("ns", "app-1", "web", "150Mi"),
                sample("ns", "app-1", "sidecar", "500Mi"),
            ],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.monitored, 2);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.evicted, 1);
    }

    #[tokio::test]
    async fn malformed_usage_sample_is_a_soft_error() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[(LIMIT_ANNOTATION, "100Mi")],
                Some(("Deployment", "app")),
            )],
            usage: vec![sample("ns", "app-1", "web", "not-a-quantity")],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.candidates, 0);
        assert_eq!(report.soft_errors, 1);
        assert!(cluster.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_ceiling_annotation_excludes_the_container() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[(LIMIT_ANNOTATION, "100XB")],
                Some(("Deployment", "app")),
            )],
            usage: vec![sample("ns", "app-1", "web", "10Gi")],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.monitored, 0);
        assert_eq!(report.soft_errors, 1);
        assert!(cluster.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_deletion_is_a_soft_error_and_cycle_continues() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[(LIMIT_ANNOTATION, "100Mi")],
                Some(("Deployment", "app")),
            )],
            usage: vec![sample("ns", "app-1", "web", "200Mi")],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            fail_delete: true,
            ..Default::default()
        });
        let (engine, metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.evicted, 0);
        assert_eq!(report.soft_errors, 1);
        assert_eq!(metrics.deleted_total("ns", "Deployment/app"), 0);
    }

    #[tokio::test]
    async fn dry_run_reports_but_does_not_delete() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[(LIMIT_ANNOTATION, "100Mi")],
                Some(("Deployment", "app")),
            )],
            usage: vec![sample("ns", "app-1", "web", "200Mi")],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            ..Default::default()
        });
        let metrics = Arc::new(GuardMetrics::new().unwrap());
        let engine = ReconciliationEngine::new(cluster.clone(), metrics.clone()).dry_run(true);

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.evicted, 1);
        assert!(cluster.deleted.lock().unwrap().is_empty());
        assert_eq!(metrics.deleted_total("ns", "Deployment/app"), 0);
    }

    #[tokio::test]
    async fn list_failure_aborts_the_cycle() {
        let cluster = Arc::new(MockCluster {
            fail_list: true,
            ..Default::default()
        });
        let (engine, metrics) = engine(cluster.clone());

        let err = engine.run_cycle().await.unwrap_err();
        assert!(matches!(err, GuardError::Collaborator(_)));
        assert!(cluster.deleted.lock().unwrap().is_empty());

        // The scheduling wrapper counts the aborted cycle.
        metrics.inc_cycle_errors();
        let families = metrics.registry().gather();
        let counter = families
            .iter()
            .find(|f| f.get_name() == "memguard_cycle_errors_total")
            .unwrap();
        assert_eq!(counter.get_metric()[0].get_counter().get_value() as u64, 1);
    }

    #[tokio::test]
    async fn snapshot_failure_aborts_the_cycle_before_any_eviction() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[(LIMIT_ANNOTATION, "100Mi")],
                Some(("Deployment", "app")),
            )],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            fail_snapshot: true,
            ..Default::default()
        });
        let (engine, metrics) = engine(cluster.clone());

        let err = engine.run_cycle().await.unwrap_err();
        assert!(matches!(err, GuardError::Collaborator(_)));
        assert!(cluster.deleted.lock().unwrap().is_empty());
        assert_eq!(metrics.deleted_total("ns", "Deployment/app"), 0);
    }

    #[tokio::test]
    async fn malformed_sample_on_unmonitored_container_is_still_counted() {
        let cluster = Arc::new(MockCluster {
            usage: vec![sample("ns", "stranger", "web", "not-a-quantity")],
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.monitored, 0);
        assert_eq!(report.candidates, 0);
        assert_eq!(report.soft_errors, 1);
    }

    #[tokio::test]
    async fn pod_without_controller_is_skipped_as_soft_error() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "orphan",
                &["web"],
                &[(LIMIT_ANNOTATION, "100Mi")],
                None,
            )],
            usage: vec![sample("ns", "orphan", "web", "200Mi")],
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.evicted, 0);
        assert_eq!(report.soft_errors, 1);
    }

    #[tokio::test]
    async fn samples_without_a_monitored_match_are_ignored() {
        let cluster = Arc::new(MockCluster {
            pods: vec![pod(
                "ns",
                "app-1",
                &["web"],
                &[(LIMIT_ANNOTATION, "100Mi")],
                Some(("Deployment", "app")),
            )],
            usage: vec![
                sample("other-ns", "app-1", "web", "10Gi"),
                sample("ns", "app-1", "logger", "10Gi"),
            ],
            statuses: HashMap::from([(("ns".into(), "app".into()), ready_status(1, 1))]),
            ..Default::default()
        });
        let (engine, _metrics) = engine(cluster.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.monitored, 1);
        assert_eq!(report.candidates, 0);
        assert!(cluster.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn monitored_gauge_tracks_namespaces() {
        let cluster = Arc::new(MockCluster {
            pods: vec![
                pod("a", "p1", &["web"], &[(LIMIT_ANNOTATION, "1Gi")], None),
                pod("a", "p2", &["web"], &[(LIMIT_ANNOTATION, "1Gi")], None),
                pod("b", "p3", &["web"], &[(LIMIT_ANNOTATION, "1Gi")], None),
            ],
            ..Default::default()
        });
        let (engine, metrics) = engine(cluster);

        engine.run_cycle().await.unwrap();

        let families = metrics.registry().gather();
        let gauge = families
            .iter()
            .find(|f| f.get_name() == "memguard_config_limits")
            .unwrap();
        let mut counts: Vec<(String, i64)> = gauge
            .get_metric()
            .iter()
            .map(|m| {
                (
                    m.get_label()[0].get_value().to_string(),
                    m.get_gauge().get_value() as i64,
                )
            })
            .collect();
        counts.sort();
        assert_eq!(counts, vec![("a".to_string(), 2), ("b".to_string(), 1)]);
    }
}
