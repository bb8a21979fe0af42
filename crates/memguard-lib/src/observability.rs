//! Prometheus metrics for the guardian
//!
//! Metrics hang off an explicit [`prometheus::Registry`] owned by the
//! process, not the default global registry, so independent engines (and
//! tests) never collide on registration.

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
};

/// Cycle-duration histogram buckets (in seconds).
const CYCLE_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Handle to the guardian's metrics, shared between the engine and the
/// exposition endpoint.
pub struct GuardMetrics {
    registry: Registry,
    config_limits: IntGaugeVec,
    deleted_pods: IntCounterVec,
    cycle_seconds: Histogram,
    cycle_errors: IntCounter,
}

impl GuardMetrics {
    /// Build the metric set on a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Build the metric set on a caller-supplied registry.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let config_limits = IntGaugeVec::new(
            Opts::new(
                "memguard_config_limits",
                "Containers with a declared memory ceiling, by namespace",
            ),
            &["namespace"],
        )?;
        registry.register(Box::new(config_limits.clone()))?;

        let deleted_pods = IntCounterVec::new(
            Opts::new(
                "memguard_deleted_pod_total",
                "Total pods deleted since start, by namespace and owning controller",
            ),
            &["namespace", "owner"],
        )?;
        registry.register(Box::new(deleted_pods.clone()))?;

        let cycle_seconds = Histogram::with_opts(
            HistogramOpts::new("memguard_cycle_seconds", "Reconciliation cycle duration")
                .buckets(CYCLE_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(cycle_seconds.clone()))?;

        let cycle_errors = IntCounter::new(
            "memguard_cycle_errors_total",
            "Reconciliation cycles aborted by an error",
        )?;
        registry.register(Box::new(cycle_errors.clone()))?;

        Ok(Self {
            registry,
            config_limits,
            deleted_pods,
            cycle_seconds,
            cycle_errors,
        })
    }

    /// Registry backing these metrics, for the exposition endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Drop all per-namespace monitored counts before a cycle recomputes
    /// them, so namespaces that lost their annotations disappear.
    pub fn reset_monitored(&self) {
        self.config_limits.reset();
    }

    /// Set the monitored-container count for one namespace.
    pub fn set_monitored(&self, namespace: &str, count: i64) {
        self.config_limits.with_label_values(&[namespace]).set(count);
    }

    /// Count one deleted pod.
    pub fn inc_deleted(&self, namespace: &str, owner: &str) {
        self.deleted_pods.with_label_values(&[namespace, owner]).inc();
    }

    /// Current value of the deletion counter for one namespace and owner.
    pub fn deleted_total(&self, namespace: &str, owner: &str) -> u64 {
        self.deleted_pods.with_label_values(&[namespace, owner]).get()
    }

    /// Record one cycle's wall-clock duration.
    pub fn observe_cycle(&self, seconds: f64) {
        self.cycle_seconds.observe(seconds);
    }

    /// Count one failed cycle.
    pub fn inc_cycle_errors(&self) {
        self.cycle_errors.inc();
    }
}
