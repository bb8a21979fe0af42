//! memguard - soft memory ceilings for Kubernetes pods
//!
//! Watches containers whose pods declare a memory ceiling through
//! annotations and deletes the owning pod when live usage exceeds it,
//! letting the controller recreate the pod before the node gets into
//! OOM trouble.

use anyhow::Result;
use clap::Parser;
use memguard_lib::{GuardMetrics, KubeClusterClient, ReconciliationEngine};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;

/// Memory Guardian for Kubernetes pods
#[derive(Parser)]
#[command(name = "memguard")]
#[command(author, version, about = "Soft memory ceilings for Kubernetes pods", long_about = None)]
struct Cli {
    /// Path to kubeconfig file (in-cluster configuration if not set)
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Run forever instead of a single reconciliation cycle
    #[arg(short, long)]
    daemon: bool,

    /// Seconds to wait between cycles in daemon mode
    #[arg(long, env = "MEMGUARD_DELAY", default_value_t = 10.0)]
    delay: f64,

    /// Prometheus exporter port
    #[arg(long, env = "MEMGUARD_PROMETHEUS_PORT", default_value_t = 8000)]
    prometheus_port: u16,

    /// Disable the Prometheus exporter
    #[arg(long, env = "MEMGUARD_PROMETHEUS_DISABLE")]
    prometheus_disable: bool,

    /// Evaluate eviction policy but do not delete pods
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(dry_run = cli.dry_run, "Starting memguard");

    let metrics = Arc::new(GuardMetrics::new()?);

    // Client construction happens before the first cycle; failure here is
    // fatal to the process.
    let client = Arc::new(KubeClusterClient::connect(cli.kubeconfig.as_deref()).await?);
    let engine = ReconciliationEngine::new(client, metrics.clone()).dry_run(cli.dry_run);

    if !cli.prometheus_disable {
        let state = Arc::new(api::AppState::new(metrics.clone()));
        tokio::spawn(api::serve(cli.prometheus_port, state));
    }

    let delay = Duration::from_secs_f64(cli.delay);
    loop {
        debug!("Running reconciliation cycle");
        let start = Instant::now();
        match engine.run_cycle().await {
            Ok(report) => info!(
                monitored = report.monitored,
                candidates = report.candidates,
                evicted = report.evicted,
                soft_errors = report.soft_errors,
                "Reconciliation cycle complete"
            ),
            Err(err) => {
                metrics.inc_cycle_errors();
                error!(error = %err, "Reconciliation cycle failed");
            }
        }
        metrics.observe_cycle(start.elapsed().as_secs_f64());

        if !cli.daemon {
            break;
        }
        debug!(delay_secs = cli.delay, "Sleeping until next cycle");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT received, shutting down");
                break;
            }
        }
    }

    Ok(())
}
