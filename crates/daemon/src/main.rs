// SPDX-License-Identifier: MIT

//! `scan-daemon`: one binary, any subset of roles (§2). Wires the
//! durable store, priority queue, worker pool, and scan coordinator
//! together, then runs until told to shut down.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use scan_daemon::alert::{Alert, Alerter, DesktopAlerter, NullAlerter};
use scan_daemon::role::Role;
use scan_daemon::{config, health};
use scan_worker::WorkerPool;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "scan-daemon", version = config::VERSION)]
struct Cli {
    /// Which roles this process fulfils.
    #[arg(long, value_enum, default_value = "all")]
    role: Role,

    /// Disable desktop notifications even if this is role=all/worker.
    #[arg(long)]
    no_alerts: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = scan_daemon::logging::init(config::log_dir().as_deref());

    info!(version = config::VERSION, role = ?cli.role, "starting scan-daemon");

    let store = scan_daemon::build_store().await.context("connecting to store")?;
    let queue = scan_daemon::build_queue(store.clone());
    let agents = scan_daemon::build_agents();

    let alerter: Arc<dyn Alerter> =
        if cli.no_alerts { Arc::new(NullAlerter) } else { Arc::new(DesktopAlerter) };

    let pool = if cli.role.runs_workers() {
        let pool = WorkerPool::new("scan-worker", queue.clone(), config::worker_pool_config());
        let coordinator = Arc::new(scan_coordinator::ScanCoordinator::new(agents.clone()));
        pool.register_handler("scan", coordinator);
        pool.start();
        info!(num_workers = pool.workers().len(), "worker pool started");
        Some(pool)
    } else {
        None
    };

    let cleanup_interval = config::queue_cleanup_interval();
    let dead_letter_threshold = config::dead_letter_alert_threshold();
    let cleanup_queue = queue.clone();
    let cleanup_alerter = alerter.clone();
    let cleanup_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cleanup_interval);
        loop {
            ticker.tick().await;
            match cleanup_queue.cleanup().await {
                Ok(reclaimed) if reclaimed > 0 => info!(reclaimed, "cleanup pass reclaimed expired leases"),
                Ok(_) => {}
                Err(err) => error!(error = %err, "cleanup pass failed"),
            }
            match cleanup_queue.stats().await {
                Ok(stats) if stats.dead_letter > dead_letter_threshold => {
                    cleanup_alerter
                        .fire(Alert::DeadLetterThresholdExceeded {
                            queue: cleanup_queue.name().to_string(),
                            length: stats.dead_letter,
                            threshold: dead_letter_threshold,
                        })
                        .await;
                }
                Ok(_) => {}
                Err(err) => error!(error = %err, "stats check failed"),
            }
        }
    });

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutdown signal received, draining");

    cleanup_task.abort();
    if let Some(pool) = pool {
        if let Err(err) = pool.stop().await {
            error!(error = %err, "error draining worker pool");
        }
    }

    let report = health::check(&store, &queue, &agents).await;
    info!(healthy = report.is_healthy(), "final health snapshot before exit");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_default_role_as_all() {
        let cli = Cli::parse_from(["scan-daemon"]);
        assert_eq!(cli.role, Role::All);
        assert!(!cli.no_alerts);
    }

    #[test]
    fn cli_parses_explicit_role() {
        let cli = Cli::parse_from(["scan-daemon", "--role", "worker"]);
        assert_eq!(cli.role, Role::Worker);
    }

    #[test]
    fn cli_parses_no_alerts_flag() {
        let cli = Cli::parse_from(["scan-daemon", "--no-alerts"]);
        assert!(cli.no_alerts);
    }
}
