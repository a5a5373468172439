//! Daemon Infrastructure - drives the repository monitor on a fixed schedule
//!
//! Each tick is awaited to completion before the next interval is considered,
//! so ticks never overlap. Ctrl+C stops the loop between ticks.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::bot::build_monitor;
use crate::monitor::{MonitorSummary, RepositoryMonitor};
use crate::Config;

/// Scheduled monitor runner
pub struct Daemon {
    monitor: RepositoryMonitor,
    interval: Duration,
    shutdown_sender: broadcast::Sender<()>,
}

impl Daemon {
    /// Create a daemon that talks to the GitHub API described by `config`
    pub fn new(config: &Config) -> Result<Self> {
        let interval = config.interval()?;
        let monitor = build_monitor(config).context("Failed to create repository monitor")?;
        Ok(Self::with_monitor(monitor, interval))
    }

    pub fn with_monitor(monitor: RepositoryMonitor, interval: Duration) -> Self {
        let (shutdown_sender, _) = broadcast::channel(1);
        Self {
            monitor,
            interval,
            shutdown_sender,
        }
    }

    /// Handle that stops the loop when sent to
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_sender.clone()
    }

    /// Run a single tick
    pub async fn run_once(&self) -> MonitorSummary {
        let summary = self.monitor.monitor().await;
        log_tick(&summary);
        summary
    }

    /// Run ticks until Ctrl+C is received
    pub async fn run(&self) -> Result<()> {
        info!("Starting issue bot with interval: {:?}", self.interval);

        let shutdown_sender = self.shutdown_sender.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            info!("Shutdown signal received, stopping...");
            let _ = shutdown_sender.send(());
        });

        self.run_until_shutdown(self.shutdown_sender.subscribe()).await
    }

    async fn run_until_shutdown(&self, mut shutdown_receiver: broadcast::Receiver<()>) -> Result<()> {
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                _ = shutdown_receiver.recv() => {
                    info!("Shutdown signal received in monitor loop");
                    break;
                }

                _ = timer.tick() => {
                    ticks += 1;
                    debug!("Starting tick {}", ticks);
                    self.run_once().await;
                }
            }
        }

        info!("Monitor loop exiting after {} ticks", ticks);
        Ok(())
    }
}

/// Wait for Ctrl+C; never resolves if the signal cannot be listened for
async fn wait_for_shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    debug!("Ctrl+C received");
}

fn log_tick(summary: &MonitorSummary) {
    if summary.repositories == 0 {
        return;
    }
    let message = format!(
        "Tick completed in {:.2}s: {} repositories, {} handler runs, {} failed",
        summary.duration.as_secs_f64(),
        summary.repositories,
        summary.handlers_run,
        summary.handler_failures
    );
    if summary.is_clean() {
        info!("{}", message);
    } else {
        warn!("{}", message);
    }
}
