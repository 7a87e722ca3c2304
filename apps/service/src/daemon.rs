//! Daemon lifecycle: scheduler wiring, reload and termination signals.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use settings::Config;
use tracing::{debug, error, info, warn};

use crate::monitoring::CheckScheduler;

/// How long shutdown waits for in-flight check runs.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub struct Daemon {
    config_path: Option<PathBuf>,
    config: Config,
}

impl Daemon {
    pub fn new(config_path: Option<PathBuf>, config: Config) -> Self {
        Self { config_path, config }
    }

    /// Run until a termination signal arrives, then drain in-flight runs.
    pub async fn run(mut self) -> Result<()> {
        debug!("{}", self.config);
        if self.config.checks.is_empty() {
            warn!("no checks configured, the daemon will idle");
        }

        let mut scheduler = CheckScheduler::new();
        scheduler.schedule_all(&self.config.checks);
        info!(checks = self.config.checks.len(), "daemon started");

        self.wait_for_signals(&mut scheduler).await;

        info!("shutting down");
        scheduler.shutdown(SHUTDOWN_GRACE).await;
        Ok(())
    }

    /// Swap in a freshly loaded configuration snapshot. A config that fails
    /// to load or validate leaves the running snapshot untouched.
    fn reload(&mut self, scheduler: &mut CheckScheduler) {
        info!("reloading configuration");
        match Config::load(self.config_path.as_deref()) {
            Ok(config) => {
                scheduler.reload(&config.checks);
                self.config = config;
                info!(checks = self.config.checks.len(), "configuration reloaded");
            }
            Err(error) => {
                error!(%error, "reload failed, keeping the previous configuration");
            }
        }
    }

    #[cfg(unix)]
    async fn wait_for_signals(&mut self, scheduler: &mut CheckScheduler) {
        use tokio::signal::unix::{Signal, SignalKind, signal};

        async fn recv_or_pending(signal: Option<&mut Signal>) {
            match signal {
                Some(signal) => {
                    signal.recv().await;
                }
                None => std::future::pending().await,
            }
        }

        let mut terminate = signal(SignalKind::terminate()).ok();
        if terminate.is_none() {
            warn!("SIGTERM handler unavailable, relying on ctrl-c");
        }
        // Reload is best-effort: without SIGHUP support the daemon still
        // runs, it just cannot reload.
        let mut hangup = signal(SignalKind::hangup()).ok();
        if hangup.is_none() {
            warn!("SIGHUP handler unavailable, configuration reload disabled");
        }

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = recv_or_pending(terminate.as_mut()) => break,
                _ = recv_or_pending(hangup.as_mut()) => self.reload(scheduler),
            }
        }
    }

    #[cfg(not(unix))]
    async fn wait_for_signals(&mut self, _scheduler: &mut CheckScheduler) {
        // No SIGHUP on this platform; reload is unavailable.
        let _ = tokio::signal::ctrl_c().await;
    }
}
