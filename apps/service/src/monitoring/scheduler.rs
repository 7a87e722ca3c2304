use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use settings::Check;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::publisher;
use super::runner::CheckRunner;

/// Fixed offset between the first fires of consecutive jobs, so a restart
/// does not fire every check at the same instant.
const STAGGER: Duration = Duration::from_secs(2);

struct Job {
    check: Check,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
    /// Monotonic creation counter; a respawned job gets a new epoch while a
    /// job left untouched by a reload keeps its old one.
    epoch: u64,
}

/// Owns one periodic tokio task per configured check, keyed by check name.
///
/// Runs of a single check are serialized by its task: a slow run delays only
/// its own next fire. Different checks run on independent tasks and
/// interleave freely.
pub struct CheckScheduler {
    jobs: HashMap<String, Job>,
    next_epoch: u64,
}

impl CheckScheduler {
    pub fn new() -> Self {
        Self { jobs: HashMap::new(), next_epoch: 0 }
    }

    /// Register every check from a configuration snapshot.
    pub fn schedule_all(&mut self, checks: &[Check]) {
        for (index, check) in checks.iter().enumerate() {
            self.add(check.clone(), STAGGER * index as u32);
        }
    }

    /// Apply a fresh configuration snapshot: add new checks, stop removed
    /// ones and respawn those whose configuration changed. Jobs that match
    /// the new snapshot keep their schedule untouched.
    pub fn reload(&mut self, checks: &[Check]) {
        let keep: HashMap<&str, &Check> =
            checks.iter().map(|check| (check.name.as_str(), check)).collect();

        let removed: Vec<String> = self
            .jobs
            .keys()
            .filter(|name| !keep.contains_key(name.as_str()))
            .cloned()
            .collect();
        for name in removed {
            self.remove(&name);
        }

        for (index, check) in checks.iter().enumerate() {
            match self.jobs.get(&check.name) {
                Some(job) if job.check == *check => {}
                Some(_) => {
                    info!(id = %check.name, "check configuration changed, rescheduling");
                    self.remove(&check.name);
                    self.add(check.clone(), STAGGER * index as u32);
                }
                None => self.add(check.clone(), STAGGER * index as u32),
            }
        }
    }

    /// Stop all jobs and wait up to `grace` for in-flight runs to finish.
    pub async fn shutdown(mut self, grace: Duration) {
        info!("stopping scheduler");
        let mut handles = Vec::new();
        for (_, job) in self.jobs.drain() {
            let _ = job.stop.send(true);
            handles.push(job.handle);
        }
        if tokio::time::timeout(grace, join_all(handles)).await.is_err() {
            warn!("some checks were still running after the grace period");
        }
    }

    fn add(&mut self, check: Check, initial_delay: Duration) {
        let name = check.name.clone();
        let interval = check.interval;
        let (stop, mut stopped) = watch::channel(false);

        let job_check = check.clone();
        let handle = tokio::spawn(async move {
            let publisher = match publisher::for_check(&job_check.publisher) {
                Ok(publisher) => publisher,
                Err(error) => {
                    warn!(id = %job_check.name, %error, "cannot build publisher, job disabled");
                    return;
                }
            };

            let mut runner = CheckRunner::new(job_check.clone(), publisher);
            let mut timer = interval_at(
                Instant::now() + initial_delay,
                Duration::from_secs(job_check.interval),
            );
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        runner.run().await;
                    }
                    _ = stopped.changed() => {
                        debug!(id = %job_check.name, "job stopped");
                        break;
                    }
                }
            }
        });

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        info!(id = %name, interval, "scheduled check");
        self.jobs.insert(name, Job { check, stop, handle, epoch });
    }

    fn remove(&mut self, name: &str) {
        if let Some(job) = self.jobs.remove(name) {
            // The task sees the flag after its current run, so an in-flight
            // run is never cut short.
            let _ = job.stop.send(true);
            info!(id = %name, "unscheduled check");
        }
    }

    #[cfg(test)]
    fn job_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.keys().cloned().collect();
        names.sort();
        names
    }

    #[cfg(test)]
    fn epoch_of(&self, name: &str) -> Option<u64> {
        self.jobs.get(name).map(|job| job.epoch)
    }
}

impl Default for CheckScheduler {
    fn default() -> Self {
        Self::new()
    }
}
