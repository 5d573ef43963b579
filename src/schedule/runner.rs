//! Cron job runner.
//!
//! Every job gets its own tokio task that sleeps until the next fire time,
//! runs the job to completion and repeats, so a job never overlaps itself.
//! Job errors and panics are logged and the loop keeps going.

use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::cron::CronSchedule;

/// A unit of scheduled work.
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    fn schedule(&self) -> &CronSchedule;

    async fn run(&self) -> anyhow::Result<()>;
}

/// How a single job run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed,
    Panicked,
}

/// Run a job once on its own task, containing errors and panics.
pub async fn run_job(job: &Arc<dyn Job>) -> RunOutcome {
    let task = {
        let job = Arc::clone(job);
        tokio::spawn(async move { job.run().await })
    };

    match task.await {
        Ok(Ok(())) => {
            info!(job = job.name(), "scheduled job completed");
            RunOutcome::Completed
        }
        Ok(Err(e)) => {
            error!(job = job.name(), error = %format!("{e:#}"), "scheduled job failed");
            RunOutcome::Failed
        }
        Err(e) if e.is_panic() => {
            error!(job = job.name(), "scheduled job panicked");
            RunOutcome::Panicked
        }
        Err(e) => {
            warn!(job = job.name(), error = %e, "scheduled job was cancelled");
            RunOutcome::Failed
        }
    }
}

pub struct Scheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown,
            handles: Vec::new(),
        }
    }

    pub fn add_job(&mut self, job: Arc<dyn Job>) {
        info!(job = job.name(), cron = %job.schedule(), "job registered");
        self.jobs.push(job);
    }

    pub fn jobs(&self) -> &[Arc<dyn Job>] {
        &self.jobs
    }

    /// Spawn one loop per registered job. Calling it twice has no effect.
    pub fn start(&mut self) {
        if !self.handles.is_empty() {
            return;
        }
        for job in &self.jobs {
            let job = Arc::clone(job);
            let shutdown = self.shutdown.subscribe();
            self.handles.push(tokio::spawn(job_loop(job, shutdown)));
        }
        info!(jobs = self.jobs.len(), "scheduler started");
    }

    /// Signal every loop to stop and wait for them. A run in progress finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for result in futures::future::join_all(self.handles).await {
            if let Err(e) = result {
                warn!(error = %e, "job loop ended abnormally");
            }
        }
        info!("scheduler stopped");
    }
}

async fn job_loop(job: Arc<dyn Job>, mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let now = Local::now();
        let Some(next) = job.schedule().next_after(&now) else {
            warn!(job = job.name(), cron = %job.schedule(), "no upcoming fire time, job loop exits");
            break;
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        debug!(job = job.name(), next = %next, "waiting for next run");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            changed = shutdown.changed() => {
                // Sender dropped or shutdown requested
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        run_job(&job).await;
    }
    debug!(job = job.name(), "job loop stopped");
}
