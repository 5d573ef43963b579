//! Cron scheduling: expression parser, job runner and the built-in jobs.

pub mod cron;
pub mod jobs;
pub mod runner;

pub use cron::CronSchedule;
pub use jobs::{
    collect_storage_stats, register_jobs, CleanupExecutionJob, OrphanCleanup, OrphanCleanupJob, OrphanReport,
    ReferenceIndex, StorageStats, StorageStatsJob, UsageBucket, SCHEDULED_USER,
};
pub use runner::{run_job, Job, RunOutcome, Scheduler};
