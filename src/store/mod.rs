//! Configuration store - cleanup config, rule lists, schedules and the execution log.
//!
//! The [`ConfigStore`] trait is the seam a relational backend would plug into;
//! [`JsonStore`] keeps everything in one JSON document on disk.

pub mod json;
pub mod model;
pub mod seed;
mod table;

use async_trait::async_trait;

use crate::error::Result;

pub use json::JsonStore;
pub use model::*;
pub use seed::{seed_defaults, SeedReport};

/// Persistence contract for cleanup configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch a configuration row; `RecordNotFound`-style absence is reported as `NotConfigured`.
    async fn get_config(&self, name: &str) -> Result<CleanupConfig>;
    /// Apply a patch, creating the row when missing (projectPath and targetDirectory are then required).
    async fn update_config(&self, name: &str, patch: ConfigPatch) -> Result<CleanupConfig>;

    async fn list_patterns(&self, include_inactive: bool) -> Result<Vec<CleanupPattern>>;
    async fn create_pattern(&self, data: NewPattern) -> Result<CleanupPattern>;
    async fn update_pattern(&self, id: u64, patch: PatternPatch) -> Result<CleanupPattern>;
    async fn delete_pattern(&self, id: u64) -> Result<()>;

    async fn list_exclude_files(&self, include_inactive: bool) -> Result<Vec<CleanupExcludeFile>>;
    async fn create_exclude_file(&self, data: NewExcludeFile) -> Result<CleanupExcludeFile>;
    async fn update_exclude_file(&self, id: u64, patch: ExcludeFilePatch) -> Result<CleanupExcludeFile>;
    async fn delete_exclude_file(&self, id: u64) -> Result<()>;

    async fn list_exclude_dirs(&self, include_inactive: bool) -> Result<Vec<CleanupExcludeDirectory>>;
    async fn create_exclude_dir(&self, data: NewExcludeDirectory) -> Result<CleanupExcludeDirectory>;
    async fn update_exclude_dir(&self, id: u64, patch: ExcludeDirectoryPatch) -> Result<CleanupExcludeDirectory>;
    async fn delete_exclude_dir(&self, id: u64) -> Result<()>;

    async fn list_schedules(&self, include_inactive: bool) -> Result<Vec<CleanupSchedule>>;
    async fn create_schedule(&self, data: NewSchedule) -> Result<CleanupSchedule>;
    async fn update_schedule(&self, id: u64, patch: SchedulePatch) -> Result<CleanupSchedule>;
    async fn delete_schedule(&self, id: u64) -> Result<()>;

    async fn record_execution(&self, log: ExecutionLog) -> Result<()>;
    /// Matching log rows, newest first.
    async fn list_executions(&self, filter: ExecutionFilter) -> Result<Vec<ExecutionLog>>;
    /// Per-day aggregates for the last `days` days, newest first.
    async fn daily_stats(&self, days: u32) -> Result<Vec<DailyStats>>;
}
