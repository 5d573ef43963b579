//! Persisted record types for the cleanup configuration store.
//!
//! Every row set carries an `is_active` soft-delete flag. Patches use
//! `Option` fields: `None` leaves the stored value alone.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

use crate::cleanup::{ExclusionRules, PatternRule};
use crate::error::{CleanupError, Result};
use crate::schedule::CronSchedule;

/// Name of the configuration row used when none is given.
pub const DEFAULT_CONFIG_NAME: &str = "default";

/// Session folder template. Tokens: {YYYY} {MM} {DD} {HH} {mm} {ss}.
pub const DEFAULT_DIRECTORY_FORMAT: &str = "CLEANUP-{YYYY}-{MM}-{DD}-{HH}-{mm}-{ss}";

pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Main cleanup configuration, one row per name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupConfig {
    pub name: String,
    /// Root of the source tree to scan.
    pub project_path: PathBuf,
    /// Where sessions are written. Relative values resolve against
    /// `base_path`, or `project_path` when no base is set.
    pub target_directory: PathBuf,
    pub base_path: Option<PathBuf>,
    pub directory_format: String,
    /// Walk depth limit; the root's direct children are depth 0.
    pub max_depth: Option<usize>,
    pub create_readme: bool,
    pub preserve_structure: bool,
    pub retention_days: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CleanupConfig {
    pub fn new(name: impl Into<String>, project_path: impl Into<PathBuf>, target_directory: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            project_path: project_path.into(),
            target_directory: target_directory.into(),
            base_path: None,
            directory_format: DEFAULT_DIRECTORY_FORMAT.to_string(),
            max_depth: None,
            create_readme: true,
            preserve_structure: true,
            retention_days: DEFAULT_RETENTION_DAYS,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the fields that would make a walk meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.project_path.as_os_str().is_empty() {
            return Err(CleanupError::InvalidConfig {
                field: "projectPath".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.target_directory.as_os_str().is_empty() {
            return Err(CleanupError::InvalidConfig {
                field: "targetDirectory".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.directory_format.trim().is_empty() || self.directory_format.contains('/') {
            return Err(CleanupError::InvalidConfig {
                field: "directoryFormat".into(),
                reason: "must be a single non-empty folder name".into(),
            });
        }
        Ok(())
    }
}

/// Partial update for [`CleanupConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub project_path: Option<PathBuf>,
    pub target_directory: Option<PathBuf>,
    /// `Some(None)` clears the base path.
    pub base_path: Option<Option<PathBuf>>,
    pub directory_format: Option<String>,
    pub max_depth: Option<Option<usize>>,
    pub create_readme: Option<bool>,
    pub preserve_structure: Option<bool>,
    pub retention_days: Option<u32>,
    pub is_active: Option<bool>,
}

impl ConfigPatch {
    pub fn apply(self, config: &mut CleanupConfig) {
        if let Some(v) = self.project_path {
            config.project_path = v;
        }
        if let Some(v) = self.target_directory {
            config.target_directory = v;
        }
        if let Some(v) = self.base_path {
            config.base_path = v;
        }
        if let Some(v) = self.directory_format {
            config.directory_format = v;
        }
        if let Some(v) = self.max_depth {
            config.max_depth = v;
        }
        if let Some(v) = self.create_readme {
            config.create_readme = v;
        }
        if let Some(v) = self.preserve_structure {
            config.preserve_structure = v;
        }
        if let Some(v) = self.retention_days {
            config.retention_days = v;
        }
        if let Some(v) = self.is_active {
            config.is_active = v;
        }
        config.updated_at = Utc::now();
    }
}

/// Behaviour shared by the CRUD row sets.
pub trait Record: Clone {
    const KIND: &'static str;

    fn id(&self) -> u64;
    /// Value that must be unique across the row set.
    fn unique_key(&self) -> &str;
    fn is_active(&self) -> bool;
    /// Listing order.
    fn ordering(a: &Self, b: &Self) -> Ordering;
    /// Reject rows that could never be used.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Glob rule identifying files eligible for cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupPattern {
    pub id: u64,
    pub pattern: String,
    pub description: Option<String>,
    /// Lower values are tried first.
    pub priority: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for CleanupPattern {
    const KIND: &'static str = "Pattern";

    fn id(&self) -> u64 {
        self.id
    }

    fn unique_key(&self) -> &str {
        &self.pattern
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    // Equal priorities keep creation order (ids grow monotonically).
    fn ordering(a: &Self, b: &Self) -> Ordering {
        a.priority.cmp(&b.priority).then(a.id.cmp(&b.id))
    }

    fn validate(&self) -> Result<()> {
        PatternRule::compile(&self.pattern).map(|_| ())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPattern {
    pub pattern: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

impl NewPattern {
    pub fn new(pattern: impl Into<String>, priority: i32) -> Self {
        Self {
            pattern: pattern.into(),
            priority: Some(priority),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_record(self, id: u64) -> CleanupPattern {
        let now = Utc::now();
        CleanupPattern {
            id,
            pattern: self.pattern,
            description: self.description,
            priority: self.priority.unwrap_or(0),
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternPatch {
    pub pattern: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

impl PatternPatch {
    pub fn apply(self, row: &mut CleanupPattern) {
        if let Some(v) = self.pattern {
            row.pattern = v;
        }
        if let Some(v) = self.description {
            row.description = Some(v);
        }
        if let Some(v) = self.priority {
            row.priority = v;
        }
        if let Some(v) = self.is_active {
            row.is_active = v;
        }
        row.updated_at = Utc::now();
    }
}

/// How bad it would be to sweep an excluded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    #[default]
    Normal,
    Important,
    Critical,
}

impl std::str::FromStr for Criticality {
    type Err = CleanupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "important" => Ok(Self::Important),
            "critical" => Ok(Self::Critical),
            other => Err(CleanupError::InvalidConfig {
                field: "criticality".into(),
                reason: format!("unknown level '{}'", other),
            }),
        }
    }
}

/// File name, glob or relative path never considered for cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupExcludeFile {
    pub id: u64,
    pub file_name: String,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub criticality: Criticality,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for CleanupExcludeFile {
    const KIND: &'static str = "Excluded file";

    fn id(&self) -> u64 {
        self.id
    }

    fn unique_key(&self) -> &str {
        &self.file_name
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn ordering(a: &Self, b: &Self) -> Ordering {
        b.criticality.cmp(&a.criticality).then_with(|| a.file_name.cmp(&b.file_name))
    }

    fn validate(&self) -> Result<()> {
        ExclusionRules::check_entry(&self.file_name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExcludeFile {
    pub file_name: String,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub criticality: Option<Criticality>,
    pub is_active: Option<bool>,
}

impl NewExcludeFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = Some(criticality);
        self
    }

    pub(crate) fn into_record(self, id: u64) -> CleanupExcludeFile {
        let now = Utc::now();
        CleanupExcludeFile {
            id,
            file_name: self.file_name,
            reason: self.reason,
            description: self.description,
            criticality: self.criticality.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludeFilePatch {
    pub file_name: Option<String>,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub criticality: Option<Criticality>,
    pub is_active: Option<bool>,
}

impl ExcludeFilePatch {
    pub fn apply(self, row: &mut CleanupExcludeFile) {
        if let Some(v) = self.file_name {
            row.file_name = v;
        }
        if let Some(v) = self.reason {
            row.reason = Some(v);
        }
        if let Some(v) = self.description {
            row.description = Some(v);
        }
        if let Some(v) = self.criticality {
            row.criticality = v;
        }
        if let Some(v) = self.is_active {
            row.is_active = v;
        }
        row.updated_at = Utc::now();
    }
}

/// Directory name, glob or relative path whose whole subtree is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupExcludeDirectory {
    pub id: u64,
    pub directory: String,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for CleanupExcludeDirectory {
    const KIND: &'static str = "Excluded directory";

    fn id(&self) -> u64 {
        self.id
    }

    fn unique_key(&self) -> &str {
        &self.directory
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn ordering(a: &Self, b: &Self) -> Ordering {
        a.directory.cmp(&b.directory)
    }

    fn validate(&self) -> Result<()> {
        ExclusionRules::check_entry(&self.directory)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExcludeDirectory {
    pub directory: String,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl NewExcludeDirectory {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub(crate) fn into_record(self, id: u64) -> CleanupExcludeDirectory {
        let now = Utc::now();
        CleanupExcludeDirectory {
            id,
            directory: self.directory,
            reason: self.reason,
            description: self.description,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludeDirectoryPatch {
    pub directory: Option<String>,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl ExcludeDirectoryPatch {
    pub fn apply(self, row: &mut CleanupExcludeDirectory) {
        if let Some(v) = self.directory {
            row.directory = v;
        }
        if let Some(v) = self.reason {
            row.reason = Some(v);
        }
        if let Some(v) = self.description {
            row.description = Some(v);
        }
        if let Some(v) = self.is_active {
            row.is_active = v;
        }
        row.updated_at = Utc::now();
    }
}

/// Cron-triggered cleanup execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSchedule {
    pub id: u64,
    pub name: String,
    pub cron_expression: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for CleanupSchedule {
    const KIND: &'static str = "Schedule";

    fn id(&self) -> u64 {
        self.id
    }

    fn unique_key(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn ordering(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name)
    }

    fn validate(&self) -> Result<()> {
        CronSchedule::parse(&self.cron_expression).map(|_| ())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub name: String,
    pub cron_expression: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl NewSchedule {
    pub fn new(name: impl Into<String>, cron_expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cron_expression: cron_expression.into(),
            ..Default::default()
        }
    }

    pub(crate) fn into_record(self, id: u64) -> CleanupSchedule {
        let now = Utc::now();
        CleanupSchedule {
            id,
            name: self.name,
            cron_expression: self.cron_expression,
            description: self.description,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    pub name: Option<String>,
    pub cron_expression: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl SchedulePatch {
    pub fn apply(self, row: &mut CleanupSchedule) {
        if let Some(v) = self.name {
            row.name = v;
        }
        if let Some(v) = self.cron_expression {
            row.cron_expression = v;
        }
        if let Some(v) = self.description {
            row.description = Some(v);
        }
        if let Some(v) = self.is_active {
            row.is_active = v;
        }
        row.updated_at = Utc::now();
    }
}

/// Kind of operation recorded in the execution log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Cleanup,
    Restore,
    OrphanCleanup,
    StorageStats,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cleanup => "cleanup",
            Self::Restore => "restore",
            Self::OrphanCleanup => "orphan-cleanup",
            Self::StorageStats => "storage-stats",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    CompletedWithErrors,
    Failed,
}

impl ExecutionStatus {
    pub fn from_problem_count(problems: usize) -> Self {
        if problems == 0 {
            Self::Completed
        } else {
            Self::CompletedWithErrors
        }
    }
}

/// One row of the execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLog {
    pub execution_id: String,
    pub operation: OperationKind,
    pub status: ExecutionStatus,
    pub target_path: Option<PathBuf>,
    pub files_processed: usize,
    pub total_size: u64,
    pub executed_by: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub problems: Vec<String>,
}

/// Filter for [`crate::store::ConfigStore::list_executions`].
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub execution_id: Option<String>,
    pub operation: Option<OperationKind>,
    pub status: Option<ExecutionStatus>,
    pub executed_by: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Defaults to 100 when unset.
    pub limit: Option<usize>,
}

impl ExecutionFilter {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn matches(&self, log: &ExecutionLog) -> bool {
        self.execution_id.as_ref().map_or(true, |id| &log.execution_id == id)
            && self.operation.map_or(true, |op| log.operation == op)
            && self.status.map_or(true, |s| log.status == s)
            && self.executed_by.as_ref().map_or(true, |u| &log.executed_by == u)
            && self.from.map_or(true, |from| log.started_at >= from)
            && self.to.map_or(true, |to| log.started_at <= to)
    }
}

/// Per-day aggregate of the execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_executions: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub total_files: usize,
    pub total_size: u64,
    pub last_execution_id: Option<String>,
}

/// Aggregate logs started on or after `since` into per-day rows, newest day first.
pub fn aggregate_daily(logs: &[ExecutionLog], since: NaiveDate) -> Vec<DailyStats> {
    let mut days: std::collections::BTreeMap<NaiveDate, DailyStats> = std::collections::BTreeMap::new();

    let mut ordered: Vec<&ExecutionLog> = logs.iter().collect();
    ordered.sort_by_key(|log| log.started_at);

    for log in ordered {
        let date = log.started_at.date_naive();
        if date < since {
            continue;
        }
        let entry = days.entry(date).or_insert_with(|| DailyStats {
            date,
            total_executions: 0,
            successful_runs: 0,
            failed_runs: 0,
            total_files: 0,
            total_size: 0,
            last_execution_id: None,
        });
        entry.total_executions += 1;
        match log.status {
            ExecutionStatus::Completed => entry.successful_runs += 1,
            ExecutionStatus::Failed => entry.failed_runs += 1,
            ExecutionStatus::CompletedWithErrors => {}
        }
        entry.total_files += log.files_processed;
        entry.total_size += log.total_size;
        entry.last_execution_id = Some(log.execution_id.clone());
    }

    days.into_values().rev().collect()
}
