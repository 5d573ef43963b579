//! Built-in scheduled jobs: orphan-file cleanup, storage statistics and
//! store-defined cleanup executions.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use humansize::{format_size, BINARY};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use super::cron::CronSchedule;
use super::runner::{Job, Scheduler};
use crate::cleanup::paths::to_slash;
use crate::cleanup::walker::{file_type_of, FileProblem};
use crate::cleanup::{CleanupService, OperationLocks};
use crate::error::{CleanupError, Result};
use crate::settings::Settings;
use crate::store::{ConfigStore, ExecutionLog, ExecutionStatus, OperationKind};

pub const ORPHAN_CLEANUP_JOB: &str = "orphan-cleanup";
pub const STORAGE_STATS_JOB: &str = "storage-stats";
pub const DEFAULT_ORPHAN_CRON: &str = "0 3 * * *";
pub const DEFAULT_STATS_CRON: &str = "0 9 * * *";
/// Recorded as `executed_by` for every scheduled run.
pub const SCHEDULED_USER: &str = "system";
/// Files younger than this are never treated as orphans.
pub const DEFAULT_ORPHAN_MIN_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Relative paths still referenced by the application.
///
/// One path per line, relative to the uploads directory; blank lines and
/// lines starting with `#` are ignored.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    paths: HashSet<String>,
}

impl ReferenceIndex {
    pub fn parse(text: &str) -> Self {
        let paths = text.lines().filter_map(normalize_reference).collect();
        Self { paths }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CleanupError::from_io_error(e, "reading reference index", Some(path.to_path_buf())))?;
        Ok(Self::parse(&text))
    }

    pub fn contains(&self, relative: &str) -> bool {
        self.paths.contains(relative)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn normalize_reference(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let normalized = to_slash(Path::new(&line.replace('\\', "/")));
    (!normalized.is_empty()).then_some(normalized)
}

fn is_hidden(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

#[derive(Debug, Clone)]
struct UploadFile {
    relative: String,
    path: PathBuf,
    size: u64,
    modified: Option<SystemTime>,
}

/// List regular files under `root` on a blocking thread. Hidden entries are skipped.
async fn scan_uploads(root: &Path) -> Result<(Vec<UploadFile>, Vec<FileProblem>)> {
    if !root.is_dir() {
        return Err(CleanupError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut files = Vec::new();
        let mut problems = Vec::new();

        for entry_result in jwalk::WalkDir::new(&root)
            .parallelism(jwalk::Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
        {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "error walking uploads directory");
                    problems.push(FileProblem::new(&root, "walk", e));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = match path.strip_prefix(&root) {
                Ok(rel) if !is_hidden(rel) => to_slash(rel),
                _ => continue,
            };
            match entry.metadata() {
                Ok(meta) => files.push(UploadFile {
                    relative,
                    size: meta.len(),
                    modified: meta.modified().ok(),
                    path,
                }),
                Err(e) => problems.push(FileProblem::new(&path, "stat", e)),
            }
        }
        (files, problems)
    })
    .await
    .map_err(|e| CleanupError::IoError {
        path: None,
        operation: "scanning uploads".to_string(),
        source: std::io::Error::other(e),
    })
}

/// Result of one orphan-cleanup pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanReport {
    pub dry_run: bool,
    pub scanned: usize,
    pub referenced: usize,
    /// Unreferenced files old enough to remove.
    pub orphans: Vec<String>,
    pub deleted: Vec<String>,
    pub reclaimed_bytes: u64,
    /// Unreferenced files younger than the minimum age.
    pub skipped_recent: usize,
    pub problems: Vec<FileProblem>,
}

/// Finds and removes uploaded files nothing references anymore.
#[derive(Debug, Clone)]
pub struct OrphanCleanup {
    uploads_dir: PathBuf,
    references_file: PathBuf,
    dry_run: bool,
    min_age: Duration,
}

impl OrphanCleanup {
    pub fn new(uploads_dir: impl Into<PathBuf>, references_file: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            references_file: references_file.into(),
            dry_run: false,
            min_age: DEFAULT_ORPHAN_MIN_AGE,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_min_age(mut self, min_age: Duration) -> Self {
        self.min_age = min_age;
        self
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub async fn run(&self) -> Result<OrphanReport> {
        let index = ReferenceIndex::load(&self.references_file).await?;
        let (files, mut problems) = scan_uploads(&self.uploads_dir).await?;
        let now = SystemTime::now();

        let mut report = OrphanReport {
            dry_run: self.dry_run,
            scanned: files.len(),
            referenced: 0,
            orphans: Vec::new(),
            deleted: Vec::new(),
            reclaimed_bytes: 0,
            skipped_recent: 0,
            problems: Vec::new(),
        };

        for file in files {
            if index.contains(&file.relative) {
                report.referenced += 1;
                continue;
            }
            let age = file
                .modified
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or(Duration::ZERO);
            if age < self.min_age {
                report.skipped_recent += 1;
                continue;
            }

            report.orphans.push(file.relative.clone());
            if self.dry_run {
                debug!(file = %file.relative, "orphan found (dry run)");
                continue;
            }
            match tokio::fs::remove_file(&file.path).await {
                Ok(()) => {
                    info!(file = %file.relative, "orphan file deleted");
                    report.reclaimed_bytes += file.size;
                    report.deleted.push(file.relative);
                }
                Err(e) => {
                    warn!(file = %file.relative, error = %e, "failed to delete orphan file");
                    problems.push(FileProblem::new(&file.path, "delete", e));
                }
            }
        }

        report.problems = problems;
        info!(
            scanned = report.scanned,
            orphans = report.orphans.len(),
            deleted = report.deleted.len(),
            reclaimed = %format_size(report.reclaimed_bytes, BINARY),
            dry_run = report.dry_run,
            "orphan cleanup finished"
        );
        Ok(report)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageBucket {
    pub files: usize,
    pub bytes: u64,
}

impl UsageBucket {
    fn add(&mut self, size: u64) {
        self.files += 1;
        self.bytes += size;
    }
}

/// Storage usage of the uploads directory.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub root: PathBuf,
    pub total_files: usize,
    pub total_bytes: u64,
    pub by_extension: BTreeMap<String, UsageBucket>,
    /// Keyed by top-level directory; files directly under the root use `.`.
    pub by_directory: BTreeMap<String, UsageBucket>,
    pub problems: Vec<FileProblem>,
}

pub async fn collect_storage_stats(root: &Path) -> Result<StorageStats> {
    let (files, problems) = scan_uploads(root).await?;
    let mut stats = StorageStats {
        root: root.to_path_buf(),
        problems,
        ..Default::default()
    };

    for file in &files {
        stats.total_files += 1;
        stats.total_bytes += file.size;
        stats
            .by_extension
            .entry(file_type_of(Path::new(&file.relative)))
            .or_default()
            .add(file.size);
        let top = match file.relative.split_once('/') {
            Some((dir, _)) => dir.to_string(),
            None => ".".to_string(),
        };
        stats.by_directory.entry(top).or_default().add(file.size);
    }
    Ok(stats)
}

fn log_storage_stats(stats: &StorageStats) {
    info!(
        root = %stats.root.display(),
        files = stats.total_files,
        size = %format_size(stats.total_bytes, BINARY),
        "storage statistics"
    );
    for (ext, bucket) in &stats.by_extension {
        info!(extension = %ext, files = bucket.files, size = %format_size(bucket.bytes, BINARY), "by extension");
    }
    for (dir, bucket) in &stats.by_directory {
        info!(directory = %dir, files = bucket.files, size = %format_size(bucket.bytes, BINARY), "by directory");
    }
}

async fn record(store: Option<&Arc<dyn ConfigStore>>, log: ExecutionLog) {
    if let Some(store) = store {
        if let Err(e) = store.record_execution(log).await {
            warn!(error = %e, "failed to record execution log");
        }
    }
}

fn job_log(operation: OperationKind, started_at: DateTime<Utc>, target: &Path) -> ExecutionLog {
    ExecutionLog {
        execution_id: format!("{}-{}", operation, started_at.format("%Y-%m-%d-%H-%M-%S")),
        operation,
        status: ExecutionStatus::Completed,
        target_path: Some(target.to_path_buf()),
        files_processed: 0,
        total_size: 0,
        executed_by: SCHEDULED_USER.to_string(),
        started_at,
        completed_at: Some(Utc::now()),
        error_message: None,
        problems: Vec::new(),
    }
}

pub struct OrphanCleanupJob {
    task: OrphanCleanup,
    schedule: CronSchedule,
    locks: OperationLocks,
    store: Option<Arc<dyn ConfigStore>>,
}

impl OrphanCleanupJob {
    pub fn new(task: OrphanCleanup, schedule: CronSchedule, locks: OperationLocks) -> Self {
        Self {
            task,
            schedule,
            locks,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }
}

#[async_trait]
impl Job for OrphanCleanupJob {
    fn name(&self) -> &str {
        ORPHAN_CLEANUP_JOB
    }

    fn schedule(&self) -> &CronSchedule {
        &self.schedule
    }

    async fn run(&self) -> anyhow::Result<()> {
        let _guard = self.locks.acquire(OperationKind::OrphanCleanup)?;
        let started_at = Utc::now();
        let mut log = job_log(OperationKind::OrphanCleanup, started_at, self.task.uploads_dir());

        match self.task.run().await {
            Ok(report) => {
                log.status = ExecutionStatus::from_problem_count(report.problems.len());
                log.files_processed = if report.dry_run {
                    report.orphans.len()
                } else {
                    report.deleted.len()
                };
                log.total_size = report.reclaimed_bytes;
                log.problems = report.problems.iter().map(ToString::to_string).collect();
                record(self.store.as_ref(), log).await;
                Ok(())
            }
            Err(e) => {
                log.status = ExecutionStatus::Failed;
                log.error_message = Some(e.to_string());
                record(self.store.as_ref(), log).await;
                Err(e).context("orphan cleanup failed")
            }
        }
    }
}

pub struct StorageStatsJob {
    root: PathBuf,
    schedule: CronSchedule,
    store: Option<Arc<dyn ConfigStore>>,
}

impl StorageStatsJob {
    pub fn new(root: impl Into<PathBuf>, schedule: CronSchedule) -> Self {
        Self {
            root: root.into(),
            schedule,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }
}

#[async_trait]
impl Job for StorageStatsJob {
    fn name(&self) -> &str {
        STORAGE_STATS_JOB
    }

    fn schedule(&self) -> &CronSchedule {
        &self.schedule
    }

    async fn run(&self) -> anyhow::Result<()> {
        let started_at = Utc::now();
        let stats = collect_storage_stats(&self.root)
            .await
            .with_context(|| format!("failed to collect storage statistics for {}", self.root.display()))?;
        log_storage_stats(&stats);

        let mut log = job_log(OperationKind::StorageStats, started_at, &self.root);
        log.files_processed = stats.total_files;
        log.total_size = stats.total_bytes;
        log.status = ExecutionStatus::from_problem_count(stats.problems.len());
        log.problems = stats.problems.iter().map(ToString::to_string).collect();
        record(self.store.as_ref(), log).await;
        Ok(())
    }
}

/// Runs a cleanup execution for one stored schedule row.
pub struct CleanupExecutionJob {
    name: String,
    schedule: CronSchedule,
    service: Arc<CleanupService>,
}

impl CleanupExecutionJob {
    pub fn new(name: impl Into<String>, schedule: CronSchedule, service: Arc<CleanupService>) -> Self {
        Self {
            name: name.into(),
            schedule,
            service,
        }
    }
}

#[async_trait]
impl Job for CleanupExecutionJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule(&self) -> &CronSchedule {
        &self.schedule
    }

    async fn run(&self) -> anyhow::Result<()> {
        info!(schedule = %self.name, "scheduled cleanup starting");
        match self.service.execute_cleanup(SCHEDULED_USER).await {
            Ok(result) => {
                info!(
                    schedule = %self.name,
                    copied = result.copied_count,
                    session = %result.cleanup_path.display(),
                    "scheduled cleanup finished"
                );
                Ok(())
            }
            Err(CleanupError::AlreadyRunning { .. }) => {
                warn!(schedule = %self.name, "cleanup already running, skipping this run");
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("scheduled cleanup '{}' failed", self.name)),
        }
    }
}

/// Register the built-in jobs plus one job per active stored schedule.
pub async fn register_jobs(
    scheduler: &mut Scheduler,
    settings: &Settings,
    service: Arc<CleanupService>,
) -> anyhow::Result<()> {
    let store = Arc::clone(service.store());
    let locks = service.locks().clone();

    let orphan_cron = CronSchedule::parse(&settings.orphan_cron).context("invalid orphan_cron setting")?;
    let orphans = OrphanCleanup::new(&settings.uploads_dir, &settings.references_file)
        .with_dry_run(settings.orphan_dry_run)
        .with_min_age(Duration::from_secs(settings.orphan_min_age_hours * 60 * 60));
    scheduler.add_job(Arc::new(
        OrphanCleanupJob::new(orphans, orphan_cron, locks).with_store(Arc::clone(&store)),
    ));

    let stats_cron = CronSchedule::parse(&settings.stats_cron).context("invalid stats_cron setting")?;
    scheduler.add_job(Arc::new(
        StorageStatsJob::new(&settings.uploads_dir, stats_cron).with_store(Arc::clone(&store)),
    ));

    for row in store.list_schedules(false).await? {
        match CronSchedule::parse(&row.cron_expression) {
            Ok(cron) => scheduler.add_job(Arc::new(CleanupExecutionJob::new(
                row.name,
                cron,
                Arc::clone(&service),
            ))),
            Err(e) => warn!(schedule = %row.name, error = %e, "skipping schedule with invalid cron expression"),
        }
    }
    Ok(())
}
