//! Preview and execution of cleanup runs.
//!
//! A run works from a [`CleanupPlan`]: the configuration and compiled rules
//! captured once at the start of the call. [`preview`] and [`execute`] take
//! the plan explicitly; [`CleanupService`] builds it from a [`ConfigStore`],
//! guards concurrent runs and records the execution log.

use chrono::{DateTime, Local, Utc};
use humansize::{format_size, BINARY};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::locks::OperationLocks;
use super::paths::{self, absolutize, destination_root, is_within, render_directory_name, session_prefix, to_slash};
use super::report::{checksum_file, render_readme, Manifest, ManifestEntry, ReadmeSummary, MANIFEST_FILE, MANIFEST_VERSION, README_FILE};
use super::rules::{ExclusionRules, PatternSet};
use super::walker::{FileProblem, MatchedFile, WalkOutcome, Walker};
use crate::error::{CleanupError, Result};
use crate::store::{
    CleanupConfig, CleanupExcludeDirectory, CleanupExcludeFile, CleanupPattern, ConfigStore, ExecutionLog,
    ExecutionStatus, OperationKind, DEFAULT_CONFIG_NAME,
};

/// Matched files listed individually in a preview.
pub const PREVIEW_FILE_LIMIT: usize = 100;

/// Configuration and rules captured for one run.
#[derive(Debug, Clone)]
pub struct CleanupPlan {
    pub config: CleanupConfig,
    /// Absolute, normalized project root.
    pub project_path: PathBuf,
    /// Absolute folder that holds session folders.
    pub destination_path: PathBuf,
    pub patterns: PatternSet,
    pub exclusions: ExclusionRules,
}

impl CleanupPlan {
    /// Compile a plan from store rows. Inactive rows are ignored.
    pub fn from_rows(
        config: CleanupConfig,
        patterns: &[CleanupPattern],
        exclude_files: &[CleanupExcludeFile],
        exclude_dirs: &[CleanupExcludeDirectory],
    ) -> Result<Self> {
        let patterns = PatternSet::from_rows(patterns)?;
        let exclusions = ExclusionRules::from_rows(exclude_files, exclude_dirs)?;
        Self::new(config, patterns, exclusions)
    }

    pub fn new(config: CleanupConfig, patterns: PatternSet, exclusions: ExclusionRules) -> Result<Self> {
        config.validate()?;
        let project_path = absolutize(&config.project_path);
        let destination_path = destination_root(&config);
        Ok(Self {
            config,
            project_path,
            destination_path,
            patterns,
            exclusions,
        })
    }

    /// True when sessions would be written inside the tree being scanned.
    pub fn destination_inside_project(&self) -> bool {
        is_within(&self.destination_path, &self.project_path)
    }

    /// Fail with `DestinationInsideProject` when the safety check does not hold.
    pub fn ensure_destination_safe(&self) -> Result<()> {
        if self.destination_inside_project() {
            return Err(CleanupError::DestinationInsideProject {
                project: self.project_path.clone(),
                destination: self.destination_path.clone(),
            });
        }
        Ok(())
    }

    pub fn session_name(&self, at: &DateTime<Local>) -> String {
        render_directory_name(&self.config.directory_format, at)
    }

    pub fn session_path(&self, at: &DateTime<Local>) -> PathBuf {
        self.destination_path.join(self.session_name(at))
    }

    pub async fn walk(&self) -> Result<WalkOutcome> {
        Walker::new(&self.project_path, &self.patterns, &self.exclusions)
            .with_max_depth(self.config.max_depth)
            .walk()
            .await
    }
}

/// One matched file as shown in a preview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewFile {
    pub name: String,
    pub relative_path: String,
    pub size: u64,
    pub size_human: String,
    pub file_type: String,
    pub pattern: String,
}

impl From<&MatchedFile> for PreviewFile {
    fn from(file: &MatchedFile) -> Self {
        Self {
            name: file
                .relative_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            relative_path: to_slash(&file.relative_path),
            size: file.size,
            size_human: format_size(file.size, BINARY),
            file_type: file.file_type.clone(),
            pattern: file.pattern.clone(),
        }
    }
}

/// Dry-run summary of what an execution would copy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub success: bool,
    pub session_id: String,
    pub total_files: usize,
    pub total_size: u64,
    pub total_size_human: String,
    pub by_pattern: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    /// First [`PREVIEW_FILE_LIMIT`] matched files.
    pub files: Vec<PreviewFile>,
    pub patterns: Vec<String>,
    pub project_path: PathBuf,
    pub destination_path: PathBuf,
    pub cleanup_folder_name: String,
    pub full_destination_path: PathBuf,
    pub destination_inside_project: bool,
    pub problems: Vec<FileProblem>,
}

/// Outcome of a cleanup execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// The run completed; per-file failures are listed in `errors`.
    pub success: bool,
    pub status: ExecutionStatus,
    pub execution_id: String,
    pub copied_count: usize,
    pub total_size: u64,
    pub by_pattern: BTreeMap<String, usize>,
    pub cleanup_dir: String,
    pub cleanup_path: PathBuf,
    pub readme_written: bool,
    pub manifest_path: Option<PathBuf>,
    pub errors: Vec<FileProblem>,
}

/// Outcome of a restore from a session folder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResult {
    pub success: bool,
    pub session: PathBuf,
    pub restored_count: usize,
    pub total_files: usize,
    pub errors: Vec<FileProblem>,
}

/// A session folder found under the destination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
    pub file_count: usize,
    pub total_size: u64,
}

/// Group matched files by pattern and by extension.
pub fn group_counts(files: &[MatchedFile]) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
    let mut by_pattern = BTreeMap::new();
    let mut by_type = BTreeMap::new();
    for file in files {
        *by_pattern.entry(file.pattern.clone()).or_insert(0) += 1;
        *by_type.entry(file.file_type.clone()).or_insert(0) += 1;
    }
    (by_pattern, by_type)
}

/// Compute what a run would copy without touching the destination.
pub async fn preview(plan: &CleanupPlan, now: DateTime<Local>) -> Result<PreviewResult> {
    let inside = plan.destination_inside_project();
    if inside {
        warn!(
            project = %plan.project_path.display(),
            destination = %plan.destination_path.display(),
            "cleanup destination is inside the project"
        );
    }

    let outcome = plan.walk().await?;
    let (by_pattern, by_type) = group_counts(&outcome.files);
    let total_size = outcome.total_size();
    let folder = plan.session_name(&now);

    info!(
        files = outcome.files.len(),
        size = %format_size(total_size, BINARY),
        "cleanup preview complete"
    );

    Ok(PreviewResult {
        success: true,
        session_id: format!("preview-{}", now.timestamp_millis()),
        total_files: outcome.files.len(),
        total_size,
        total_size_human: format_size(total_size, BINARY),
        by_pattern,
        by_type,
        files: outcome.files.iter().take(PREVIEW_FILE_LIMIT).map(PreviewFile::from).collect(),
        patterns: plan.patterns.patterns().map(str::to_string).collect(),
        project_path: plan.project_path.clone(),
        destination_path: plan.destination_path.clone(),
        full_destination_path: plan.destination_path.join(&folder),
        cleanup_folder_name: folder,
        destination_inside_project: inside,
        problems: outcome.problems,
    })
}

/// Copy every matched file into a session folder. Per-file failures are
/// collected; only configuration, safety and session-folder errors abort.
pub async fn execute(plan: &CleanupPlan, now: DateTime<Local>) -> Result<ExecutionResult> {
    plan.ensure_destination_safe()?;

    let outcome = plan.walk().await?;
    let cleanup_dir = plan.session_name(&now);
    let cleanup_path = plan.destination_path.join(&cleanup_dir);

    info!(
        session = %cleanup_path.display(),
        files = outcome.files.len(),
        "starting cleanup copy"
    );
    tokio::fs::create_dir_all(&cleanup_path)
        .await
        .map_err(|e| CleanupError::from_io_error(e, "creating session directory", Some(cleanup_path.clone())))?;

    let scan_problems = outcome.problems.len();
    let mut errors = outcome.problems;
    let mut entries = Vec::with_capacity(outcome.files.len());
    let mut copied = Vec::with_capacity(outcome.files.len());
    let manifest_path = cleanup_path.join(MANIFEST_FILE);
    let readme_path = cleanup_path.join(README_FILE);
    let mut readme_taken = false;

    // Flat names never collide with the session artifacts
    let mut flat_names = HashSet::from([MANIFEST_FILE.to_string()]);
    if plan.config.create_readme {
        flat_names.insert(README_FILE.to_string());
    }

    for file in &outcome.files {
        let destination = if plan.config.preserve_structure {
            cleanup_path.join(&file.relative_path)
        } else {
            cleanup_path.join(unique_flat_name(&file.relative_path, &mut flat_names))
        };

        if destination == manifest_path {
            warn!(file = %file.path.display(), "file name is reserved for the session manifest, not copied");
            errors.push(FileProblem::new(&file.path, "copy", "name reserved for the session manifest"));
            continue;
        }
        let is_readme = destination == readme_path;

        match copy_one(&file.path, &destination).await {
            Ok((size, checksum)) => {
                debug!(file = %file.relative_path.display(), "copied");
                readme_taken |= is_readme;
                entries.push(ManifestEntry {
                    original: file.path.clone(),
                    destination,
                    relative_path: to_slash(&file.relative_path),
                    size,
                    checksum,
                });
                copied.push(file.clone());
            }
            Err(problem) => {
                error!(file = %file.path.display(), error = %problem.message, "failed to copy file");
                errors.push(problem);
            }
        }
    }

    let total_size: u64 = entries.iter().map(|e| e.size).sum();
    let (by_pattern, _) = group_counts(&copied);

    let mut readme_written = false;
    if plan.config.create_readme && readme_taken {
        warn!(path = %readme_path.display(), "a backed-up file occupies the README path, README not written");
        errors.push(FileProblem::new(&readme_path, "write", "path holds a backed-up file"));
    } else if plan.config.create_readme {
        let readme = render_readme(&ReadmeSummary {
            session_name: &cleanup_dir,
            session_path: &cleanup_path,
            project_root: &plan.project_path,
            files_copied: entries.len(),
            total_size,
            by_pattern: &by_pattern,
            copy_failures: errors.len() - scan_problems,
            scan_problems,
            preserve_structure: plan.config.preserve_structure,
            created_at: now,
        });
        match tokio::fs::write(&readme_path, readme).await {
            Ok(()) => readme_written = true,
            Err(e) => {
                warn!(path = %readme_path.display(), error = %e, "failed to write session README");
                errors.push(FileProblem::new(readme_path, "write", e));
            }
        }
    }

    let copied_count = entries.len();
    let manifest = Manifest {
        version: MANIFEST_VERSION.to_string(),
        timestamp: now.with_timezone(&Utc),
        project_root: plan.project_path.clone(),
        cleanup_path: cleanup_path.clone(),
        preserve_structure: plan.config.preserve_structure,
        patterns: plan.patterns.patterns().map(str::to_string).collect(),
        excluded_files: plan.exclusions.file_count(),
        excluded_dirs: plan.exclusions.dir_count(),
        files: entries,
    };
    let manifest_path = match manifest.write(&cleanup_path).await {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, "failed to write session manifest");
            errors.push(FileProblem::new(manifest_path, "write", e));
            None
        }
    };

    let status = ExecutionStatus::from_problem_count(errors.len());
    info!(
        copied = copied_count,
        size = %format_size(total_size, BINARY),
        errors = errors.len(),
        "cleanup completed"
    );

    Ok(ExecutionResult {
        success: true,
        status,
        execution_id: format!("cleanup-{}", now.format("%Y-%m-%d-%H-%M-%S")),
        copied_count,
        total_size,
        by_pattern,
        cleanup_dir,
        cleanup_path,
        readme_written,
        manifest_path,
        errors,
    })
}

async fn copy_one(source: &Path, destination: &Path) -> std::result::Result<(u64, String), FileProblem> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FileProblem::new(parent, "create directory", e))?;
    }
    let size = tokio::fs::copy(source, destination)
        .await
        .map_err(|e| FileProblem::new(source, "copy", e))?;
    let checksum = checksum_file(destination)
        .await
        .map_err(|e| FileProblem::new(destination, "checksum", e))?;
    Ok((size, checksum))
}

/// File name for flat sessions, suffixed `-1`, `-2`, ... on collisions.
fn unique_flat_name(relative: &Path, taken: &mut HashSet<String>) -> String {
    let name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| to_slash(relative).replace('/', "_"));
    if taken.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name.as_str(), ""),
    };
    let mut n = 1;
    loop {
        let candidate = format!("{}-{}{}", stem, n, ext);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Store-backed front end for cleanup runs.
pub struct CleanupService {
    store: Arc<dyn ConfigStore>,
    config_name: String,
    fallback: Option<CleanupConfig>,
    locks: OperationLocks,
}

impl CleanupService {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            fallback: None,
            locks: OperationLocks::new(),
        }
    }

    pub fn with_config_name(mut self, name: impl Into<String>) -> Self {
        self.config_name = name.into();
        self
    }

    /// Configuration used when the store has no row for this name.
    pub fn with_fallback(mut self, config: CleanupConfig) -> Self {
        self.fallback = Some(config);
        self
    }

    /// Share locks with other services or the scheduler.
    pub fn with_locks(mut self, locks: OperationLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn locks(&self) -> &OperationLocks {
        &self.locks
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    /// Read the configuration and active rule lists into a plan.
    pub async fn load_plan(&self) -> Result<CleanupPlan> {
        let config = match self.store.get_config(&self.config_name).await {
            Ok(config) => config,
            Err(CleanupError::NotConfigured { name }) => match &self.fallback {
                Some(fallback) => {
                    warn!(config = %name, "no stored cleanup configuration, using defaults");
                    fallback.clone()
                }
                None => return Err(CleanupError::NotConfigured { name }),
            },
            Err(e) => return Err(e),
        };

        let patterns = self.store.list_patterns(false).await?;
        let exclude_files = self.store.list_exclude_files(false).await?;
        let exclude_dirs = self.store.list_exclude_dirs(false).await?;
        debug!(
            patterns = patterns.len(),
            excluded_files = exclude_files.len(),
            excluded_dirs = exclude_dirs.len(),
            "cleanup rules loaded"
        );

        CleanupPlan::from_rows(config, &patterns, &exclude_files, &exclude_dirs)
    }

    pub async fn preview_cleanup(&self, user_id: &str) -> Result<PreviewResult> {
        info!(user = user_id, "starting cleanup preview");
        let plan = self.load_plan().await?;
        preview(&plan, Local::now()).await
    }

    /// Run a cleanup. A second call while one is running fails with `AlreadyRunning`.
    pub async fn execute_cleanup(&self, user_id: &str) -> Result<ExecutionResult> {
        let _guard = self.locks.acquire(OperationKind::Cleanup)?;
        let started_at = Utc::now();
        info!(user = user_id, "starting cleanup execution");

        let outcome = match self.load_plan().await {
            Ok(plan) => execute(&plan, Local::now()).await,
            Err(e) => Err(e),
        };

        let log = match &outcome {
            Ok(result) => ExecutionLog {
                execution_id: result.execution_id.clone(),
                operation: OperationKind::Cleanup,
                status: result.status,
                target_path: Some(result.cleanup_path.clone()),
                files_processed: result.copied_count,
                total_size: result.total_size,
                executed_by: user_id.to_string(),
                started_at,
                completed_at: Some(Utc::now()),
                error_message: None,
                problems: result.errors.iter().map(ToString::to_string).collect(),
            },
            Err(e) => {
                error!(error = %e, "cleanup failed");
                failed_log(OperationKind::Cleanup, user_id, started_at, e)
            }
        };
        self.record(log).await;

        outcome
    }

    /// Copy files from a session back to their original locations.
    /// `only` limits the restore to the given relative paths.
    pub async fn restore(&self, session: &str, only: Option<&[String]>, user_id: &str) -> Result<RestoreResult> {
        let _guard = self.locks.acquire(OperationKind::Restore)?;
        let started_at = Utc::now();

        let outcome = self.restore_inner(session, only).await;
        let log = match &outcome {
            Ok(result) => ExecutionLog {
                execution_id: format!("restore-{}", started_at.format("%Y-%m-%d-%H-%M-%S")),
                operation: OperationKind::Restore,
                status: ExecutionStatus::from_problem_count(result.errors.len()),
                target_path: Some(result.session.clone()),
                files_processed: result.restored_count,
                total_size: 0,
                executed_by: user_id.to_string(),
                started_at,
                completed_at: Some(Utc::now()),
                error_message: None,
                problems: result.errors.iter().map(ToString::to_string).collect(),
            },
            Err(e) => failed_log(OperationKind::Restore, user_id, started_at, e),
        };
        self.record(log).await;
        outcome
    }

    async fn restore_inner(&self, session: &str, only: Option<&[String]>) -> Result<RestoreResult> {
        let plan = self.load_plan().await?;
        let session_path = resolve_session(&plan, session)?;
        info!(session = %session_path.display(), "starting restore");

        let manifest = Manifest::read(&session_path).await?;
        let selected: Vec<&ManifestEntry> = manifest
            .files
            .iter()
            .filter(|entry| only.map_or(true, |wanted| wanted.iter().any(|w| w == &entry.relative_path)))
            .collect();

        let mut restored = 0;
        let mut errors = Vec::new();
        for entry in &selected {
            match restore_one(entry).await {
                Ok(()) => {
                    debug!(file = %entry.relative_path, "restored");
                    restored += 1;
                }
                Err(problem) => {
                    error!(file = %entry.relative_path, error = %problem.message, "failed to restore file");
                    errors.push(problem);
                }
            }
        }

        info!(restored, total = selected.len(), "restore completed");
        Ok(RestoreResult {
            success: true,
            session: session_path,
            restored_count: restored,
            total_files: selected.len(),
            errors,
        })
    }

    /// Session folders under the destination, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionInfo>> {
        let plan = self.load_plan().await?;
        list_sessions_in(&plan.destination_path, &plan.config.directory_format).await
    }

    pub async fn delete_session(&self, session: &str) -> Result<PathBuf> {
        let plan = self.load_plan().await?;
        let path = resolve_session(&plan, session)?;
        tokio::fs::remove_dir_all(&path)
            .await
            .map_err(|e| CleanupError::from_io_error(e, "deleting session directory", Some(path.clone())))?;
        warn!(session = %path.display(), "cleanup session deleted");
        Ok(path)
    }

    /// Delete sessions older than the configured retention. Zero keeps everything.
    pub async fn prune_sessions(&self) -> Result<Vec<String>> {
        let plan = self.load_plan().await?;
        if plan.config.retention_days == 0 {
            return Ok(Vec::new());
        }
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(plan.config.retention_days));

        let mut removed = Vec::new();
        for session in list_sessions_in(&plan.destination_path, &plan.config.directory_format).await? {
            if session.modified.is_some_and(|m| m < cutoff) {
                match tokio::fs::remove_dir_all(&session.path).await {
                    Ok(()) => {
                        info!(session = %session.name, "expired cleanup session removed");
                        removed.push(session.name);
                    }
                    Err(e) => warn!(session = %session.name, error = %e, "failed to remove expired session"),
                }
            }
        }
        Ok(removed)
    }

    async fn record(&self, log: ExecutionLog) {
        if let Err(e) = self.store.record_execution(log).await {
            warn!(error = %e, "failed to record execution log");
        }
    }
}

fn failed_log(operation: OperationKind, user_id: &str, started_at: DateTime<Utc>, err: &CleanupError) -> ExecutionLog {
    ExecutionLog {
        execution_id: format!("{}-{}", operation, started_at.format("%Y-%m-%d-%H-%M-%S")),
        operation,
        status: ExecutionStatus::Failed,
        target_path: None,
        files_processed: 0,
        total_size: 0,
        executed_by: user_id.to_string(),
        started_at,
        completed_at: Some(Utc::now()),
        error_message: Some(err.to_string()),
        problems: Vec::new(),
    }
}

/// Resolve a session name or path; the result must be a folder below the destination.
fn resolve_session(plan: &CleanupPlan, session: &str) -> Result<PathBuf> {
    let candidate = paths::resolve_path(Path::new(session), &plan.destination_path);
    if candidate == plan.destination_path || !is_within(&candidate, &plan.destination_path) {
        return Err(CleanupError::SessionNotFound { path: candidate });
    }
    if !candidate.is_dir() {
        return Err(CleanupError::SessionNotFound { path: candidate });
    }
    Ok(candidate)
}

async fn restore_one(entry: &ManifestEntry) -> std::result::Result<(), FileProblem> {
    let checksum = checksum_file(&entry.destination)
        .await
        .map_err(|e| FileProblem::new(&entry.destination, "read", e))?;
    if checksum != entry.checksum {
        return Err(FileProblem::new(&entry.destination, "verify", "checksum mismatch"));
    }
    if let Some(parent) = entry.original.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FileProblem::new(parent, "create directory", e))?;
    }
    tokio::fs::copy(&entry.destination, &entry.original)
        .await
        .map_err(|e| FileProblem::new(&entry.original, "restore", e))?;
    Ok(())
}

/// Session folders in `destination`, newest first. A missing destination has no sessions.
pub async fn list_sessions_in(destination: &Path, directory_format: &str) -> Result<Vec<SessionInfo>> {
    let prefix = session_prefix(directory_format);
    let mut reader = match tokio::fs::read_dir(destination).await {
        Ok(reader) => reader,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CleanupError::from_io_error(
                e,
                "reading destination directory",
                Some(destination.to_path_buf()),
            ))
        }
    };

    let mut sessions = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| CleanupError::from_io_error(e, "reading destination directory", Some(destination.to_path_buf())))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir || !name.starts_with(prefix) {
            continue;
        }

        let manifest = Manifest::read(&path).await.ok();
        if prefix.is_empty() && manifest.is_none() {
            continue;
        }

        let modified = entry
            .metadata()
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from);
        sessions.push(SessionInfo {
            name,
            path,
            modified,
            file_count: manifest.as_ref().map_or(0, |m| m.files.len()),
            total_size: manifest.as_ref().map_or(0, Manifest::total_size),
        });
    }

    sessions.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    Ok(sessions)
}
