//! JSON document store.
//!
//! All row sets live in one serde document. Mutations run against a copy
//! which is persisted (temp file + rename) before it replaces the live state,
//! so a failed write never leaves memory and disk out of step.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::model::*;
use super::table::Table;
use super::ConfigStore;
use crate::error::{CleanupError, Result};

const STORE_VERSION: u32 = 1;

/// Execution log rows kept before the oldest are dropped.
pub const MAX_EXECUTION_LOGS: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreData {
    version: u32,
    next_id: u64,
    #[serde(default)]
    configs: Vec<CleanupConfig>,
    #[serde(default)]
    patterns: Table<CleanupPattern>,
    #[serde(default)]
    exclude_files: Table<CleanupExcludeFile>,
    #[serde(default)]
    exclude_dirs: Table<CleanupExcludeDirectory>,
    #[serde(default)]
    schedules: Table<CleanupSchedule>,
    #[serde(default)]
    executions: Vec<ExecutionLog>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            next_id: 1,
            configs: Vec::new(),
            patterns: Table::default(),
            exclude_files: Table::default(),
            exclude_dirs: Table::default(),
            schedules: Table::default(),
            executions: Vec::new(),
        }
    }
}

impl StoreData {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// File-backed [`ConfigStore`].
pub struct JsonStore {
    path: Option<PathBuf>,
    data: RwLock<StoreData>,
}

impl JsonStore {
    /// Open the store at `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| CleanupError::Persistence {
                path: path.clone(),
                reason: format!("corrupt store document: {}", e),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file missing, starting empty");
                StoreData::default()
            }
            Err(e) => return Err(CleanupError::from_io_error(e, "reading store", Some(path))),
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(StoreData::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn read<R>(&self, f: impl FnOnce(&StoreData) -> R) -> R {
        let data = self.data.read().await;
        f(&data)
    }

    async fn mutate<R>(&self, f: impl FnOnce(&mut StoreData) -> Result<R>) -> Result<R> {
        let mut data = self.data.write().await;
        let mut draft = data.clone();
        let out = f(&mut draft)?;
        self.persist(&draft).await?;
        *data = draft;
        Ok(out)
    }

    async fn persist(&self, data: &StoreData) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(data).map_err(|e| CleanupError::Persistence {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CleanupError::from_io_error(e, "creating store directory", Some(parent.to_path_buf())))?;
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| CleanupError::from_io_error(e, "writing store", Some(tmp.clone())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| CleanupError::from_io_error(e, "replacing store", Some(path.clone())))?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for JsonStore {
    async fn get_config(&self, name: &str) -> Result<CleanupConfig> {
        self.read(|d| d.configs.iter().find(|c| c.name == name).cloned())
            .await
            .ok_or_else(|| CleanupError::NotConfigured { name: name.to_string() })
    }

    async fn update_config(&self, name: &str, patch: ConfigPatch) -> Result<CleanupConfig> {
        let config = self
            .mutate(|d| {
                if let Some(existing) = d.configs.iter_mut().find(|c| c.name == name) {
                    let mut updated = existing.clone();
                    patch.apply(&mut updated);
                    updated.validate()?;
                    *existing = updated.clone();
                    return Ok(updated);
                }

                let project_path = patch.project_path.clone().ok_or_else(|| CleanupError::InvalidConfig {
                    field: "projectPath".into(),
                    reason: "required when creating a configuration".into(),
                })?;
                let target = patch.target_directory.clone().ok_or_else(|| CleanupError::InvalidConfig {
                    field: "targetDirectory".into(),
                    reason: "required when creating a configuration".into(),
                })?;
                let mut created = CleanupConfig::new(name, project_path, target);
                patch.apply(&mut created);
                created.validate()?;
                d.configs.push(created.clone());
                Ok(created)
            })
            .await?;

        info!(config = name, "cleanup configuration updated");
        Ok(config)
    }

    async fn list_patterns(&self, include_inactive: bool) -> Result<Vec<CleanupPattern>> {
        Ok(self.read(|d| d.patterns.list(include_inactive)).await)
    }

    async fn create_pattern(&self, data: NewPattern) -> Result<CleanupPattern> {
        let row = self
            .mutate(|d| {
                let id = d.allocate_id();
                d.patterns.insert(data.into_record(id))
            })
            .await?;
        info!(pattern = %row.pattern, priority = row.priority, "cleanup pattern created");
        Ok(row)
    }

    async fn update_pattern(&self, id: u64, patch: PatternPatch) -> Result<CleanupPattern> {
        let row = self.mutate(|d| d.patterns.update(id, |row| patch.apply(row))).await?;
        info!(pattern = %row.pattern, "cleanup pattern updated");
        Ok(row)
    }

    async fn delete_pattern(&self, id: u64) -> Result<()> {
        self.mutate(|d| d.patterns.delete(id)).await?;
        info!(id, "cleanup pattern deleted");
        Ok(())
    }

    async fn list_exclude_files(&self, include_inactive: bool) -> Result<Vec<CleanupExcludeFile>> {
        Ok(self.read(|d| d.exclude_files.list(include_inactive)).await)
    }

    async fn create_exclude_file(&self, data: NewExcludeFile) -> Result<CleanupExcludeFile> {
        let row = self
            .mutate(|d| {
                let id = d.allocate_id();
                d.exclude_files.insert(data.into_record(id))
            })
            .await?;
        info!(file = %row.file_name, "excluded file added");
        Ok(row)
    }

    async fn update_exclude_file(&self, id: u64, patch: ExcludeFilePatch) -> Result<CleanupExcludeFile> {
        let row = self.mutate(|d| d.exclude_files.update(id, |row| patch.apply(row))).await?;
        info!(file = %row.file_name, "excluded file updated");
        Ok(row)
    }

    async fn delete_exclude_file(&self, id: u64) -> Result<()> {
        self.mutate(|d| d.exclude_files.delete(id)).await?;
        info!(id, "excluded file removed");
        Ok(())
    }

    async fn list_exclude_dirs(&self, include_inactive: bool) -> Result<Vec<CleanupExcludeDirectory>> {
        Ok(self.read(|d| d.exclude_dirs.list(include_inactive)).await)
    }

    async fn create_exclude_dir(&self, data: NewExcludeDirectory) -> Result<CleanupExcludeDirectory> {
        let row = self
            .mutate(|d| {
                let id = d.allocate_id();
                d.exclude_dirs.insert(data.into_record(id))
            })
            .await?;
        info!(directory = %row.directory, "excluded directory added");
        Ok(row)
    }

    async fn update_exclude_dir(&self, id: u64, patch: ExcludeDirectoryPatch) -> Result<CleanupExcludeDirectory> {
        let row = self.mutate(|d| d.exclude_dirs.update(id, |row| patch.apply(row))).await?;
        info!(directory = %row.directory, "excluded directory updated");
        Ok(row)
    }

    async fn delete_exclude_dir(&self, id: u64) -> Result<()> {
        self.mutate(|d| d.exclude_dirs.delete(id)).await?;
        info!(id, "excluded directory removed");
        Ok(())
    }

    async fn list_schedules(&self, include_inactive: bool) -> Result<Vec<CleanupSchedule>> {
        Ok(self.read(|d| d.schedules.list(include_inactive)).await)
    }

    async fn create_schedule(&self, data: NewSchedule) -> Result<CleanupSchedule> {
        let row = self
            .mutate(|d| {
                let id = d.allocate_id();
                d.schedules.insert(data.into_record(id))
            })
            .await?;
        info!(name = %row.name, cron = %row.cron_expression, "cleanup schedule created");
        Ok(row)
    }

    async fn update_schedule(&self, id: u64, patch: SchedulePatch) -> Result<CleanupSchedule> {
        let row = self.mutate(|d| d.schedules.update(id, |row| patch.apply(row))).await?;
        info!(name = %row.name, "cleanup schedule updated");
        Ok(row)
    }

    async fn delete_schedule(&self, id: u64) -> Result<()> {
        self.mutate(|d| d.schedules.delete(id)).await?;
        info!(id, "cleanup schedule deleted");
        Ok(())
    }

    async fn record_execution(&self, log: ExecutionLog) -> Result<()> {
        self.mutate(|d| {
            d.executions.push(log);
            if d.executions.len() > MAX_EXECUTION_LOGS {
                let overflow = d.executions.len() - MAX_EXECUTION_LOGS;
                d.executions = d.executions.split_off(overflow);
            }
            Ok(())
        })
        .await
    }

    async fn list_executions(&self, filter: ExecutionFilter) -> Result<Vec<ExecutionLog>> {
        let limit = filter.limit.unwrap_or(ExecutionFilter::DEFAULT_LIMIT);
        let mut logs: Vec<ExecutionLog> = self
            .read(|d| d.executions.iter().filter(|log| filter.matches(log)).cloned().collect())
            .await;
        logs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        logs.truncate(limit);
        Ok(logs)
    }

    async fn daily_stats(&self, days: u32) -> Result<Vec<DailyStats>> {
        let since = (Utc::now() - Duration::days(i64::from(days))).date_naive();
        Ok(self.read(|d| aggregate_daily(&d.executions, since)).await)
    }
}
