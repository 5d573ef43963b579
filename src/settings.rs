//! Runtime settings read from a TOML file.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! The default location is `<config_dir>/richiesta-cleanup/settings.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CleanupError, Result};
use crate::schedule::jobs::{DEFAULT_ORPHAN_CRON, DEFAULT_STATS_CRON};
use crate::store::{CleanupConfig, DEFAULT_CONFIG_NAME};

const APP_DIR: &str = "richiesta-cleanup";
const SETTINGS_FILE: &str = "settings.toml";
const STORE_FILE: &str = "store.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON document holding configuration rows and the execution log.
    pub store_path: PathBuf,
    /// Name of the configuration row used by cleanup runs.
    pub config_name: String,
    /// Project root used when the store has no configuration row yet.
    pub project_path: PathBuf,
    /// Destination used when the store has no configuration row yet.
    pub target_directory: PathBuf,
    pub uploads_dir: PathBuf,
    /// One referenced upload path per line.
    pub references_file: PathBuf,
    pub orphan_cron: String,
    pub orphan_dry_run: bool,
    pub orphan_min_age_hours: u64,
    pub stats_cron: String,
    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)));
        Self {
            store_path: data_dir.join(STORE_FILE),
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            project_path: PathBuf::from("."),
            target_directory: PathBuf::from("../cleanup-backups"),
            uploads_dir: PathBuf::from("uploads"),
            references_file: PathBuf::from("references.txt"),
            orphan_cron: DEFAULT_ORPHAN_CRON.to_string(),
            orphan_dry_run: false,
            orphan_min_age_hours: 24,
            stats_cron: DEFAULT_STATS_CRON.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load settings. An explicit path must exist; the default path may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| CleanupError::from_io_error(e, "reading settings file", Some(path.clone())))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| CleanupError::InvalidConfig {
            field: "settings".to_string(),
            reason: e.to_string(),
        })
    }

    /// Configuration used until one is stored.
    pub fn fallback_config(&self) -> CleanupConfig {
        CleanupConfig::new(&self.config_name, &self.project_path, &self.target_directory)
    }
}
