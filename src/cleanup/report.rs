//! Session artifacts: the human-readable README and the restore manifest.

use chrono::{DateTime, Local, Utc};
use humansize::{format_size, BINARY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{CleanupError, Result};

pub const MANIFEST_FILE: &str = "cleanup-manifest.json";
pub const README_FILE: &str = "README.md";
pub const MANIFEST_VERSION: &str = "2.0";

/// Restore manifest written into every session folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub project_root: PathBuf,
    pub cleanup_path: PathBuf,
    pub preserve_structure: bool,
    pub patterns: Vec<String>,
    pub excluded_files: usize,
    pub excluded_dirs: usize,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub original: PathBuf,
    pub destination: PathBuf,
    /// Forward-slash path relative to the project root.
    pub relative_path: String,
    pub size: u64,
    /// BLAKE3 of the copied bytes, hex encoded.
    pub checksum: String,
}

impl Manifest {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub async fn write(&self, session_dir: &Path) -> Result<PathBuf> {
        let path = session_dir.join(MANIFEST_FILE);
        let json = serde_json::to_vec_pretty(self).map_err(|e| CleanupError::ManifestParseError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| CleanupError::from_io_error(e, "writing manifest", Some(path.clone())))?;
        Ok(path)
    }

    pub async fn read(session_dir: &Path) -> Result<Self> {
        let path = session_dir.join(MANIFEST_FILE);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CleanupError::ManifestMissing {
                    path: session_dir.to_path_buf(),
                })
            }
            Err(e) => return Err(CleanupError::from_io_error(e, "reading manifest", Some(path))),
        };
        serde_json::from_slice(&bytes).map_err(|e| CleanupError::ManifestParseError {
            path,
            reason: e.to_string(),
        })
    }
}

/// BLAKE3 checksum of a file, computed on a blocking thread.
pub async fn checksum_file(path: &Path) -> std::io::Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update_reader(file)?;
        Ok::<_, std::io::Error>(hasher.finalize().to_hex().to_string())
    })
    .await
    .map_err(std::io::Error::other)?
}

/// Inputs for the session README.
#[derive(Debug, Clone)]
pub struct ReadmeSummary<'a> {
    pub session_name: &'a str,
    pub session_path: &'a Path,
    pub project_root: &'a Path,
    pub files_copied: usize,
    pub total_size: u64,
    pub by_pattern: &'a BTreeMap<String, usize>,
    /// Matched files that could not be copied.
    pub copy_failures: usize,
    /// Entries the walk could not read or stat.
    pub scan_problems: usize,
    pub preserve_structure: bool,
    pub created_at: DateTime<Local>,
}

pub fn render_readme(summary: &ReadmeSummary<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Cleanup Session - {}", summary.session_name);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out, "- **Files Copied**: {}", summary.files_copied);
    let _ = writeln!(out, "- **Total Size**: {}", format_size(summary.total_size, BINARY));
    let _ = writeln!(out, "- **Date**: {}", summary.created_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "- **Source**: {}", summary.project_root.display());
    let _ = writeln!(out, "- **Location**: {}", summary.session_path.display());
    if summary.copy_failures > 0 {
        let _ = writeln!(out, "- **Errors**: {} files could not be copied", summary.copy_failures);
    }
    if summary.scan_problems > 0 {
        let _ = writeln!(out, "- **Skipped**: {} entries could not be read during the scan", summary.scan_problems);
    }
    let _ = writeln!(out);

    if !summary.by_pattern.is_empty() {
        let _ = writeln!(out, "## Patterns Matched");
        for (pattern, count) in summary.by_pattern {
            let _ = writeln!(out, "- `{}`: {}", pattern, count);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "## How to Restore");
    let _ = writeln!(out, "Run `richiesta-cleanup restore {}` to copy the files back,", summary.session_name);
    if summary.preserve_structure {
        let _ = writeln!(out, "or copy them manually using the preserved directory structure.");
    } else {
        let _ = writeln!(out, "Files are stored flat; the manifest maps each one to its original path.");
    }
    let _ = writeln!(out, "The full file list is in `{}`.", MANIFEST_FILE);
    out
}
