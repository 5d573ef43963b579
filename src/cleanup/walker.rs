// Directory walking module
// Iterative traversal and classification of files against cleanup rules

use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::rules::{ExclusionRules, PatternSet};
use crate::error::{CleanupError, Result};

/// Key used in by-type counts for files without an extension.
pub const NO_EXTENSION: &str = "no-extension";

/// A file selected by a cleanup pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedFile {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub size: u64,
    /// Extension without the dot, or [`NO_EXTENSION`].
    pub file_type: String,
    pub pattern: String,
}

/// A per-file failure that was recorded and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProblem {
    pub path: PathBuf,
    pub operation: String,
    pub message: String,
}

impl FileProblem {
    pub fn new(path: impl Into<PathBuf>, operation: &str, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for FileProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to {} {}: {}", self.operation, self.path.display(), self.message)
    }
}

/// Statistics and matches collected during a walk
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// Matched files in traversal order (directories visited by name).
    pub files: Vec<MatchedFile>,
    pub problems: Vec<FileProblem>,
    pub directories_scanned: usize,
    pub files_seen: usize,
    /// Files and directories skipped by exclusion rules.
    pub excluded: usize,
}

impl WalkOutcome {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Extension used for by-type grouping.
pub fn file_type_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// Walks a project tree with an explicit work-list.
pub struct Walker<'a> {
    root: &'a Path,
    patterns: &'a PatternSet,
    exclusions: &'a ExclusionRules,
    max_depth: Option<usize>,
}

struct PendingDir {
    path: PathBuf,
    relative: PathBuf,
    depth: usize,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Path, patterns: &'a PatternSet, exclusions: &'a ExclusionRules) -> Self {
        Self {
            root,
            patterns,
            exclusions,
            max_depth: None,
        }
    }

    /// Limit descent; entries directly under the root are depth 0.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Walk the tree. Only a missing or unreadable root is an error; everything
    /// below it is recorded as a problem and skipped.
    pub async fn walk(&self) -> Result<WalkOutcome> {
        let meta = fs::metadata(self.root)
            .await
            .map_err(|e| CleanupError::from_io_error(e, "scanning directory", Some(self.root.to_path_buf())))?;
        if !meta.is_dir() {
            return Err(CleanupError::DirectoryNotFound {
                path: self.root.to_path_buf(),
            });
        }

        let mut outcome = WalkOutcome::default();
        let mut stack = vec![PendingDir {
            path: self.root.to_path_buf(),
            relative: PathBuf::new(),
            depth: 0,
        }];

        while let Some(dir) = stack.pop() {
            outcome.directories_scanned += 1;

            let listing = read_sorted(&dir.path, &mut outcome.problems).await;
            let entries = match listing {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.path.display(), error = %e, "failed to read directory, skipping");
                    outcome.problems.push(FileProblem::new(&dir.path, "read directory", e));
                    continue;
                }
            };

            let mut subdirs = Vec::new();
            for (name, path, file_type) in entries {
                let relative = dir.relative.join(&name);

                if file_type.is_symlink() {
                    debug!(path = %path.display(), "skipping symbolic link");
                    continue;
                }

                if file_type.is_dir() {
                    if self.exclusions.is_dir_excluded(&relative) {
                        debug!(dir = %relative.display(), "directory excluded");
                        outcome.excluded += 1;
                        continue;
                    }
                    if self.max_depth.is_some_and(|max| dir.depth + 1 > max) {
                        continue;
                    }
                    subdirs.push(PendingDir {
                        path,
                        relative,
                        depth: dir.depth + 1,
                    });
                    continue;
                }

                outcome.files_seen += 1;
                if self.exclusions.is_file_excluded(&relative) {
                    outcome.excluded += 1;
                    continue;
                }

                let Some(pattern) = self.patterns.first_match(&relative) else {
                    continue;
                };

                match fs::metadata(&path).await {
                    Ok(meta) => outcome.files.push(MatchedFile {
                        file_type: file_type_of(&path),
                        path,
                        relative_path: relative,
                        size: meta.len(),
                        pattern: pattern.to_string(),
                    }),
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "failed to stat file, skipping");
                        outcome.problems.push(FileProblem::new(&path, "stat", e));
                    }
                }
            }

            // Reverse so the stack pops directories in name order
            stack.extend(subdirs.into_iter().rev());
        }

        debug!(
            root = %self.root.display(),
            matched = outcome.files.len(),
            seen = outcome.files_seen,
            dirs = outcome.directories_scanned,
            "walk complete"
        );
        Ok(outcome)
    }
}

type DirEntryInfo = (OsString, PathBuf, std::fs::FileType);

/// Read a directory in name order. An entry whose type cannot be read is
/// recorded in `problems` without dropping its siblings.
async fn read_sorted(dir: &Path, problems: &mut Vec<FileProblem>) -> std::io::Result<Vec<DirEntryInfo>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut raw = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let file_type = entry.file_type().await;
        raw.push((entry.file_name(), entry.path(), file_type));
    }
    Ok(keep_typed(raw, problems))
}

fn keep_typed(
    raw: Vec<(OsString, PathBuf, std::io::Result<std::fs::FileType>)>,
    problems: &mut Vec<FileProblem>,
) -> Vec<DirEntryInfo> {
    let mut entries: Vec<DirEntryInfo> = raw
        .into_iter()
        .filter_map(|(name, path, file_type)| match file_type {
            Ok(file_type) => Some((name, path, file_type)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read entry type, skipping");
                problems.push(FileProblem::new(&path, "stat", e));
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}
