//! Pattern and exclusion matching for cleanup walks.
//!
//! Patterns are tried in priority order and the first match wins. Exclusions
//! are checked before patterns: an excluded directory prunes its subtree, an
//! excluded file is never classified.

use globset::{GlobBuilder, GlobMatcher};
use std::path::{Component, Path, PathBuf};

use crate::error::{CleanupError, Result};
use crate::store::{CleanupExcludeDirectory, CleanupExcludeFile, CleanupPattern, Record};

/// Check if a string contains wildcard characters
pub fn contains_wildcard(s: &str) -> bool {
    s.contains('*') || s.contains('?') || s.contains('[') || s.contains('{')
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| CleanupError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Which part of a path a pattern is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternScope {
    /// `*.log` - the file name only.
    FileName,
    /// `scripts/*.sh` - the path relative to the project root.
    RelativePath,
    /// `BACKUP-*/` - any ancestor directory name.
    Directory,
}

/// One compiled cleanup pattern.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: String,
    scope: PatternScope,
    matcher: GlobMatcher,
}

impl PatternRule {
    pub fn compile(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        let (scope, glob) = if let Some(dir) = trimmed.strip_suffix('/') {
            (PatternScope::Directory, dir)
        } else if trimmed.contains('/') {
            (PatternScope::RelativePath, trimmed)
        } else {
            (PatternScope::FileName, trimmed)
        };

        if glob.is_empty() {
            return Err(CleanupError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "empty pattern".into(),
            });
        }

        Ok(Self {
            pattern: pattern.to_string(),
            scope,
            matcher: compile(glob)?,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn scope(&self) -> PatternScope {
        self.scope
    }

    /// Test a file path relative to the project root.
    pub fn matches(&self, relative: &Path) -> bool {
        match self.scope {
            PatternScope::FileName => relative
                .file_name()
                .is_some_and(|name| self.matcher.is_match(name)),
            PatternScope::RelativePath => self.matcher.is_match(relative),
            PatternScope::Directory => relative
                .parent()
                .into_iter()
                .flat_map(Path::components)
                .any(|c| matches!(c, Component::Normal(name) if self.matcher.is_match(name))),
        }
    }
}

/// Patterns in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    rules: Vec<PatternRule>,
}

impl PatternSet {
    /// Compile the active rows, lowest priority first; ties keep creation order.
    pub fn from_rows(rows: &[CleanupPattern]) -> Result<Self> {
        let mut active: Vec<&CleanupPattern> = rows.iter().filter(|p| p.is_active).collect();
        active.sort_by(|a, b| CleanupPattern::ordering(a, b));

        let rules = active
            .into_iter()
            .map(|row| PatternRule::compile(&row.pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Compile patterns already in evaluation order.
    pub fn from_patterns(patterns: &[&str]) -> Result<Self> {
        let rules = patterns
            .iter()
            .map(|p| PatternRule::compile(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// The first pattern matching `relative`, if any.
    pub fn first_match(&self, relative: &Path) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(relative))
            .map(PatternRule::pattern)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(PatternRule::pattern)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A single exclusion entry.
#[derive(Debug, Clone)]
enum ExcludeRule {
    /// Exact entry name.
    Name(String),
    /// Glob on the entry name.
    NameGlob(GlobMatcher),
    /// Exact relative path; for directories also a prefix of deeper paths.
    Path(PathBuf),
    /// Glob on the relative path.
    PathGlob(GlobMatcher),
}

impl ExcludeRule {
    fn compile(entry: &str) -> Result<Self> {
        let raw = entry;
        let entry = entry.trim().trim_end_matches('/');
        if entry.is_empty() {
            return Err(CleanupError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "empty exclusion".into(),
            });
        }
        let as_path = entry.contains('/');
        Ok(match (as_path, contains_wildcard(entry)) {
            (false, false) => ExcludeRule::Name(entry.to_string()),
            (false, true) => ExcludeRule::NameGlob(compile(entry)?),
            (true, false) => ExcludeRule::Path(PathBuf::from(entry)),
            (true, true) => ExcludeRule::PathGlob(compile(entry)?),
        })
    }

    fn matches(&self, relative: &Path, prefix_ok: bool) -> bool {
        match self {
            ExcludeRule::Name(name) => relative.file_name().is_some_and(|n| n == name.as_str()),
            ExcludeRule::NameGlob(glob) => relative.file_name().is_some_and(|n| glob.is_match(n)),
            ExcludeRule::Path(path) => {
                if prefix_ok {
                    relative.starts_with(path)
                } else {
                    relative == path
                }
            }
            ExcludeRule::PathGlob(glob) => glob.is_match(relative),
        }
    }
}

/// Active exclusion lists, compiled.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    files: Vec<ExcludeRule>,
    dirs: Vec<ExcludeRule>,
}

impl ExclusionRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(files: &[CleanupExcludeFile], dirs: &[CleanupExcludeDirectory]) -> Result<Self> {
        let files = files
            .iter()
            .filter(|f| f.is_active)
            .map(|f| ExcludeRule::compile(&f.file_name))
            .collect::<Result<Vec<_>>>()?;
        let dirs = dirs
            .iter()
            .filter(|d| d.is_active)
            .map(|d| ExcludeRule::compile(&d.directory))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { files, dirs })
    }

    pub fn from_lists(files: &[&str], dirs: &[&str]) -> Result<Self> {
        Ok(Self {
            files: files.iter().map(|f| ExcludeRule::compile(f)).collect::<Result<_>>()?,
            dirs: dirs.iter().map(|d| ExcludeRule::compile(d)).collect::<Result<_>>()?,
        })
    }

    /// Reject an exclusion entry that would not compile into a rule.
    pub fn check_entry(entry: &str) -> Result<()> {
        ExcludeRule::compile(entry).map(|_| ())
    }

    /// Whether a directory (relative to the project root) is pruned.
    pub fn is_dir_excluded(&self, relative: &Path) -> bool {
        self.dirs.iter().any(|rule| rule.matches(relative, true))
    }

    /// Whether a file (relative to the project root) is skipped.
    pub fn is_file_excluded(&self, relative: &Path) -> bool {
        self.files.iter().any(|rule| rule.matches(relative, false))
    }

    /// Whether any ancestor directory of `relative`, or the file itself, is excluded.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if self.is_file_excluded(relative) {
            return true;
        }
        let mut prefix = PathBuf::new();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                prefix.push(component);
                if self.is_dir_excluded(&prefix) {
                    return true;
                }
            }
        }
        false
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }
}
