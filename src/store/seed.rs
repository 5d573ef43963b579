// Default rule seeding
// Populates the store with the patterns and exclusions the platform ships with

use serde::Serialize;
use tracing::info;

use super::model::{Criticality, NewExcludeDirectory, NewExcludeFile, NewPattern};
use super::ConfigStore;
use crate::error::Result;

/// Patterns for scratch files left behind by maintenance work: (pattern, description).
pub const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("*.backup-*", "Temporary backup files"),
    ("*.quickfix-*", "Editor quickfix files"),
    ("test-*.sh", "Test scripts"),
    ("fix-*.sh", "Temporary fix scripts"),
    ("check-*.sh", "Check scripts"),
    ("debug-*.sh", "Debug scripts"),
    ("*.fixed.ts", "Patched TypeScript files"),
    ("*.fixed.tsx", "Patched React files"),
    ("backup-*.sql", "Temporary SQL dumps"),
    ("*.tmp", "Temporary files"),
    ("*.log.old", "Rotated logs"),
    ("BACKUP-*/", "Backup folders"),
    ("*.DELETE", "Files marked for deletion"),
    ("temp-*.js", "Temporary JavaScript files"),
    ("temp-*.ts", "Temporary TypeScript files"),
];

/// Files that must never be swept: (file name, reason, criticality).
pub const DEFAULT_EXCLUDED_FILES: &[(&str, &str, Criticality)] = &[
    (".env", "Environment configuration", Criticality::Critical),
    (".env.local", "Local configuration", Criticality::Critical),
    (".env.production", "Production configuration", Criticality::Critical),
    ("package-lock.json", "npm lockfile", Criticality::Important),
    ("yarn.lock", "yarn lockfile", Criticality::Important),
    ("package.json", "Project manifest", Criticality::Critical),
    ("prisma/schema.prisma", "Database schema", Criticality::Critical),
    ("README.md", "Project documentation", Criticality::Important),
];

/// Directories whose subtrees are skipped: (directory, reason).
pub const DEFAULT_EXCLUDED_DIRS: &[(&str, &str)] = &[
    ("node_modules", "npm dependencies"),
    (".git", "Version control data"),
    ("dist", "Production build"),
    ("build", "Application build"),
    (".next", "Framework cache"),
    ("backend/backups", "Permanent backups"),
    ("uploads", "User uploads"),
    ("database-backups", "Database backups"),
    ("CLEANUP-*", "Previous cleanup sessions"),
];

/// Rows added by [`seed_defaults`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub patterns: usize,
    pub excluded_files: usize,
    pub excluded_dirs: usize,
}

/// Insert every default row not already present. Existing rows are left alone.
pub async fn seed_defaults(store: &dyn ConfigStore) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let existing: Vec<String> = store
        .list_patterns(true)
        .await?
        .into_iter()
        .map(|p| p.pattern)
        .collect();
    for (priority, (pattern, description)) in DEFAULT_PATTERNS.iter().enumerate() {
        if existing.iter().any(|p| p == pattern) {
            continue;
        }
        store
            .create_pattern(NewPattern::new(*pattern, priority as i32 + 1).with_description(*description))
            .await?;
        report.patterns += 1;
    }

    let existing: Vec<String> = store
        .list_exclude_files(true)
        .await?
        .into_iter()
        .map(|f| f.file_name)
        .collect();
    for (file_name, reason, criticality) in DEFAULT_EXCLUDED_FILES {
        if existing.iter().any(|f| f == file_name) {
            continue;
        }
        store
            .create_exclude_file(
                NewExcludeFile::new(*file_name)
                    .with_reason(*reason)
                    .with_criticality(*criticality),
            )
            .await?;
        report.excluded_files += 1;
    }

    let existing: Vec<String> = store
        .list_exclude_dirs(true)
        .await?
        .into_iter()
        .map(|d| d.directory)
        .collect();
    for (directory, reason) in DEFAULT_EXCLUDED_DIRS {
        if existing.iter().any(|d| d == directory) {
            continue;
        }
        store
            .create_exclude_dir(NewExcludeDirectory::new(*directory).with_reason(*reason))
            .await?;
        report.excluded_dirs += 1;
    }

    info!(
        patterns = report.patterns,
        excluded_files = report.excluded_files,
        excluded_dirs = report.excluded_dirs,
        "default cleanup rules seeded"
    );
    Ok(report)
}
