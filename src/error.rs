// Centralized error handling module
// Error types with context for configuration, store and filesystem operations

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for the cleanup pipeline
#[derive(Debug)]
pub enum CleanupError {
    /// Configuration errors
    NotConfigured { name: String },
    InvalidConfig { field: String, reason: String },
    InvalidPattern { pattern: String, reason: String },
    InvalidSchedule { expression: String, reason: String },

    /// Destination resolves inside the project tree
    DestinationInsideProject { project: PathBuf, destination: PathBuf },

    /// Another run of the same operation is in flight
    AlreadyRunning { operation: String },

    /// Store errors
    RecordNotFound { kind: String, id: u64 },
    DuplicateRecord { kind: String, value: String },
    Persistence { path: PathBuf, reason: String },

    /// Session errors
    SessionNotFound { path: PathBuf },
    ManifestMissing { path: PathBuf },
    ManifestParseError { path: PathBuf, reason: String },

    /// File system errors with context
    FileNotFound { path: PathBuf },
    DirectoryNotFound { path: PathBuf },
    PermissionDenied { path: PathBuf, operation: String },
    IoError { path: Option<PathBuf>, operation: String, source: io::Error },
}

impl fmt::Display for CleanupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CleanupError::NotConfigured { name } => {
                writeln!(f, "Cleanup configuration '{}' not found", name)?;
                write!(f, "Suggestion: Run 'config set' or 'seed' to create it")
            }
            CleanupError::InvalidConfig { field, reason } => {
                write!(f, "Invalid cleanup configuration ({}): {}", field, reason)
            }
            CleanupError::InvalidPattern { pattern, reason } => {
                writeln!(f, "Invalid pattern '{}': {}", pattern, reason)?;
                write!(f, "Suggestion: Use glob syntax such as '*.log' or 'temp-*.ts'")
            }
            CleanupError::InvalidSchedule { expression, reason } => {
                writeln!(f, "Invalid cron expression '{}': {}", expression, reason)?;
                write!(f, "Suggestion: Use five fields, e.g. '0 3 * * *'")
            }
            CleanupError::DestinationInsideProject { project, destination } => {
                writeln!(
                    f,
                    "Destination {} is inside the project {}",
                    destination.display(),
                    project.display()
                )?;
                write!(f, "Suggestion: Point targetDirectory at an absolute path outside the project")
            }
            CleanupError::AlreadyRunning { operation } => {
                write!(f, "A {} operation is already running", operation)
            }
            CleanupError::RecordNotFound { kind, id } => {
                write!(f, "{} with id {} not found", kind, id)
            }
            CleanupError::DuplicateRecord { kind, value } => {
                write!(f, "{} '{}' already exists", kind, value)
            }
            CleanupError::Persistence { path, reason } => {
                writeln!(f, "Failed to persist store {}: {}", path.display(), reason)?;
                write!(f, "Suggestion: Check disk space and write permissions")
            }
            CleanupError::SessionNotFound { path } => {
                write!(f, "Cleanup session not found: {}", path.display())
            }
            CleanupError::ManifestMissing { path } => {
                writeln!(f, "Manifest not found in {}", path.display())?;
                write!(f, "Suggestion: Restore requires the cleanup-manifest.json written by execute")
            }
            CleanupError::ManifestParseError { path, reason } => {
                write!(f, "Error parsing manifest {}: {}", path.display(), reason)
            }
            CleanupError::FileNotFound { path } => {
                write!(f, "File not found: {}", path.display())
            }
            CleanupError::DirectoryNotFound { path } => {
                writeln!(f, "Directory not found: {}", path.display())?;
                write!(f, "Suggestion: Check that projectPath exists")
            }
            CleanupError::PermissionDenied { path, operation } => {
                writeln!(f, "Permission denied while {}: {}", operation, path.display())?;
                write!(f, "Suggestion: Check file permissions or run with appropriate privileges")
            }
            CleanupError::IoError { path, operation, source } => {
                if let Some(p) = path {
                    write!(f, "I/O error while {} {}: {}", operation, p.display(), source)
                } else {
                    write!(f, "I/O error while {}: {}", operation, source)
                }
            }
        }
    }
}

impl std::error::Error for CleanupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CleanupError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl CleanupError {
    /// Create an error from io::Error with context about the operation and optional path
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        match (err.kind(), path) {
            (io::ErrorKind::NotFound, Some(p)) => {
                if operation.contains("directory") {
                    CleanupError::DirectoryNotFound { path: p }
                } else {
                    CleanupError::FileNotFound { path: p }
                }
            }
            (io::ErrorKind::PermissionDenied, Some(p)) => CleanupError::PermissionDenied {
                path: p,
                operation: operation.to_string(),
            },
            (_, path) => CleanupError::IoError {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }

    /// Whether the error stems from configuration rather than the filesystem
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CleanupError::NotConfigured { .. }
                | CleanupError::InvalidConfig { .. }
                | CleanupError::InvalidPattern { .. }
                | CleanupError::InvalidSchedule { .. }
        )
    }
}

impl From<io::Error> for CleanupError {
    fn from(err: io::Error) -> Self {
        CleanupError::from_io_error(err, "unknown operation", None)
    }
}

pub type Result<T, E = CleanupError> = std::result::Result<T, E>;
