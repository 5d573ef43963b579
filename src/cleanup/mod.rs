//! Cleanup pipeline: rule compilation, tree walking, preview and execution.

pub mod locks;
pub mod paths;
pub mod report;
pub mod rules;
pub mod service;
pub mod walker;

pub use locks::{OperationGuard, OperationLocks};
pub use report::{Manifest, ManifestEntry, MANIFEST_FILE, README_FILE};
pub use rules::{ExclusionRules, PatternRule, PatternScope, PatternSet};
pub use service::{
    execute, preview, CleanupPlan, CleanupService, ExecutionResult, PreviewFile, PreviewResult, RestoreResult,
    SessionInfo, PREVIEW_FILE_LIMIT,
};
pub use walker::{FileProblem, MatchedFile, WalkOutcome, Walker};
