//! Per-operation mutual exclusion.
//!
//! At most one run per [`OperationKind`] is in flight. The guard releases the
//! slot when dropped, whether the run finished, failed or unwound.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::{CleanupError, Result};
use crate::store::OperationKind;

#[derive(Debug, Clone, Default)]
pub struct OperationLocks {
    running: Arc<Mutex<HashSet<OperationKind>>>,
}

impl OperationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `kind`, failing with `AlreadyRunning` when taken.
    pub fn acquire(&self, kind: OperationKind) -> Result<OperationGuard> {
        let mut running = self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !running.insert(kind) {
            return Err(CleanupError::AlreadyRunning {
                operation: kind.to_string(),
            });
        }
        Ok(OperationGuard {
            kind,
            running: Arc::clone(&self.running),
        })
    }

    pub fn is_running(&self, kind: OperationKind) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&kind)
    }
}

/// Holds an operation slot until dropped.
#[derive(Debug)]
pub struct OperationGuard {
    kind: OperationKind,
    running: Arc<Mutex<HashSet<OperationKind>>>,
}

impl OperationGuard {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        let mut running = self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        running.remove(&self.kind);
    }
}
