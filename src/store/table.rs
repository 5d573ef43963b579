// Generic row set used by the JSON store

use serde::{Deserialize, Serialize};

use super::model::Record;
use crate::error::{CleanupError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Table<T> {
    rows: Vec<T>,
}

// Manual impl so rows need not implement Default
impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Record> Table<T> {
    pub fn list(&self, include_inactive: bool) -> Vec<T> {
        let mut rows: Vec<T> = self
            .rows
            .iter()
            .filter(|row| include_inactive || row.is_active())
            .cloned()
            .collect();
        rows.sort_by(T::ordering);
        rows
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.iter().any(|row| row.unique_key() == key)
    }

    pub fn insert(&mut self, row: T) -> Result<T> {
        row.validate()?;
        if self.contains_key(row.unique_key()) {
            return Err(CleanupError::DuplicateRecord {
                kind: T::KIND.to_string(),
                value: row.unique_key().to_string(),
            });
        }
        self.rows.push(row.clone());
        Ok(row)
    }

    pub fn update(&mut self, id: u64, apply: impl FnOnce(&mut T)) -> Result<T> {
        let idx = self.position(id)?;
        let mut updated = self.rows[idx].clone();
        apply(&mut updated);
        updated.validate()?;

        let clash = self
            .rows
            .iter()
            .any(|row| row.id() != id && row.unique_key() == updated.unique_key());
        if clash {
            return Err(CleanupError::DuplicateRecord {
                kind: T::KIND.to_string(),
                value: updated.unique_key().to_string(),
            });
        }

        self.rows[idx] = updated.clone();
        Ok(updated)
    }

    pub fn delete(&mut self, id: u64) -> Result<()> {
        let idx = self.position(id)?;
        self.rows.remove(idx);
        Ok(())
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.rows
            .iter()
            .position(|row| row.id() == id)
            .ok_or_else(|| CleanupError::RecordNotFound {
                kind: T::KIND.to_string(),
                id,
            })
    }
}
