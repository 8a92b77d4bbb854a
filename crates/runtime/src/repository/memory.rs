//! In-memory SnapshotRepository for tests and ephemeral sessions.

use std::sync::Mutex;

use serde_json::Value;

use crate::repository::{RepositoryError, Result, SnapshotRepository};

/// In-memory implementation of SnapshotRepository.
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    slot: Mutex<Option<Value>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn save(&self, document: &Value) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        *slot = Some(document.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Value>> {
        let slot = self.slot.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slot.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }
}
