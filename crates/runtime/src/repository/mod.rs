//! Snapshot persistence contracts and implementations.
//!
//! One current-version snapshot document per store. A failed load is
//! distinguishable from "no snapshot found": `Ok(None)` means nothing is
//! persisted, `Err(_)` means a snapshot exists but could not be read back.

mod file;
mod memory;

use serde_json::Value;
use thiserror::Error;

pub use file::FileSnapshotRepository;
pub use memory::InMemorySnapshotRepository;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("snapshot repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Repository for the persisted snapshot document.
pub trait SnapshotRepository: Send + Sync {
    /// Persist the current-version snapshot document.
    fn save(&self, document: &Value) -> Result<()>;

    /// Load the persisted snapshot, `None` when nothing is stored.
    fn load(&self) -> Result<Option<Value>>;

    /// Remove every stored snapshot, including stale foreign versions.
    fn clear(&self) -> Result<()>;
}
