//! File-based SnapshotRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::repository::{RepositoryError, Result, SnapshotRepository};
use crate::snapshot::SNAPSHOT_VERSION;

/// File-based implementation of SnapshotRepository.
///
/// The current document lives at `snapshot_v{N}.json`. Writes go through a
/// temp file and an atomic rename so a crash mid-write never leaves a
/// half-written snapshot behind; `clear` purges every `snapshot_v*.json`,
/// so documents from older or newer versions are never left orphaned.
pub struct FileSnapshotRepository {
    base_dir: PathBuf,
}

impl FileSnapshotRepository {
    /// Create a new file-based snapshot repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.base_dir
            .join(format!("snapshot_v{}.json", SNAPSHOT_VERSION))
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn save(&self, document: &Value) -> Result<()> {
        let path = self.snapshot_path();
        let temp_path = path.with_extension("json.tmp");

        let text = serde_json::to_string_pretty(document)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;

        fs::write(&temp_path, text).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved snapshot to {}", path.display());

        Ok(())
    }

    fn load(&self) -> Result<Option<Value>> {
        let path = self.snapshot_path();

        if !path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let document: Value =
            serde_json::from_str(&text).map_err(|e| RepositoryError::Json(e.to_string()))?;

        tracing::debug!("Loaded snapshot from {}", path.display());

        Ok(Some(document))
    }

    fn clear(&self) -> Result<()> {
        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|name| name.to_str())
                && filename.starts_with("snapshot_v")
                && filename.ends_with(".json")
            {
                fs::remove_file(&path).map_err(RepositoryError::Io)?;
                tracing::debug!("Deleted snapshot {}", path.display());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();

        assert!(repo.load().unwrap().is_none());

        let document = json!({"version": 1, "state": {"turn": 4}});
        repo.save(&document).unwrap();
        assert_eq!(repo.load().unwrap(), Some(document));
    }

    #[test]
    fn corrupt_file_is_an_error_not_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();

        std::fs::write(
            dir.path().join(format!("snapshot_v{SNAPSHOT_VERSION}.json")),
            "{broken",
        )
        .unwrap();

        assert!(matches!(repo.load(), Err(RepositoryError::Json(_))));
    }

    #[test]
    fn clear_purges_foreign_versions_too() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();

        repo.save(&json!({"version": 1})).unwrap();
        std::fs::write(dir.path().join("snapshot_v0.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        repo.clear().unwrap();

        assert!(repo.load().unwrap().is_none());
        assert!(!dir.path().join("snapshot_v0.json").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
