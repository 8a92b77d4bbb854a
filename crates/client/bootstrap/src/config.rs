//! Client configuration from environment variables.

use std::path::PathBuf;

/// Where content comes from and where snapshots go.
///
/// Environment overrides:
/// - `CONTENT_DATA_DIR`: load catalogs from a directory instead of the
///   content compiled into `game-content`.
/// - `SNAPSHOT_DIR`: snapshot directory (defaults to the platform data
///   dir).
/// - `NO_PERSIST=1`: disable snapshot persistence entirely.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub data_dir: Option<PathBuf>,
    pub snapshot_dir: Option<PathBuf>,
    pub persist: bool,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var_os("CONTENT_DATA_DIR").map(PathBuf::from),
            snapshot_dir: std::env::var_os("SNAPSHOT_DIR").map(PathBuf::from),
            persist: std::env::var_os("NO_PERSIST").is_none(),
        }
    }

    /// Snapshot directory: explicit override, else the platform data dir.
    pub fn resolved_snapshot_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.snapshot_dir {
            return Some(dir.clone());
        }
        directories::ProjectDirs::from("", "", "emberwood-trail")
            .map(|dirs| dirs.data_dir().join("snapshots"))
    }
}
