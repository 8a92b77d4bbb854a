//! Content loaders for reading game data from files.
//!
//! Each catalog has a loader that parses RON (or TOML for tables) into
//! game-core definition types. [`ContentFactory`] bundles them for a data
//! directory; [`ContentBundle::builtin`] parses the catalogs shipped inside
//! this crate so tests and the demo client need no data-dir discovery.

pub mod art;
pub mod catalogs;
pub mod factory;
pub mod tables;

pub use art::ArtLoader;
pub use catalogs::{EnemyLoader, ItemLoader, LocationLoader, NpcLoader, QuestLoader};
pub use factory::{ContentBundle, ContentFactory};
pub use tables::{GameTables, TablesLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
