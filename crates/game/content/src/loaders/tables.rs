//! Tunable tables loader.

use std::path::Path;

use game_core::{NewGameSpec, RecommendParams};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Combined tables document (`tables.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTables {
    pub recommend: RecommendParams,
    pub new_game: NewGameSpec,
}

/// Loader for game tables from TOML files.
pub struct TablesLoader;

impl TablesLoader {
    pub fn parse(content: &str) -> LoadResult<GameTables> {
        let tables: GameTables = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tables TOML: {}", e))?;
        Ok(tables)
    }

    pub fn load(path: &Path) -> LoadResult<GameTables> {
        Self::parse(&read_file(path)?)
    }
}
