//! RON catalog loaders for items, enemies, NPCs, locations, and quests.

use std::path::Path;

use game_core::{
    EnemyDefinition, ItemDefinition, LocationDefinition, NpcDefinition, QuestStageInfo,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemDefinition>,
}

/// Loader for the item catalog.
pub struct ItemLoader;

impl ItemLoader {
    pub fn parse(content: &str) -> LoadResult<Vec<ItemDefinition>> {
        let catalog: ItemCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;
        Ok(catalog.items)
    }

    pub fn load(path: &Path) -> LoadResult<Vec<ItemDefinition>> {
        Self::parse(&read_file(path)?)
    }
}

/// Enemy catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyCatalog {
    pub enemies: Vec<EnemyDefinition>,
}

/// Loader for the enemy catalog.
pub struct EnemyLoader;

impl EnemyLoader {
    pub fn parse(content: &str) -> LoadResult<Vec<EnemyDefinition>> {
        let catalog: EnemyCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse enemy catalog RON: {}", e))?;
        Ok(catalog.enemies)
    }

    pub fn load(path: &Path) -> LoadResult<Vec<EnemyDefinition>> {
        Self::parse(&read_file(path)?)
    }
}

/// NPC catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcCatalog {
    pub npcs: Vec<NpcDefinition>,
}

/// Loader for the NPC catalog.
pub struct NpcLoader;

impl NpcLoader {
    pub fn parse(content: &str) -> LoadResult<Vec<NpcDefinition>> {
        let catalog: NpcCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse NPC catalog RON: {}", e))?;
        Ok(catalog.npcs)
    }

    pub fn load(path: &Path) -> LoadResult<Vec<NpcDefinition>> {
        Self::parse(&read_file(path)?)
    }
}

/// Location catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCatalog {
    pub locations: Vec<LocationDefinition>,
}

/// Loader for the location catalog.
pub struct LocationLoader;

impl LocationLoader {
    pub fn parse(content: &str) -> LoadResult<Vec<LocationDefinition>> {
        let catalog: LocationCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse location catalog RON: {}", e))?;
        Ok(catalog.locations)
    }

    pub fn load(path: &Path) -> LoadResult<Vec<LocationDefinition>> {
        Self::parse(&read_file(path)?)
    }
}

/// Quest stage catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestCatalog {
    pub stages: Vec<QuestStageInfo>,
}

/// Loader for the quest stage catalog.
pub struct QuestLoader;

impl QuestLoader {
    pub fn parse(content: &str) -> LoadResult<Vec<QuestStageInfo>> {
        let catalog: QuestCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse quest catalog RON: {}", e))?;
        Ok(catalog.stages)
    }

    pub fn load(path: &Path) -> LoadResult<Vec<QuestStageInfo>> {
        Self::parse(&read_file(path)?)
    }
}
