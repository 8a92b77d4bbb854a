//! Content factory for loading all catalogs from a data directory.

use std::path::{Path, PathBuf};

use game_core::{
    ArtAsset, ArtKey, EnemyDefinition, ItemDefinition, LocationDefinition, NpcDefinition,
    QuestStageInfo,
};

use crate::loaders::{
    ArtLoader, EnemyLoader, GameTables, ItemLoader, LoadResult, LocationLoader, NpcLoader,
    QuestLoader, TablesLoader,
};

/// Everything the runtime oracles are built from.
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub items: Vec<ItemDefinition>,
    pub enemies: Vec<EnemyDefinition>,
    pub npcs: Vec<NpcDefinition>,
    pub locations: Vec<LocationDefinition>,
    pub quests: Vec<QuestStageInfo>,
    pub scenes: Vec<(ArtKey, ArtAsset)>,
    pub tables: GameTables,
}

impl ContentBundle {
    /// Parse the catalogs compiled into this crate.
    ///
    /// This is the default content set; external packs load through
    /// [`ContentFactory`] instead.
    pub fn builtin() -> LoadResult<Self> {
        Ok(Self {
            items: ItemLoader::parse(include_str!("../../data/items.ron"))?,
            enemies: EnemyLoader::parse(include_str!("../../data/enemies.ron"))?,
            npcs: NpcLoader::parse(include_str!("../../data/npcs.ron"))?,
            locations: LocationLoader::parse(include_str!("../../data/world.ron"))?,
            quests: QuestLoader::parse(include_str!("../../data/quests.ron"))?,
            scenes: ArtLoader::parse(include_str!("../../data/art.ron"))?,
            tables: TablesLoader::parse(include_str!("../../data/tables.toml"))?,
        })
    }
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── items.ron
/// ├── enemies.ron
/// ├── npcs.ron
/// ├── world.ron
/// ├── quests.ron
/// ├── art.ron
/// └── tables.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load every catalog from the data directory.
    pub fn load_all(&self) -> LoadResult<ContentBundle> {
        Ok(ContentBundle {
            items: self.load_items()?,
            enemies: self.load_enemies()?,
            npcs: self.load_npcs()?,
            locations: self.load_locations()?,
            quests: self.load_quests()?,
            scenes: self.load_scenes()?,
            tables: self.load_tables()?,
        })
    }

    pub fn load_items(&self) -> LoadResult<Vec<ItemDefinition>> {
        ItemLoader::load(&self.data_dir.join("items.ron"))
    }

    pub fn load_enemies(&self) -> LoadResult<Vec<EnemyDefinition>> {
        EnemyLoader::load(&self.data_dir.join("enemies.ron"))
    }

    pub fn load_npcs(&self) -> LoadResult<Vec<NpcDefinition>> {
        NpcLoader::load(&self.data_dir.join("npcs.ron"))
    }

    pub fn load_locations(&self) -> LoadResult<Vec<LocationDefinition>> {
        LocationLoader::load(&self.data_dir.join("world.ron"))
    }

    pub fn load_quests(&self) -> LoadResult<Vec<QuestStageInfo>> {
        QuestLoader::load(&self.data_dir.join("quests.ron"))
    }

    pub fn load_scenes(&self) -> LoadResult<Vec<(ArtKey, ArtAsset)>> {
        ArtLoader::load(&self.data_dir.join("art.ron"))
    }

    pub fn load_tables(&self) -> LoadResult<GameTables> {
        TablesLoader::load(&self.data_dir.join("tables.toml"))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use game_core::QuestStage;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn builtin_bundle_parses() {
        let bundle = ContentBundle::builtin().expect("builtin content must parse");
        assert!(!bundle.items.is_empty());
        assert!(!bundle.enemies.is_empty());
        assert!(!bundle.locations.is_empty());
        assert_eq!(bundle.tables.new_game.start_location.as_str(), "old_shack");
    }

    #[test]
    fn builtin_bundle_is_referentially_closed() {
        let bundle = ContentBundle::builtin().unwrap();

        let item_ids: BTreeSet<_> = bundle.items.iter().map(|def| def.id.clone()).collect();
        let enemy_ids: BTreeSet<_> = bundle.enemies.iter().map(|def| def.id.clone()).collect();
        let npc_ids: BTreeSet<_> = bundle.npcs.iter().map(|def| def.id.clone()).collect();
        let location_ids: BTreeSet<_> =
            bundle.locations.iter().map(|def| def.id.clone()).collect();

        for location in &bundle.locations {
            for destination in location.exits.values() {
                assert!(
                    location_ids.contains(destination),
                    "{} exits to unknown location {}",
                    location.id,
                    destination
                );
            }
            for npc_id in &location.npcs {
                assert!(npc_ids.contains(npc_id));
            }
            for enemy_id in &location.encounters {
                assert!(enemy_ids.contains(enemy_id));
            }
            if let Some(boss_id) = &location.boss_id {
                assert!(enemy_ids.contains(boss_id));
            }
        }

        for npc in &bundle.npcs {
            assert!(location_ids.contains(&npc.location_id));
        }

        let new_game = &bundle.tables.new_game;
        assert!(location_ids.contains(&new_game.start_location));
        for (item_id, _) in &new_game.starting_inventory {
            assert!(item_ids.contains(item_id));
        }
        for (slot, item_id) in &new_game.starting_equipment {
            let item = bundle.items.iter().find(|def| &def.id == item_id).unwrap();
            assert_eq!(item.equip_slot(), Some(*slot));
        }
    }

    #[test]
    fn every_quest_stage_has_catalog_info() {
        let bundle = ContentBundle::builtin().unwrap();
        for stage in QuestStage::iter() {
            assert!(
                bundle.quests.iter().any(|info| info.stage == stage),
                "missing quest info for {stage}"
            );
        }
    }

    #[test]
    fn factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
