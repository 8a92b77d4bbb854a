//! Content oracle implementations backed by in-memory maps.
//!
//! Each oracle wraps one catalog from a [`game_content::ContentBundle`];
//! [`OracleManager`] owns the set and implements [`GameEnv`] for everything
//! that needs bundled read-only content access.

use std::collections::{BTreeMap, HashMap};

use game_core::{
    ArtAsset, ArtKey, EnemyDefinition, EnemyId, EnemyOracle, GameEnv, ItemDefinition, ItemId,
    ItemOracle, LocationDefinition, LocationId, LocationOracle, NewGameSpec, NpcDefinition, NpcId,
    NpcOracle, QuestOracle, QuestStage, QuestStageInfo, RecommendParams, SceneArtOracle,
    TablesOracle,
};
use game_content::ContentBundle;

/// ItemOracle implementation with static item definitions.
#[derive(Default)]
pub struct ItemOracleImpl {
    definitions: HashMap<ItemId, ItemDefinition>,
}

impl ItemOracleImpl {
    pub fn new(definitions: Vec<ItemDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }
}

impl ItemOracle for ItemOracleImpl {
    fn item(&self, id: &ItemId) -> Option<ItemDefinition> {
        self.definitions.get(id).cloned()
    }

    fn all_items(&self) -> Vec<ItemDefinition> {
        self.definitions.values().cloned().collect()
    }
}

/// EnemyOracle implementation with static enemy definitions.
#[derive(Default)]
pub struct EnemyOracleImpl {
    definitions: HashMap<EnemyId, EnemyDefinition>,
}

impl EnemyOracleImpl {
    pub fn new(definitions: Vec<EnemyDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }
}

impl EnemyOracle for EnemyOracleImpl {
    fn enemy(&self, id: &EnemyId) -> Option<EnemyDefinition> {
        self.definitions.get(id).cloned()
    }

    fn all_enemies(&self) -> Vec<EnemyDefinition> {
        self.definitions.values().cloned().collect()
    }
}

/// NpcOracle implementation with static NPC definitions.
#[derive(Default)]
pub struct NpcOracleImpl {
    definitions: HashMap<NpcId, NpcDefinition>,
}

impl NpcOracleImpl {
    pub fn new(definitions: Vec<NpcDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }
}

impl NpcOracle for NpcOracleImpl {
    fn npc(&self, id: &NpcId) -> Option<NpcDefinition> {
        self.definitions.get(id).cloned()
    }

    fn all_npcs(&self) -> Vec<NpcDefinition> {
        self.definitions.values().cloned().collect()
    }
}

/// LocationOracle implementation with static location definitions.
#[derive(Default)]
pub struct LocationOracleImpl {
    definitions: HashMap<LocationId, LocationDefinition>,
}

impl LocationOracleImpl {
    pub fn new(definitions: Vec<LocationDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }
}

impl LocationOracle for LocationOracleImpl {
    fn location(&self, id: &LocationId) -> Option<LocationDefinition> {
        self.definitions.get(id).cloned()
    }

    fn all_locations(&self) -> Vec<LocationDefinition> {
        self.definitions.values().cloned().collect()
    }
}

/// QuestOracle implementation keyed by stage.
#[derive(Default)]
pub struct QuestOracleImpl {
    stages: BTreeMap<QuestStage, QuestStageInfo>,
}

impl QuestOracleImpl {
    pub fn new(stages: Vec<QuestStageInfo>) -> Self {
        Self {
            stages: stages.into_iter().map(|info| (info.stage, info)).collect(),
        }
    }
}

impl QuestOracle for QuestOracleImpl {
    fn stage_info(&self, stage: QuestStage) -> Option<QuestStageInfo> {
        self.stages.get(&stage).cloned()
    }
}

/// SceneArtOracle implementation keyed by art key.
#[derive(Default)]
pub struct SceneArtOracleImpl {
    scenes: HashMap<ArtKey, ArtAsset>,
}

impl SceneArtOracleImpl {
    pub fn new(scenes: Vec<(ArtKey, ArtAsset)>) -> Self {
        Self {
            scenes: scenes.into_iter().collect(),
        }
    }
}

impl SceneArtOracle for SceneArtOracleImpl {
    fn art(&self, key: &ArtKey) -> Option<ArtAsset> {
        self.scenes.get(key).cloned()
    }
}

/// TablesOracle implementation over the loaded tables document.
pub struct TablesOracleImpl {
    recommend: RecommendParams,
    new_game: NewGameSpec,
}

impl TablesOracleImpl {
    pub fn new(recommend: RecommendParams, new_game: NewGameSpec) -> Self {
        Self {
            recommend,
            new_game,
        }
    }
}

impl TablesOracle for TablesOracleImpl {
    fn recommend(&self) -> RecommendParams {
        self.recommend
    }

    fn new_game(&self) -> NewGameSpec {
        self.new_game.clone()
    }
}

/// Owns every oracle and provides bundled access as [`GameEnv`].
pub struct OracleManager {
    items: ItemOracleImpl,
    enemies: EnemyOracleImpl,
    npcs: NpcOracleImpl,
    locations: LocationOracleImpl,
    quests: QuestOracleImpl,
    art: SceneArtOracleImpl,
    tables: TablesOracleImpl,
}

impl OracleManager {
    pub fn from_bundle(bundle: ContentBundle) -> Self {
        Self {
            items: ItemOracleImpl::new(bundle.items),
            enemies: EnemyOracleImpl::new(bundle.enemies),
            npcs: NpcOracleImpl::new(bundle.npcs),
            locations: LocationOracleImpl::new(bundle.locations),
            quests: QuestOracleImpl::new(bundle.quests),
            art: SceneArtOracleImpl::new(bundle.scenes),
            tables: TablesOracleImpl::new(bundle.tables.recommend, bundle.tables.new_game),
        }
    }
}

impl GameEnv for OracleManager {
    fn items(&self) -> &dyn ItemOracle {
        &self.items
    }

    fn enemies(&self) -> &dyn EnemyOracle {
        &self.enemies
    }

    fn npcs(&self) -> &dyn NpcOracle {
        &self.npcs
    }

    fn locations(&self) -> &dyn LocationOracle {
        &self.locations
    }

    fn quests(&self) -> &dyn QuestOracle {
        &self.quests
    }

    fn art(&self) -> &dyn SceneArtOracle {
        &self.art
    }

    fn tables(&self) -> &dyn TablesOracle {
        &self.tables
    }
}
