//! Oracle traits for static content and the deterministic RNG.
//!
//! Content catalogs (items, enemies, NPCs, locations, quest stages, scene
//! art, tables) are read-only lookup tables. State never embeds catalog
//! data; it stores ids and resolves them through these traits, which keeps
//! snapshots small and lets restore validate every persisted id against the
//! current catalogs.

mod art;
mod enemies;
mod items;
mod locations;
mod npcs;
mod quests;
mod rng;
mod tables;

pub use art::{ArtAsset, ArtBody, ArtKey, SceneArtOracle};
pub use enemies::{EnemyCategory, EnemyDefinition, EnemyOracle};
pub use items::{ItemDefinition, ItemKind, ItemOracle};
pub use locations::{Direction, ExitRequirement, LocationDefinition, LocationOracle};
pub use npcs::{NpcDefinition, NpcOracle};
pub use quests::{QuestOracle, QuestStageInfo};
pub use rng::SessionRng;
pub use tables::{NewGameSpec, RecommendParams, TablesOracle};

/// Bundled read-only access to every content oracle.
///
/// The orchestration layer and the rule engine both receive a `&dyn GameEnv`
/// rather than individual oracles, mirroring how state is handed around as a
/// single root.
pub trait GameEnv: Send + Sync {
    fn items(&self) -> &dyn ItemOracle;
    fn enemies(&self) -> &dyn EnemyOracle;
    fn npcs(&self) -> &dyn NpcOracle;
    fn locations(&self) -> &dyn LocationOracle;
    fn quests(&self) -> &dyn QuestOracle;
    fn art(&self) -> &dyn SceneArtOracle;
    fn tables(&self) -> &dyn TablesOracle;
}
