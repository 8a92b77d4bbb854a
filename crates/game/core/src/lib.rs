//! Canonical session data types shared across the orchestration crates.
//!
//! `game-core` defines the mutable session state (player, encounter, world
//! progress), the oracle traits through which static content catalogs are
//! consulted, the deterministic RNG whose continuation token makes snapshots
//! replayable, and the [`engine::RuleEngine`] port behind which the external
//! combat/quest/loot engine lives. Everything here is pure data and pure
//! functions; I/O, logging, and persistence belong to the `runtime` crate.
pub mod engine;
pub mod env;
pub mod state;

pub use engine::{EngineError, RecommendedStep, RuleEngine};
pub use env::{
    ArtAsset, ArtBody, ArtKey, Direction, EnemyCategory, EnemyDefinition, EnemyOracle,
    ExitRequirement, GameEnv, ItemDefinition, ItemKind, ItemOracle, LocationDefinition,
    LocationOracle, NewGameSpec, NpcDefinition, NpcOracle, QuestOracle, QuestStageInfo,
    RecommendParams, SceneArtOracle, SessionRng, TablesOracle,
};
pub use state::{
    EffectiveStats, EnemyId, Encounter, EquipSlot, ItemId, LocationId, NpcId, Player, QuestStage,
    SessionState, SpecialPhase,
};
