//! Data-driven content definitions and loaders.
//!
//! This crate houses static game content and provides loaders for RON/TOML
//! data files:
//! - Item catalog (RON)
//! - Enemy and NPC catalogs (RON)
//! - Location catalog (RON)
//! - Quest stage catalog (RON)
//! - Scene art catalog (RON)
//! - Tunable tables: recommendation parameters + new-game loadout (TOML)
//!
//! Content is consumed by runtime oracles and never appears in session
//! state. All loaders deserialize straight into game-core definition types.

pub mod loaders;

pub use loaders::{
    ArtLoader, ContentBundle, ContentFactory, EnemyLoader, GameTables, ItemLoader, LocationLoader,
    NpcLoader, QuestLoader, TablesLoader,
};
