//! Session orchestration for the turn-based adventure.
//!
//! This crate wires the rule-engine port, content oracles, and snapshot
//! repositories into the turn pipeline exposed by [`Session`]: decode the
//! engine's screen, rebuild the action catalog and recommendations from
//! post-command state, update the scene art on transition edges, assemble
//! one payload per turn, and persist a restorable snapshot after every
//! successful turn.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the turn pipeline and the external interface
//! - [`api`] exposes the types downstream clients interact with
//! - [`ansi`] decodes engine screens into structured styled spans
//! - [`catalog`] parses engine hint lines into classified actions
//! - [`recommend`] scores actions and derives the hint list
//! - [`snapshot`] is the versioned, tolerant session codec
//! - [`art`] selects scene art on transition edges
//! - [`oracle`] and [`repository`] provide data adapters reused by other
//!   crates
//! - [`providers`] ships the scripted stand-in rule engine
pub mod ansi;
pub mod api;
pub mod art;
pub mod catalog;
pub mod oracle;
pub mod providers;
pub mod recommend;
pub mod repository;
pub mod session;
pub mod snapshot;

pub use ansi::{StyledText, TextSpan, TextStyle, decode};
pub use api::{
    Action, ActionCategory, ErrorCode, Hint, InventoryEntry, InventorySummary, KillSummary,
    LocationSummary, Result, SessionError, StatusSummary, TurnPayload,
};
pub use art::{ArtSelection, ArtSelector};
pub use catalog::{ActionCatalog, NameIndex};
pub use oracle::{
    EnemyOracleImpl, ItemOracleImpl, LocationOracleImpl, NpcOracleImpl, OracleManager,
    QuestOracleImpl, SceneArtOracleImpl, TablesOracleImpl,
};
pub use providers::ScriptedEngine;
pub use recommend::{RecommendContext, derive_hints, rank_actions};
pub use repository::{
    FileSnapshotRepository, InMemorySnapshotRepository, RepositoryError, SnapshotRepository,
};
pub use session::Session;
pub use snapshot::{RestoreError, SNAPSHOT_VERSION, restore, serialize};
