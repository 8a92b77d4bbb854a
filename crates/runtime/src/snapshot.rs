//! Session snapshot codec: versioned serialize and tolerant restore.
//!
//! A snapshot is a self-contained JSON envelope `{version, saved_at,
//! state}`. Restore validates the top-level shape strictly (unparseable
//! text, malformed root, missing `state`, unsupported version are hard
//! failures) and everything below it leniently: a fresh default state is
//! built first and persisted fields overlay it one by one, with invalid
//! values falling back to the default rather than aborting. Ids are checked
//! against the content catalogs: an unknown location falls back to the
//! start location, an encounter with an unknown enemy is discarded whole,
//! and equipment entries that do not fit their slot are dropped. The RNG
//! continuation token restores exactly, which keeps future draws identical
//! to the uninterrupted session.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde_json::{Map, Value, json};
use thiserror::Error;

use game_core::{
    Encounter, EnemyOracle as _, EquipSlot, GameEnv, ItemId, ItemOracle as _, LocationId,
    LocationOracle as _, QuestStage, SessionRng, SessionState, SpecialPhase, TablesOracle as _,
};

use crate::api::ErrorCode;

/// Current snapshot document version.
pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RestoreError {
    #[error("snapshot document is not valid JSON")]
    InvalidJson,

    #[error("snapshot document root is malformed")]
    InvalidPayload,

    #[error("snapshot `state` field is missing or not an object")]
    MissingState,

    #[error("snapshot version {0} is not supported")]
    UnsupportedVersion(u64),
}

impl RestoreError {
    /// Stable error code for the import interface.
    pub fn code(&self) -> ErrorCode {
        match self {
            RestoreError::InvalidJson => ErrorCode::InvalidJson,
            RestoreError::InvalidPayload => ErrorCode::InvalidPayload,
            RestoreError::MissingState => ErrorCode::MissingState,
            RestoreError::UnsupportedVersion(_) => ErrorCode::RestoreFailed,
        }
    }
}

/// Parse snapshot text into a document.
pub fn parse_document(text: &str) -> Result<Value, RestoreError> {
    serde_json::from_str(text).map_err(|_| RestoreError::InvalidJson)
}

/// Serialize the session state into a versioned snapshot document.
pub fn serialize(state: &SessionState) -> Value {
    let state_value = serde_json::to_value(state).unwrap_or_else(|err| {
        // Session state is plain data; this only fires on a bug. A null
        // state round-trips to a hard restore failure instead of silently
        // resurrecting garbage.
        tracing::error!(%err, "session state failed to serialize");
        Value::Null
    });

    json!({
        "version": SNAPSHOT_VERSION,
        "saved_at": chrono::Utc::now().to_rfc3339(),
        "state": state_value,
    })
}

/// Restore a session state from a snapshot document.
///
/// `fallback_seed` seeds the RNG of the default state used for overlay
/// fallbacks; a valid persisted continuation token always wins over it.
pub fn restore(
    document: &Value,
    env: &dyn GameEnv,
    fallback_seed: u64,
) -> Result<SessionState, RestoreError> {
    let root = document.as_object().ok_or(RestoreError::InvalidPayload)?;

    let version = root
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(RestoreError::InvalidPayload)?;
    if version != SNAPSHOT_VERSION {
        return Err(RestoreError::UnsupportedVersion(version));
    }

    let persisted = root
        .get("state")
        .and_then(Value::as_object)
        .ok_or(RestoreError::MissingState)?;

    let spec = env.tables().new_game();
    let mut state = SessionState::new_game(&spec, fallback_seed);

    overlay_world(&mut state, persisted, env);
    if let Some(player) = persisted.get("player").and_then(Value::as_object) {
        overlay_player(&mut state, player, env);
    }
    overlay_encounter(&mut state, persisted, env);

    // Re-establish invariants the overlay cannot guarantee on its own.
    state.discover(state.location_id.clone());
    state.player.clamp_hp(env.items());

    Ok(state)
}

fn overlay_world(state: &mut SessionState, persisted: &Map<String, Value>, env: &dyn GameEnv) {
    if let Some(id) = persisted.get("location_id").and_then(Value::as_str) {
        let location_id = LocationId::from(id);
        if env.locations().location(&location_id).is_some() {
            state.location_id = location_id;
        } else {
            tracing::warn!(id, "persisted location unknown; using start location");
        }
    }

    if let Some(stage) = persisted.get("quest_stage").and_then(Value::as_str) {
        match QuestStage::from_str(stage) {
            Ok(parsed) => state.quest_stage = parsed,
            Err(_) => tracing::warn!(stage, "persisted quest stage unknown; using initial stage"),
        }
    }

    if let Some(flags) = persisted.get("flags").and_then(Value::as_array) {
        state.flags = flags
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    if let Some(discovered) = persisted.get("discovered").and_then(Value::as_array) {
        state.discovered = discovered
            .iter()
            .filter_map(Value::as_str)
            .map(LocationId::from)
            .filter(|id| env.locations().location(id).is_some())
            .collect();
    }

    if let Some(kills) = persisted.get("kills").and_then(Value::as_object) {
        let mut ledger = BTreeMap::new();
        for (location, entries) in kills {
            let Some(entries) = entries.as_object() else {
                continue;
            };
            let per_location: BTreeMap<String, u32> = entries
                .iter()
                .filter_map(|(name, count)| {
                    count
                        .as_u64()
                        .map(|count| (name.clone(), count.min(u32::MAX as u64) as u32))
                })
                .collect();
            if !per_location.is_empty() {
                ledger.insert(LocationId::from(location.as_str()), per_location);
            }
        }
        state.kills = ledger;
    }

    if let Some(turn) = persisted.get("turn").and_then(Value::as_u64) {
        state.turn = turn;
    }
    if let Some(game_over) = persisted.get("game_over").and_then(Value::as_bool) {
        state.game_over = game_over;
    }
    if let Some(victory) = persisted.get("victory").and_then(Value::as_bool) {
        state.victory = victory;
    }

    if let Some(token) = persisted.get("rng").and_then(Value::as_str) {
        match SessionRng::from_token(token) {
            Some(rng) => state.rng = rng,
            None => tracing::warn!("persisted rng token malformed; reseeding"),
        }
    }
}

fn overlay_player(state: &mut SessionState, persisted: &Map<String, Value>, env: &dyn GameEnv) {
    let player = &mut state.player;

    if let Some(name) = persisted.get("name").and_then(Value::as_str) {
        player.name = name.to_string();
    }

    if let Some(value) = persisted.get("base_max_hp").and_then(Value::as_i64) {
        player.base_max_hp = (value.clamp(1, i32::MAX as i64)) as i32;
    }
    if let Some(value) = persisted.get("base_attack").and_then(Value::as_i64) {
        player.base_attack = (value.clamp(1, i32::MAX as i64)) as i32;
    }
    if let Some(value) = persisted.get("base_defense").and_then(Value::as_i64) {
        player.base_defense = (value.clamp(0, i32::MAX as i64)) as i32;
    }
    if let Some(value) = persisted.get("hp").and_then(Value::as_i64) {
        // Final clamp against effective max happens after gear overlay.
        player.hp = value.clamp(0, i32::MAX as i64) as i32;
    }
    if let Some(value) = persisted.get("xp").and_then(Value::as_i64) {
        player.xp = value.clamp(0, i32::MAX as i64) as i32;
    }
    if let Some(value) = persisted.get("level").and_then(Value::as_u64) {
        player.level = value.clamp(1, u32::MAX as u64) as u32;
    }
    if let Some(value) = persisted.get("skill_points").and_then(Value::as_u64) {
        player.skill_points = value.min(u32::MAX as u64) as u32;
    }
    if let Some(value) = persisted.get("gold").and_then(Value::as_i64) {
        player.gold = value.clamp(0, i32::MAX as i64) as i32;
    }

    if let Some(inventory) = persisted.get("inventory").and_then(Value::as_object) {
        player.inventory = inventory
            .iter()
            .filter_map(|(item_id, count)| {
                let count = count.as_u64().unwrap_or(0);
                (count > 0).then(|| (ItemId::from(item_id.as_str()), count.min(u32::MAX as u64) as u32))
            })
            .collect();
    }

    if let Some(equipment) = persisted.get("equipment").and_then(Value::as_object) {
        for (slot_name, value) in equipment {
            let Ok(slot) = EquipSlot::from_str(slot_name) else {
                tracing::warn!(slot = slot_name.as_str(), "unknown equipment slot dropped");
                continue;
            };
            let item_id = value.as_str().map(ItemId::from);
            let valid = match &item_id {
                None => true,
                Some(id) => env
                    .items()
                    .item(id)
                    .is_some_and(|def| def.equip_slot() == Some(slot)),
            };
            if valid {
                player.equipment.insert(slot, item_id);
            } else {
                tracing::warn!(
                    slot = slot_name.as_str(),
                    "equipment entry does not fit its slot; cleared"
                );
                player.equipment.insert(slot, None);
            }
        }
    }

    if let Some(skills) = persisted.get("skills").and_then(Value::as_array) {
        player.skills = skills
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect::<BTreeSet<_>>();
    }

    if let Some(cooldowns) = persisted.get("cooldowns").and_then(Value::as_object) {
        player.cooldowns = cooldowns
            .iter()
            .filter_map(|(skill, turns)| {
                turns
                    .as_u64()
                    .map(|turns| (skill.clone(), turns.min(u32::MAX as u64) as u32))
            })
            .collect();
    }

    if let Some(titles) = persisted.get("titles").and_then(Value::as_array) {
        player.titles = titles
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    if let Some(bonuses) = persisted.get("temporary_bonuses").and_then(Value::as_object) {
        player.temporary_bonuses = bonuses
            .iter()
            .filter_map(|(stat, value)| {
                value
                    .as_i64()
                    .map(|value| (stat.clone(), value.clamp(i32::MIN as i64, i32::MAX as i64) as i32))
            })
            .collect();
    }
}

fn overlay_encounter(state: &mut SessionState, persisted: &Map<String, Value>, env: &dyn GameEnv) {
    let Some(encounter) = persisted.get("encounter").and_then(Value::as_object) else {
        return;
    };

    let Some(enemy_id) = encounter.get("enemy_id").and_then(Value::as_str) else {
        tracing::warn!("persisted encounter has no enemy id; discarded");
        return;
    };

    // Restoring combat against an enemy the catalog no longer knows would
    // leave an unwinnable fight; dropping the encounter is the safe read.
    let Some(enemy) = env.enemies().enemy(&enemy_id.into()) else {
        tracing::warn!(enemy_id, "persisted encounter enemy unknown; discarded");
        return;
    };

    let mut restored = Encounter::new(enemy.id.clone(), enemy.max_hp);

    if let Some(hp) = encounter.get("enemy_hp").and_then(Value::as_i64) {
        restored.enemy_hp = hp.clamp(0, enemy.max_hp as i64) as i32;
    }
    if let Some(index) = encounter.get("intent_index").and_then(Value::as_u64) {
        restored.intent_index = index.min(u32::MAX as u64) as u32;
    }
    if let Some(defending) = encounter.get("player_defending").and_then(Value::as_bool) {
        restored.player_defending = defending;
    }
    if let Some(phase) = encounter.get("special_phase").and_then(Value::as_str) {
        restored.special_phase = SpecialPhase::from_str(phase).unwrap_or_default();
    }
    if let Some(barrier) = encounter.get("barrier_active").and_then(Value::as_bool) {
        restored.barrier_active = barrier;
    }
    if let Some(turns) = encounter.get("turn_count").and_then(Value::as_u64) {
        restored.turn_count = turns.min(u32::MAX as u64) as u32;
    }

    state.encounter = Some(restored);
}
