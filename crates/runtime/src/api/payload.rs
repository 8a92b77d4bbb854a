//! Per-turn payload and the read-only summary views it carries.
//!
//! Every summary is derived independently from post-command state; the
//! builders are pure so assembling a payload twice from the same state
//! yields the same document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

use game_core::{
    Direction, EquipSlot, GameEnv, ItemKind, ItemOracle as _, LocationOracle as _, NpcOracle as _,
    SessionState,
};

use crate::ansi::{StyledText, TextStyle};
use crate::art::ArtSelection;

/// Category tag of a derived action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionCategory {
    Movement,
    Combat,
    Quest,
    Player,
}

/// One available action, rebuilt every turn and never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub command: String,
    pub verb: String,
    pub argument: String,
    pub description: String,
    pub category: ActionCategory,
    pub color: Option<TextStyle>,
    pub priority: i32,
}

/// A recommended action plus its natural-language justification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub command: String,
    pub reason: String,
}

/// One response document per turn, consumed by the presentation shell.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnPayload {
    pub screen_text: StyledText,
    pub game_over: bool,
    pub in_combat: bool,
    pub status_summary: StatusSummary,
    pub inventory_summary: InventorySummary,
    pub location_summary: LocationSummary,
    pub kill_summary: KillSummary,
    pub art: ArtSelection,
    pub actions_heading: String,
    pub actions: Vec<Action>,
    pub hints: Vec<Hint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub name: String,
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub xp: i32,
    pub skill_points: u32,
    pub gold: i32,
    pub titles: Vec<String>,
    /// Slot -> equipped item display name.
    pub equipment: BTreeMap<EquipSlot, Option<String>>,
}

impl StatusSummary {
    pub fn from_state(state: &SessionState, env: &dyn GameEnv) -> Self {
        let stats = state.player.effective_stats(env.items());
        let equipment = state
            .player
            .equipment
            .iter()
            .map(|(slot, item_id)| {
                let name = item_id.as_ref().map(|id| {
                    env.items()
                        .item(id)
                        .map(|item| item.name)
                        .unwrap_or_else(|| id.to_string())
                });
                (*slot, name)
            })
            .collect();

        Self {
            name: state.player.name.clone(),
            level: state.player.level,
            hp: state.player.hp,
            max_hp: stats.max_hp,
            attack: stats.attack,
            defense: stats.defense,
            xp: state.player.xp,
            skill_points: state.player.skill_points,
            gold: state.player.gold,
            titles: state.player.titles.clone(),
            equipment,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub id: String,
    pub name: String,
    pub qty: u32,
    pub kind: Option<ItemKind>,
    pub attack_bonus: i32,
    pub defense_bonus: i32,
    pub max_hp_bonus: i32,
    pub heal_amount: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub entries: Vec<InventoryEntry>,
}

impl InventorySummary {
    pub fn from_state(state: &SessionState, env: &dyn GameEnv) -> Self {
        let mut entries: Vec<InventoryEntry> = state
            .player
            .inventory
            .iter()
            .map(|(item_id, qty)| {
                let item = env.items().item(item_id);
                InventoryEntry {
                    id: item_id.to_string(),
                    name: item
                        .as_ref()
                        .map(|def| def.name.clone())
                        .unwrap_or_else(|| item_id.to_string()),
                    qty: *qty,
                    kind: item.as_ref().map(|def| def.kind),
                    attack_bonus: item.as_ref().map_or(0, |def| def.attack_bonus),
                    defense_bonus: item.as_ref().map_or(0, |def| def.defense_bonus),
                    max_hp_bonus: item.as_ref().map_or(0, |def| def.max_hp_bonus),
                    heal_amount: item.as_ref().map_or(0, |def| def.heal_amount),
                }
            })
            .collect();

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitView {
    pub direction: Direction,
    pub destination: String,
    pub locked: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub id: String,
    pub name: String,
    pub area: String,
    pub exits: Vec<ExitView>,
    /// Display names of NPCs currently visible here.
    pub npcs: Vec<String>,
    pub discovered_count: usize,
}

impl LocationSummary {
    pub fn from_state(state: &SessionState, env: &dyn GameEnv) -> Self {
        let Some(location) = env.locations().location(&state.location_id) else {
            return Self {
                id: state.location_id.to_string(),
                discovered_count: state.discovered.len(),
                ..Self::default()
            };
        };

        let exits = location
            .exits
            .iter()
            .map(|(direction, destination_id)| {
                let destination = env
                    .locations()
                    .location(destination_id)
                    .map(|dest| dest.name)
                    .unwrap_or_else(|| destination_id.to_string());
                let locked = location
                    .exit_requirements
                    .get(direction)
                    .is_some_and(|req| !req.met(state));
                ExitView {
                    direction: *direction,
                    destination,
                    locked,
                }
            })
            .collect();

        let npcs = location
            .npcs
            .iter()
            .filter_map(|npc_id| env.npcs().npc(npc_id))
            .filter(|npc| {
                npc.visible_flag
                    .as_deref()
                    .is_none_or(|flag| state.has_flag(flag))
            })
            .map(|npc| npc.name)
            .collect();

        Self {
            id: location.id.to_string(),
            name: location.name,
            area: location.area,
            exits,
            npcs,
            discovered_count: state.discovered.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillEntry {
    pub name: String,
    pub count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillSummary {
    /// Kills recorded at the current location, most first.
    pub here: Vec<KillEntry>,
    pub total: u32,
}

impl KillSummary {
    pub fn from_state(state: &SessionState) -> Self {
        let mut here: Vec<KillEntry> = state
            .kills
            .get(&state.location_id)
            .map(|ledger| {
                ledger
                    .iter()
                    .map(|(name, count)| KillEntry {
                        name: name.clone(),
                        count: *count,
                    })
                    .collect()
            })
            .unwrap_or_default();
        here.sort_by(|a, b| b.count.cmp(&a.count).then(a.name.cmp(&b.name)));

        let total = state
            .kills
            .values()
            .flat_map(|ledger| ledger.values())
            .sum();

        Self { here, total }
    }
}

#[cfg(test)]
mod tests {
    use game_core::{SessionState, TablesOracle as _};

    use super::*;
    use crate::oracle::OracleManager;

    fn env() -> OracleManager {
        OracleManager::from_bundle(game_content::ContentBundle::builtin().unwrap())
    }

    #[test]
    fn status_summary_reflects_gear() {
        let env = env();
        let state = SessionState::new_game(&env.tables().new_game(), 1);

        let status = StatusSummary::from_state(&state, &env);
        // Rusted blade +1 attack, patched coat +1 defense / +2 max hp.
        assert_eq!(status.attack, 9);
        assert_eq!(status.defense, 6);
        assert_eq!(status.max_hp, 52);
        assert_eq!(
            status.equipment.get(&EquipSlot::Weapon),
            Some(&Some("Rusted Blade".to_string()))
        );
    }

    #[test]
    fn location_summary_hides_gated_npcs_and_marks_locked_exits() {
        let env = env();
        let mut state = SessionState::new_game(&env.tables().new_game(), 1);

        state.location_id = "witch_terrace".into();
        let summary = LocationSummary::from_state(&state, &env);
        assert!(summary.npcs.is_empty(), "Elle hidden before the witch falls");

        state.set_flag("onyx_witch_defeated");
        let summary = LocationSummary::from_state(&state, &env);
        assert_eq!(summary.npcs, vec!["Elle".to_string()]);

        state.location_id = "forest".into();
        let summary = LocationSummary::from_state(&state, &env);
        let north = summary
            .exits
            .iter()
            .find(|exit| exit.direction == Direction::North)
            .unwrap();
        assert!(north.locked, "mountain path locked until frog_defeated");
    }

    #[test]
    fn kill_summary_totals_all_locations() {
        let env = env();
        let mut state = SessionState::new_game(&env.tables().new_game(), 1);
        state.record_kill("Sewer Rat");
        state.record_kill("Sewer Rat");
        state.location_id = "forest".into();
        state.record_kill("Forest Wolf");

        let summary = KillSummary::from_state(&state);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.here.len(), 1);
        assert_eq!(summary.here[0].name, "Forest Wolf");
    }
}
