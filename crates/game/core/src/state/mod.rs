//! Session state: the single mutable root owned by the orchestration layer.

mod common;
mod encounter;
mod player;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::env::{NewGameSpec, SessionRng};

pub use common::{EnemyId, ItemId, LocationId, NpcId};
pub use encounter::{Encounter, SpecialPhase};
pub use player::{EffectiveStats, EquipSlot, Player};

/// Ordered story progress tag.
///
/// Stages advance monotonically; each maps to one human-readable objective
/// provided by the quest catalog. The derived `Ord` follows declaration
/// order, so later stages compare greater.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestStage {
    #[default]
    Awakening,
    SwampSecret,
    MountainFlame,
    CastleRoad,
    BlackHall,
    WitchBane,
    RescueElle,
    Homecoming,
}

/// Single source of truth for one running session.
///
/// The rule engine receives `&mut SessionState` and mutates it in place; it
/// never replaces the root. Only the snapshot codec's explicit load path
/// builds a new root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub player: Player,
    pub location_id: LocationId,
    pub quest_stage: QuestStage,
    /// One-time narrative markers. Flags are only ever added.
    pub flags: BTreeSet<String>,
    pub encounter: Option<Encounter>,
    /// Location ids the player has visited. Grows monotonically.
    pub discovered: BTreeSet<LocationId>,
    /// Per-location, per-enemy-name kill counts. Counts only increase.
    pub kills: BTreeMap<LocationId, BTreeMap<String, u32>>,
    pub turn: u64,
    pub game_over: bool,
    pub victory: bool,
    pub rng: SessionRng,
}

impl SessionState {
    /// Fresh state for a new run, built from the content-provided loadout.
    pub fn new_game(spec: &NewGameSpec, seed: u64) -> Self {
        let mut inventory = BTreeMap::new();
        for (item_id, qty) in &spec.starting_inventory {
            *inventory.entry(item_id.clone()).or_insert(0) += qty;
        }

        let mut equipment: BTreeMap<EquipSlot, Option<ItemId>> = BTreeMap::new();
        for slot in <EquipSlot as strum::IntoEnumIterator>::iter() {
            equipment.insert(slot, None);
        }
        for (slot, item_id) in &spec.starting_equipment {
            equipment.insert(*slot, Some(item_id.clone()));
        }

        let player = Player {
            name: spec.player_name.clone(),
            base_max_hp: spec.base_max_hp,
            base_attack: spec.base_attack,
            base_defense: spec.base_defense,
            hp: spec.base_max_hp,
            xp: 0,
            level: 1,
            skill_points: 0,
            gold: spec.gold,
            inventory,
            equipment,
            skills: BTreeSet::new(),
            cooldowns: BTreeMap::new(),
            titles: Vec::new(),
            temporary_bonuses: BTreeMap::new(),
        };

        let mut discovered = BTreeSet::new();
        discovered.insert(spec.start_location.clone());

        Self {
            player,
            location_id: spec.start_location.clone(),
            quest_stage: QuestStage::default(),
            flags: BTreeSet::new(),
            encounter: None,
            discovered,
            kills: BTreeMap::new(),
            turn: 0,
            game_over: false,
            victory: false,
            rng: SessionRng::seeded(seed),
        }
    }

    pub fn in_encounter(&self) -> bool {
        self.encounter.is_some()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    /// Record a visit; returns true when the location is newly discovered.
    pub fn discover(&mut self, location_id: LocationId) -> bool {
        self.discovered.insert(location_id)
    }

    /// Bump the kill ledger for the current location.
    pub fn record_kill(&mut self, enemy_name: impl Into<String>) {
        let per_location = self.kills.entry(self.location_id.clone()).or_default();
        *per_location.entry(enemy_name.into()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn spec() -> NewGameSpec {
        NewGameSpec {
            player_name: "Wanderer".to_string(),
            base_max_hp: 50,
            base_attack: 8,
            base_defense: 5,
            gold: 20,
            start_location: LocationId::from("old_shack"),
            starting_inventory: vec![(ItemId::from("minor_potion"), 2)],
            starting_equipment: vec![(EquipSlot::Weapon, ItemId::from("rusted_blade"))],
        }
    }

    #[test]
    fn new_game_marks_start_location_discovered() {
        let state = SessionState::new_game(&spec(), 7);
        assert!(state.discovered.contains(&state.location_id));
        assert_eq!(state.quest_stage, QuestStage::Awakening);
        assert_eq!(state.player.hp, 50);
        assert_eq!(
            state.player.equipped(EquipSlot::Weapon),
            Some(&ItemId::from("rusted_blade"))
        );
        assert_eq!(state.player.equipped(EquipSlot::Shield), None);
    }

    #[test]
    fn quest_stages_are_ordered() {
        let stages: Vec<QuestStage> = QuestStage::iter().collect();
        assert_eq!(stages.first(), Some(&QuestStage::Awakening));
        assert_eq!(stages.last(), Some(&QuestStage::Homecoming));
        assert!(QuestStage::WitchBane > QuestStage::CastleRoad);
    }

    #[test]
    fn kill_ledger_accumulates_per_location() {
        let mut state = SessionState::new_game(&spec(), 7);
        state.record_kill("Forest Wolf");
        state.record_kill("Forest Wolf");
        state.location_id = LocationId::from("forest");
        state.record_kill("Forest Wolf");

        let shack = state.kills.get(&LocationId::from("old_shack")).unwrap();
        assert_eq!(shack.get("Forest Wolf"), Some(&2));
        let forest = state.kills.get(&LocationId::from("forest")).unwrap();
        assert_eq!(forest.get("Forest Wolf"), Some(&1));
    }

    #[test]
    fn discover_reports_only_new_locations() {
        let mut state = SessionState::new_game(&spec(), 7);
        assert!(state.discover(LocationId::from("forest")));
        assert!(!state.discover(LocationId::from("forest")));
    }
}
