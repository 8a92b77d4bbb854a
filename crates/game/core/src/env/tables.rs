//! Tunable tables oracle: recommendation parameters and the new-game loadout.

use serde::{Deserialize, Serialize};

use crate::state::{EquipSlot, ItemId, LocationId};

pub trait TablesOracle: Send + Sync {
    fn recommend(&self) -> RecommendParams;

    fn new_game(&self) -> NewGameSpec;
}

/// Recommendation engine tuning.
///
/// The hint cap varied across the system's history with no behavioral
/// contract attached, so it is configuration rather than a constant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendParams {
    /// Upper bound on the derived hint list.
    pub max_hints: usize,
    /// HP ratio at or below which healing becomes the leading concern.
    pub low_hp_ratio: f32,
    /// HP ratio at or below which fleeing gets an extra boost.
    pub critical_hp_ratio: f32,
}

impl Default for RecommendParams {
    fn default() -> Self {
        Self {
            max_hints: 6,
            low_hp_ratio: 0.45,
            critical_hp_ratio: 0.30,
        }
    }
}

/// Starting loadout for a fresh session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewGameSpec {
    pub player_name: String,
    pub base_max_hp: i32,
    pub base_attack: i32,
    pub base_defense: i32,
    pub gold: i32,
    pub start_location: LocationId,
    #[serde(default)]
    pub starting_inventory: Vec<(ItemId, u32)>,
    #[serde(default)]
    pub starting_equipment: Vec<(EquipSlot, ItemId)>,
}
