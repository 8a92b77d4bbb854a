//! Live encounter state.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::state::EnemyId;

/// Sub-phase of an active encounter.
///
/// `Negotiation` replaces the normal combat action set entirely (joke /
/// bribe / fight) until it resolves into combat or a peaceful exit.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecialPhase {
    #[default]
    Combat,
    Negotiation,
}

/// State of one active combat.
///
/// Created when an encounter starts and discarded when the enemy is
/// defeated, the player flees, or the encounter resolves narratively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub enemy_id: EnemyId,
    pub enemy_hp: i32,
    /// Index into the enemy's telegraphed intent sequence.
    pub intent_index: u32,
    pub player_defending: bool,
    pub special_phase: SpecialPhase,
    /// While set, ordinary attacks are ineffective until the barrier is
    /// broken.
    pub barrier_active: bool,
    pub turn_count: u32,
}

impl Encounter {
    pub fn new(enemy_id: EnemyId, enemy_hp: i32) -> Self {
        Self {
            enemy_id,
            enemy_hp,
            intent_index: 0,
            player_defending: false,
            special_phase: SpecialPhase::Combat,
            barrier_active: false,
            turn_count: 0,
        }
    }

    pub fn negotiation(enemy_id: EnemyId, enemy_hp: i32) -> Self {
        Self {
            special_phase: SpecialPhase::Negotiation,
            ..Self::new(enemy_id, enemy_hp)
        }
    }
}
