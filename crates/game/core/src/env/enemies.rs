//! Enemy catalog oracle.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::state::EnemyId;

pub trait EnemyOracle: Send + Sync {
    fn enemy(&self, id: &EnemyId) -> Option<EnemyDefinition>;

    fn all_enemies(&self) -> Vec<EnemyDefinition>;
}

/// Display/danger tier of an enemy.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnemyCategory {
    Normal,
    Boss,
    /// Final-act bosses presented with their own warning tier.
    EndBoss,
}

/// Enemy definition fields the orchestration layer consults.
///
/// Combat numbers beyond `max_hp` (used to size encounter restores and HP
/// bars) stay with the rule engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: EnemyId,
    pub name: String,
    pub category: EnemyCategory,
    pub max_hp: i32,
}
