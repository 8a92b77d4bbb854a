//! Location catalog oracle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::state::{EnemyId, LocationId, NpcId, SessionState};

pub trait LocationOracle: Send + Sync {
    fn location(&self, id: &LocationId) -> Option<LocationDefinition>;

    fn all_locations(&self) -> Vec<LocationDefinition>;
}

/// Travel direction between locations.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

/// Flag conditions gating one exit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequirement {
    /// Every listed flag must be set.
    #[serde(default)]
    pub all_flags: Vec<String>,
    /// At least one listed flag must be set (when non-empty).
    #[serde(default)]
    pub any_flags: Vec<String>,
    /// Shown when the requirement blocks travel.
    #[serde(default)]
    pub message: String,
}

impl ExitRequirement {
    pub fn met(&self, state: &SessionState) -> bool {
        if self.all_flags.iter().any(|flag| !state.has_flag(flag)) {
            return false;
        }
        if !self.any_flags.is_empty() && !self.any_flags.iter().any(|flag| state.has_flag(flag)) {
            return false;
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationDefinition {
    pub id: LocationId,
    pub name: String,
    pub area: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub exits: BTreeMap<Direction, LocationId>,
    #[serde(default)]
    pub exit_requirements: BTreeMap<Direction, ExitRequirement>,
    /// NPC ids stationed here; visibility may be further gated per NPC.
    #[serde(default)]
    pub npcs: Vec<NpcId>,
    /// Roaming enemy ids for this area (empty for safe/boss-only locations).
    #[serde(default)]
    pub encounters: Vec<EnemyId>,
    /// Chance that travel into this location triggers a roaming encounter.
    #[serde(default)]
    pub encounter_chance: f32,
    #[serde(default)]
    pub boss_id: Option<EnemyId>,
    /// Flag set once the resident boss falls.
    #[serde(default)]
    pub boss_flag: Option<String>,
    #[serde(default)]
    pub sense_hint: Option<String>,
}

impl LocationDefinition {
    /// Exits usable under the given state's flags.
    pub fn open_exits(&self, state: &SessionState) -> Vec<(Direction, &LocationId)> {
        self.exits
            .iter()
            .filter(|(direction, _)| {
                self.exit_requirements
                    .get(direction)
                    .is_none_or(|req| req.met(state))
            })
            .map(|(direction, destination)| (*direction, destination))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::NewGameSpec;

    #[test]
    fn exit_requirements_combine_all_and_any() {
        let mut state = SessionState::new_game(&NewGameSpec::default(), 0);

        let req = ExitRequirement {
            all_flags: vec!["a".to_string()],
            any_flags: vec!["b".to_string(), "c".to_string()],
            message: String::new(),
        };
        assert!(!req.met(&state));

        state.set_flag("a");
        assert!(!req.met(&state));

        state.set_flag("c");
        assert!(req.met(&state));
    }
}
