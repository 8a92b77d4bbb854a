//! NPC catalog oracle.

use serde::{Deserialize, Serialize};

use crate::state::{LocationId, NpcId};

pub trait NpcOracle: Send + Sync {
    fn npc(&self, id: &NpcId) -> Option<NpcDefinition>;

    fn all_npcs(&self) -> Vec<NpcDefinition>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcDefinition {
    pub id: NpcId,
    pub name: String,
    pub location_id: LocationId,
    /// Flag that must be set before this NPC is visible at all.
    #[serde(default)]
    pub visible_flag: Option<String>,
    #[serde(default)]
    pub first_dialogue: Vec<String>,
    #[serde(default)]
    pub repeat_dialogue: Vec<String>,
}
