//! Scene art catalog oracle.

use serde::{Deserialize, Serialize};

use crate::state::{EnemyId, LocationId, NpcId};

pub trait SceneArtOracle: Send + Sync {
    fn art(&self, key: &ArtKey) -> Option<ArtAsset>;
}

/// Identity a scene asset is keyed by.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtKey {
    Enemy(EnemyId),
    Npc(NpcId),
    Location(LocationId),
}

/// Either a flat art-text block or a reference the shell resolves itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtBody {
    Ascii(String),
    ImageRef(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtAsset {
    pub title: String,
    pub body: ArtBody,
}
