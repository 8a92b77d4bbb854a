//! Quest stage catalog oracle.

use serde::{Deserialize, Serialize};

use crate::state::QuestStage;

pub trait QuestOracle: Send + Sync {
    /// Human-readable objective for a stage.
    fn stage_info(&self, stage: QuestStage) -> Option<QuestStageInfo>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestStageInfo {
    pub stage: QuestStage,
    pub title: String,
    pub description: String,
    pub hint: String,
}
