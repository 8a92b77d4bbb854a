//! Port through which the external rule engine is invoked.
//!
//! Combat resolution, quest progression, and loot rolls live behind this
//! trait. The engine mutates the session state it is handed and renders
//! free-text (optionally ANSI-styled) screens; the orchestration layer never
//! inspects how a command was resolved, only the post-command state.

use thiserror::Error;

use crate::env::{Direction, GameEnv};
use crate::state::{LocationId, SessionState};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("rule engine rejected command `{command}`: {reason}")]
    Rejected { command: String, reason: String },

    #[error("rule engine failure: {0}")]
    Internal(String),
}

/// Next-step travel hint computed by the engine's pathing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecommendedStep {
    /// Quest-relevant destination, when one exists for the current stage.
    pub target: Option<LocationId>,
    /// First travel direction toward the target; `None` when already there
    /// or no route is open.
    pub direction: Option<Direction>,
}

/// Narrow command interface of the combat/quest/loot engine.
///
/// Implementations mutate `state` in place and must never replace the root;
/// the only path that builds a new root is the snapshot codec's restore.
pub trait RuleEngine: Send + Sync {
    /// Render the opening screen for a fresh session.
    fn initial_screen(
        &self,
        state: &mut SessionState,
        env: &dyn GameEnv,
    ) -> Result<String, EngineError>;

    /// Resolve one raw command and render the resulting screen.
    fn process_command(
        &self,
        state: &mut SessionState,
        raw: &str,
        env: &dyn GameEnv,
    ) -> Result<String, EngineError>;

    /// Hint lines for the current state: a heading line followed by
    /// `"<command>: <description>"` entries.
    fn action_hints(&self, state: &SessionState, env: &dyn GameEnv) -> Vec<String>;

    /// Travel hint toward the current quest objective.
    fn recommended_step(&self, state: &SessionState, env: &dyn GameEnv) -> RecommendedStep;
}
