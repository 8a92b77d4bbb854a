//! The session: one mutable state root and the turn pipeline around it.
//!
//! A turn runs engine call → catalog build → scoring → payload assembly →
//! best-effort persistence, strictly synchronously. The engine works on a
//! clone of the state and the clone is committed only when the engine
//! succeeds, so a mid-turn failure can never corrupt the session root or
//! what gets persisted. Persistence failures are logged and swallowed; a
//! turn never fails because a snapshot could not be written.

use std::sync::Arc;

use serde_json::Value;

use game_core::{GameEnv, RuleEngine, SessionState, TablesOracle as _};

use crate::ansi;
use crate::api::{Result, TurnPayload};
use crate::api::{InventorySummary, KillSummary, LocationSummary, StatusSummary};
use crate::art::ArtSelector;
use crate::catalog::{NameIndex, build_catalog};
use crate::recommend::{RecommendContext, derive_hints, rank_actions};
use crate::repository::SnapshotRepository;
use crate::snapshot::{self, RestoreError};

/// One running game session.
///
/// Nothing here is global: any number of sessions can coexist, each owning
/// its state root, engine, art selection, and (optionally) a snapshot
/// repository.
pub struct Session {
    state: SessionState,
    engine: Box<dyn RuleEngine>,
    env: Arc<dyn GameEnv>,
    repository: Option<Box<dyn SnapshotRepository>>,
    art: ArtSelector,
    index: NameIndex,
}

impl Session {
    /// Create a fresh session (no turn has run yet; call [`Session::start`]).
    pub fn new(
        engine: Box<dyn RuleEngine>,
        env: Arc<dyn GameEnv>,
        repository: Option<Box<dyn SnapshotRepository>>,
        seed: u64,
    ) -> Self {
        let state = SessionState::new_game(&env.tables().new_game(), seed);
        Self::with_state(engine, env, repository, state)
    }

    /// Create a session around an existing state (the restore path).
    pub fn with_state(
        engine: Box<dyn RuleEngine>,
        env: Arc<dyn GameEnv>,
        repository: Option<Box<dyn SnapshotRepository>>,
        state: SessionState,
    ) -> Self {
        let art = ArtSelector::new(&state, env.as_ref());
        let index = NameIndex::from_env(env.as_ref());
        Self {
            state,
            engine,
            env,
            repository,
            art,
            index,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Render the opening turn of a session.
    pub fn start(&mut self) -> Result<TurnPayload> {
        let mut working = self.state.clone();
        let screen = self
            .engine
            .initial_screen(&mut working, self.env.as_ref())?;
        self.state = working;
        self.art.rekey(&self.state, self.env.as_ref());

        let payload = self.build_payload(&screen);
        self.persist();
        Ok(payload)
    }

    /// Resolve one command through the full pipeline.
    ///
    /// On engine failure nothing is committed or persisted and the error is
    /// surfaced; the caller retries or refreshes manually.
    pub fn submit_command(&mut self, raw: &str) -> Result<TurnPayload> {
        if self.state.game_over {
            return Ok(self.build_payload("The session has ended. Reset to play again."));
        }

        let mut working = self.state.clone();
        let screen = self
            .engine
            .process_command(&mut working, raw, self.env.as_ref())?;
        working.turn += 1;

        let prev = std::mem::replace(&mut self.state, working);
        self.art
            .on_turn(&prev, &self.state, raw, self.env.as_ref());

        let payload = self.build_payload(&screen);
        self.persist();
        Ok(payload)
    }

    /// Discard the running game, purge persisted snapshots, start fresh.
    pub fn reset(&mut self, seed: u64) -> Result<TurnPayload> {
        if let Some(repository) = &self.repository
            && let Err(err) = repository.clear()
        {
            tracing::warn!(%err, "failed to clear persisted snapshots on reset");
        }

        self.state = SessionState::new_game(&self.env.tables().new_game(), seed);
        self.art.rekey(&self.state, self.env.as_ref());
        self.start()
    }

    /// Snapshot of the current session as a self-contained document.
    pub fn export_snapshot(&self) -> Value {
        snapshot::serialize(&self.state)
    }

    /// Replace the running session with a restored snapshot.
    ///
    /// On failure the live session is untouched and the error carries the
    /// stable [`crate::api::ErrorCode`].
    pub fn import_snapshot(
        &mut self,
        document: &Value,
        fallback_seed: u64,
    ) -> std::result::Result<TurnPayload, RestoreError> {
        let restored = snapshot::restore(document, self.env.as_ref(), fallback_seed)?;
        self.state = restored;
        self.art.rekey(&self.state, self.env.as_ref());

        let payload = self.build_payload("Snapshot restored.");
        self.persist();
        Ok(payload)
    }

    /// Parse and import snapshot text.
    pub fn import_snapshot_str(
        &mut self,
        text: &str,
        fallback_seed: u64,
    ) -> std::result::Result<TurnPayload, RestoreError> {
        let document = snapshot::parse_document(text)?;
        self.import_snapshot(&document, fallback_seed)
    }

    /// Assemble the per-turn response document. Pure over the current
    /// state: calling it twice yields the same payload.
    fn build_payload(&self, screen: &str) -> TurnPayload {
        let env = self.env.as_ref();

        let hint_lines = self.engine.action_hints(&self.state, env);
        let screen = strip_hint_block(screen, &hint_lines);
        let catalog = build_catalog(&hint_lines, &self.state, &self.index);

        let step = self.engine.recommended_step(&self.state, env);
        let ctx = RecommendContext::new(&self.state, env, step);
        let mut actions = catalog.actions;
        rank_actions(&ctx, &mut actions);
        let hints = derive_hints(&ctx, &actions);

        TurnPayload {
            screen_text: ansi::decode(&screen),
            game_over: self.state.game_over,
            in_combat: self.state.in_encounter(),
            status_summary: StatusSummary::from_state(&self.state, env),
            inventory_summary: InventorySummary::from_state(&self.state, env),
            location_summary: LocationSummary::from_state(&self.state, env),
            kill_summary: KillSummary::from_state(&self.state),
            art: self.art.current().clone(),
            actions_heading: catalog.heading,
            actions,
            hints,
        }
    }

    /// Best-effort persistence after a successful turn. A write failure
    /// only risks losing the ability to resume later.
    fn persist(&self) {
        let Some(repository) = &self.repository else {
            return;
        };
        let document = snapshot::serialize(&self.state);
        if let Err(err) = repository.save(&document) {
            tracing::warn!(%err, "snapshot persistence failed; turn continues unsaved");
        }
    }
}

/// Drop the engine's trailing hint block from the screen when it matches
/// the structurally rebuilt hint lines.
fn strip_hint_block(screen: &str, hint_lines: &[String]) -> String {
    if hint_lines.is_empty() {
        return screen.to_string();
    }
    let block = hint_lines.join("\n");
    match screen.strip_suffix(&block) {
        Some(stripped) => stripped.trim_end().to_string(),
        None => screen.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_hint_block_removes_exact_trailing_block() {
        let hints = vec![
            "Available actions (1):".to_string(),
            "  look: Look around.".to_string(),
        ];
        let screen = format!("You move east.\n{}", hints.join("\n"));
        assert_eq!(strip_hint_block(&screen, &hints), "You move east.");
    }

    #[test]
    fn strip_hint_block_keeps_unrelated_screens() {
        let hints = vec!["Combat actions (1):".to_string()];
        assert_eq!(strip_hint_block("Just text", &hints), "Just text");
        assert_eq!(strip_hint_block("Just text", &[]), "Just text");
    }
}
