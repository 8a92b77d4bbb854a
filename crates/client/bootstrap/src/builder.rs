//! Session setup with restore-or-fresh semantics.

use std::sync::Arc;

use game_core::{GameEnv, RuleEngine};
use runtime::{
    FileSnapshotRepository, ScriptedEngine, Session, SnapshotRepository, restore,
};

use crate::config::ClientConfig;
use crate::oracles::build_oracles;

/// A constructed session plus how it came to be.
pub struct SessionSetup {
    pub session: Session,
    /// True when a persisted snapshot was resumed.
    pub restored: bool,
    /// Passive status-line notice (e.g. an ignored corrupt snapshot).
    pub notice: Option<String>,
}

/// Builder wiring config, oracles, repository, and engine into a session.
pub struct SessionBuilder {
    config: ClientConfig,
    engine: Option<Box<dyn RuleEngine>>,
}

impl SessionBuilder {
    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env(),
            engine: None,
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject a rule engine; defaults to the scripted stand-in.
    pub fn with_engine(mut self, engine: Box<dyn RuleEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Build the session, resuming a persisted snapshot when one exists
    /// and restores cleanly. A corrupt snapshot is reported passively and
    /// the session starts fresh; it is never a hard error.
    pub fn build(self) -> anyhow::Result<SessionSetup> {
        let env = build_oracles(self.config.data_dir.as_deref())?;
        let engine = self
            .engine
            .unwrap_or_else(|| Box::new(ScriptedEngine::new()));

        let repository: Option<Box<dyn SnapshotRepository>> = if self.config.persist {
            match self.config.resolved_snapshot_dir() {
                Some(dir) => Some(Box::new(FileSnapshotRepository::new(&dir)?)),
                None => {
                    tracing::warn!("no snapshot directory available; persistence disabled");
                    None
                }
            }
        } else {
            None
        };

        let seed: u64 = rand::random();
        let mut notice = None;
        let mut restored_state = None;

        if let Some(repository) = &repository {
            match repository.load() {
                Ok(Some(document)) => {
                    match restore(&document, env.as_ref() as &dyn GameEnv, seed) {
                        Ok(state) => restored_state = Some(state),
                        Err(err) => {
                            tracing::warn!(%err, "persisted snapshot rejected; starting fresh");
                            notice =
                                Some("Saved game could not be restored; starting fresh.".to_string());
                        }
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(%err, "persisted snapshot unreadable; starting fresh");
                    notice = Some("Saved game could not be read; starting fresh.".to_string());
                }
            }
        }

        // Starting fresh: purge stale snapshot versions instead of leaving
        // them orphaned next to the new save.
        if restored_state.is_none()
            && let Some(repository) = &repository
            && let Err(err) = repository.clear()
        {
            tracing::warn!(%err, "failed to purge stale snapshots");
        }

        let restored = restored_state.is_some();
        let session = match restored_state {
            Some(state) => Session::with_state(engine, env, repository, state),
            None => Session::new(engine, env, repository, seed),
        };

        Ok(SessionSetup {
            session,
            restored,
            notice,
        })
    }
}
