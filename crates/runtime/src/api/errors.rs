//! Unified error types surfaced by the session API.
//!
//! Wraps failures from the rule engine, repositories, and the snapshot
//! codec so clients can bubble them up with consistent context.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use game_core::EngineError;

use crate::repository::RepositoryError;
use crate::snapshot::RestoreError;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The rule engine failed mid-turn. The pending command was not
    /// committed or persisted; the session root is unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Restore(#[from] RestoreError),
}

/// Stable error codes for snapshot import failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidPayload,
    MissingState,
    RestoreFailed,
}
