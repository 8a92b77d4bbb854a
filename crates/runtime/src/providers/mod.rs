//! Rule-engine providers.
//!
//! The real combat/quest/loot engine lives behind the
//! [`game_core::RuleEngine`] port. This module ships [`ScriptedEngine`], a
//! deliberately small stand-in used by the demo client and the integration
//! tests.

mod scripted;

pub use scripted::ScriptedEngine;
