//! Types downstream clients interact with.

mod errors;
mod payload;

pub use errors::{ErrorCode, Result, SessionError};
pub use payload::{
    Action, ActionCategory, ExitView, Hint, InventoryEntry, InventorySummary, KillEntry,
    KillSummary, LocationSummary, StatusSummary, TurnPayload,
};
