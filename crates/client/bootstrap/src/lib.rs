//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading, oracle assembly, and session setup with
//! restore-or-fresh semantics that can be reused by any front-end crate.
pub mod builder;
pub mod config;
pub mod oracles;

pub use builder::{SessionBuilder, SessionSetup};
pub use config::ClientConfig;
pub use oracles::build_oracles;
