//! Shared types for the Crab order core
//!
//! Wire and data model shared by the pure order core and the sync client:
//! events, commands, snapshots, price rules and receipt documents.

pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
