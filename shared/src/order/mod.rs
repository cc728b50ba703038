//! Order Event Sourcing Module
//!
//! - Commands: requests from clients to modify orders
//! - Events: immutable, hash-chained facts recorded by the server
//! - Snapshots: order state computed from the event stream

pub mod applied_rule;
pub mod command;
pub mod event;
pub mod hash;
pub mod line_item;
pub mod snapshot;
pub mod sync;
pub mod types;

// Re-exports
pub use applied_rule::RuleAdjustment;
pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType, TablePlacement};
pub use hash::GENESIS_HASH;
pub use line_item::OrderLineItem;
pub use snapshot::{OrderSnapshot, OrderStatus};
pub use sync::{SyncRequest, SyncResponse};
pub use types::*;
