//! Sync protocol DTOs exchanged with the authoritative event log

use super::event::OrderEvent;
use super::snapshot::OrderSnapshot;
use serde::{Deserialize, Serialize};

/// Sync request (reconnection / catch-up)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncRequest {
    /// Last sequence the client applied; 0 asks for a full baseline
    pub since_sequence: u64,
}

/// Sync response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Baseline snapshots (authoritative on full sync)
    #[serde(default)]
    pub active_orders: Vec<OrderSnapshot>,
    /// Highest sequence in the server log at response time
    pub server_sequence: u64,
    /// Log identity; changes when the server resets its log
    pub server_epoch: String,
    /// Events after `since_sequence`, ascending
    #[serde(default)]
    pub events: Vec<OrderEvent>,
    /// Server asks the client to discard its state
    #[serde(default)]
    pub requires_full_sync: bool,
}

impl SyncResponse {
    /// Highest sequence actually contained in `events`
    pub fn last_event_sequence(&self) -> Option<u64> {
        self.events.iter().map(|e| e.sequence).max()
    }
}
