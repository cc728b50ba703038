//! Sync cursor and connection state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection lifecycle as shown to the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Syncing,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    /// Transition table
    ///
    /// `Syncing -> Syncing` covers a full sync escalated from a failed
    /// incremental one; `Reconnecting -> Reconnecting` is a retry.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        match self {
            Disconnected => matches!(next, Connecting),
            Connecting => matches!(next, Syncing | Reconnecting | Disconnected),
            Syncing => matches!(next, Syncing | Connected | Reconnecting | Disconnected),
            Connected => matches!(next, Syncing | Reconnecting | Disconnected),
            Reconnecting => matches!(next, Syncing | Reconnecting | Disconnected),
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "DISCONNECTED",
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Syncing => "SYNCING",
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Reconnecting => "RECONNECTING",
        };
        f.write_str(s)
    }
}

/// Persisted replication position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    /// Highest global sequence applied locally
    pub last_sequence: u64,
    /// Epoch of the log `last_sequence` refers to; `None` until the first full sync
    #[serde(default)]
    pub server_epoch: Option<String>,
    #[serde(default)]
    pub connection_state: ConnectionState,
}

impl SyncCursor {
    /// Whether an incremental sync can resume from this cursor
    pub fn is_resumable(&self) -> bool {
        self.server_epoch.is_some()
    }

    pub fn reset(&mut self) {
        self.last_sequence = 0;
        self.server_epoch = None;
    }
}
