//! Transport seams
//!
//! The sync engine only talks to the server through these traits, so tests
//! and alternative transports can stand in for HTTP.

use async_trait::async_trait;
use shared::models::price_rule::RuleSet;
use shared::order::{CommandResponse, OrderCommand, SyncRequest, SyncResponse};

use crate::error::TransportError;

/// Event log replication
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Establish (or check) the connection
    async fn connect(&self) -> Result<(), TransportError>;

    /// Fetch events after `request.since_sequence`; 0 requests a full baseline
    async fn fetch(&self, request: SyncRequest) -> Result<SyncResponse, TransportError>;
}

/// Command submission; the server turns accepted commands into events
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn submit(&self, command: OrderCommand) -> Result<CommandResponse, TransportError>;
}

/// Price rule configuration source
#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn fetch_rules(&self) -> Result<RuleSet, TransportError>;
}
