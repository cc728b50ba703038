//! Client error types

use crab_orders::IntegrityError;
use shared::order::CommandError;
use thiserror::Error;

use crate::cursor::ConnectionState;
use crate::storage::StorageError;

/// HTTP client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Transport failures; always transient from the sync engine's point of view
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) if e.is_connect() || e.is_timeout() => {
                TransportError::Connect(e.to_string())
            }
            ClientError::Http(e) => TransportError::Http(e.to_string()),
            ClientError::InvalidResponse(msg) => TransportError::Decode(msg),
            ClientError::Serialization(e) => TransportError::Decode(e.to_string()),
            ClientError::Unauthorized => TransportError::Status {
                status: 401,
                body: "unauthorized".into(),
            },
            ClientError::Forbidden(body) => TransportError::Status { status: 403, body },
            ClientError::NotFound(body) => TransportError::Status { status: 404, body },
            ClientError::Validation(body) => TransportError::Status { status: 400, body },
            ClientError::Internal(body) => TransportError::Status { status: 500, body },
        }
    }
}

/// Synchronization errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Sequence gap: expected {expected}, received {received}")]
    SequenceGap { expected: u64, received: u64 },

    #[error("Out-of-order events for order {order_id}: {previous} then {received}")]
    OrderingViolation {
        order_id: String,
        previous: u64,
        received: u64,
    },

    #[error("Server epoch changed: local {local}, remote {remote}")]
    EpochMismatch { local: String, remote: String },

    #[error("Sync request timed out")]
    Timeout,

    #[error("Sync superseded by a newer request")]
    Superseded,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid connection transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },

    #[error("Order {0} is not a ghost order")]
    NotAGhost(String),

    #[error("Command rejected: {0}")]
    CommandRejected(String),
}

impl SyncError {
    /// Errors that can only be resolved by discarding local state
    pub fn requires_full_sync(&self) -> bool {
        matches!(
            self,
            SyncError::Integrity(_)
                | SyncError::SequenceGap { .. }
                | SyncError::OrderingViolation { .. }
                | SyncError::EpochMismatch { .. }
        )
    }

    /// Errors worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Transport(_) | SyncError::Timeout)
    }
}

impl From<CommandError> for SyncError {
    fn from(err: CommandError) -> Self {
        SyncError::CommandRejected(err.to_string())
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
