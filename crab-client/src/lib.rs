//! Crab Client - replica sync for the order server
//!
//! Keeps a local, read-mostly replica of active orders in step with the
//! server's hash-chained event log, and submits operator commands back.

pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod http;
pub mod logger;
pub mod storage;
pub mod transport;

pub use config::{ClientConfig, LogConfig, PricingConfig, SyncConfig};
pub use cursor::{ConnectionState, SyncCursor};
pub use engine::{SyncEngine, SyncMode, SyncOutcome};
pub use error::{ClientError, ClientResult, SyncError, SyncResult, TransportError};
pub use http::HttpTransport;
pub use storage::{StorageError, StorageResult, SyncStorage};
pub use transport::{CommandTransport, RuleSource, SyncTransport};
