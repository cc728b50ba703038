//! redb-backed persistence for the local replica
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `meta` | `"cursor"` | `SyncCursor` | Replication position |
//! | `snapshots` | `order_id` | `OrderSnapshot` | Local order views |
//! | `rules` | `"current"` | `RuleSet` | Last fetched price rules |
//!
//! Values are JSON. The cursor and the snapshots it covers are always
//! written in the same transaction, so a crash never leaves a cursor that
//! is ahead of the stored snapshots.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::price_rule::RuleSet;
use shared::order::OrderSnapshot;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::cursor::SyncCursor;

const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");
const RULES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("rules");

const CURSOR_KEY: &str = "cursor";
const RULES_KEY: &str = "current";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Everything restored at startup
#[derive(Debug, Clone, Default)]
pub struct Restored {
    pub cursor: SyncCursor,
    pub snapshots: Vec<OrderSnapshot>,
    pub rules: Option<RuleSet>,
}

/// Replica storage backed by redb
#[derive(Clone)]
pub struct SyncStorage {
    db: Arc<Database>,
}

impl SyncStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(META_TABLE)?;
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(RULES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Reads ==========

    pub fn load_cursor(&self) -> StorageResult<Option<SyncCursor>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(META_TABLE)?;
        match table.get(CURSOR_KEY)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn load_snapshots(&self) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;
        let mut snapshots = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            snapshots.push(serde_json::from_slice(value.value())?);
        }
        Ok(snapshots)
    }

    pub fn load_rules(&self) -> StorageResult<Option<RuleSet>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RULES_TABLE)?;
        match table.get(RULES_KEY)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Cursor, snapshots and rules in one read
    pub fn restore(&self) -> StorageResult<Restored> {
        Ok(Restored {
            cursor: self.load_cursor()?.unwrap_or_default(),
            snapshots: self.load_snapshots()?,
            rules: self.load_rules()?,
        })
    }

    // ========== Writes ==========

    /// Persist the cursor together with the snapshots changed by one batch
    pub fn save_batch<'a>(
        &self,
        cursor: &SyncCursor,
        changed: impl IntoIterator<Item = &'a OrderSnapshot>,
        removed: &[String],
    ) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
            for snapshot in changed {
                let bytes = serde_json::to_vec(snapshot)?;
                table.insert(snapshot.order_id.as_str(), bytes.as_slice())?;
            }
            for order_id in removed {
                table.remove(order_id.as_str())?;
            }
        }
        Self::write_cursor(&txn, cursor)?;
        txn.commit()?;
        Ok(())
    }

    /// Replace every stored snapshot and the cursor (full sync)
    pub fn replace_all<'a>(
        &self,
        cursor: &SyncCursor,
        snapshots: impl IntoIterator<Item = &'a OrderSnapshot>,
    ) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        txn.delete_table(SNAPSHOTS_TABLE)?;
        {
            let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
            for snapshot in snapshots {
                let bytes = serde_json::to_vec(snapshot)?;
                table.insert(snapshot.order_id.as_str(), bytes.as_slice())?;
            }
        }
        Self::write_cursor(&txn, cursor)?;
        txn.commit()?;
        Ok(())
    }

    pub fn save_cursor(&self, cursor: &SyncCursor) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        Self::write_cursor(&txn, cursor)?;
        txn.commit()?;
        Ok(())
    }

    pub fn save_rules(&self, rules: &RuleSet) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(RULES_TABLE)?;
            let bytes = serde_json::to_vec(rules)?;
            table.insert(RULES_KEY, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Drop everything; the next sync is a full one
    pub fn clear(&self) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        txn.delete_table(SNAPSHOTS_TABLE)?;
        txn.delete_table(META_TABLE)?;
        {
            let _ = txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = txn.open_table(META_TABLE)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn write_cursor(txn: &WriteTransaction, cursor: &SyncCursor) -> StorageResult<()> {
        let mut table = txn.open_table(META_TABLE)?;
        let bytes = serde_json::to_vec(cursor)?;
        table.insert(CURSOR_KEY, bytes.as_slice())?;
        Ok(())
    }
}
