// KwitterStore - Persistent key-value storage using sled
//
// Holds the ledger snapshot between CLI invocations, standing in for the
// chain's durable contract storage.

use crate::ledger::{Ledger, LedgerError};
use std::path::Path;
use thiserror::Error;

/// Key prefixes for organizing data
mod keys {
    pub const LEDGER_STATE: &[u8] = b"ledger:state";
}

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of keys in the database
    pub key_count: usize,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Persistent store for the ledger
pub struct KwitterStore {
    db: sled::Db,
}

impl KwitterStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db })
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    /// Get storage statistics
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            key_count: self.db.len(),
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        }
    }

    /// Check whether a ledger has been saved
    pub fn has_ledger(&self) -> Result<bool, StoreError> {
        Ok(self.db.contains_key(keys::LEDGER_STATE)?)
    }

    /// Save the ledger state
    pub fn save_ledger(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let bytes = ledger
            .to_bytes()
            .map_err(|e: LedgerError| StoreError::SerializationFailed(e.to_string()))?;
        self.db.insert(keys::LEDGER_STATE, bytes)?;
        Ok(())
    }

    /// Load the ledger state
    pub fn load_ledger(&self) -> Result<Option<Ledger>, StoreError> {
        match self.db.get(keys::LEDGER_STATE)? {
            Some(bytes) => {
                let ledger = Ledger::from_bytes(&bytes)
                    .map_err(|e: LedgerError| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(ledger))
            }
            None => Ok(None),
        }
    }
}
