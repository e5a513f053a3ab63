//! Key/value storage collaborator.
//!
//! The temporal store's delta and snapshot logic needs nothing beyond this
//! small interface. Two backends are provided: an in-memory map and `sled`.

use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;

/// Minimal byte-oriented storage port
pub trait KeyValueStore: Send + Sync {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Every key starting with `prefix`, in lexicographic order
    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Make previous writes durable
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// In-memory backend
#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryKv {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .entries
            .read()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

/// Sled-backed store
pub struct SledKv {
    db: sled::Db,
}

impl SledKv {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::Backend(format!("Failed to open sled database {}: {}", path.display(), e))
        })?;
        Ok(Self { db })
    }

    /// Database removed when dropped
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }
}

impl KeyValueStore for SledKv {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.db.insert(key.as_bytes(), value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.db.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, _) = entry?;
            let key = String::from_utf8(key.to_vec()).map_err(|e| StorageError::Corrupt {
                key: hex::encode(e.as_bytes()),
                reason: "key is not UTF-8".to_string(),
            })?;
            keys.push(key);
        }
        Ok(keys)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
