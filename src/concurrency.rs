//! Per-URI write serialization for the temporal store
//!
//! Ingests for the same agent URI take that URI's write lock and are totally
//! ordered. Different URIs hold different locks and never contend; there is
//! no global lock. Reads of committed versions need no lock at all because
//! version records are immutable once written.
//!
//! Entries for idle URIs are pruned when the last scoped writer releases
//! them, so the map holds only URIs with a writer in flight.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-URI lock manager
pub struct UriLockManager {
    /// Map from agent URI to its lock
    locks: Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>,
}

impl UriLockManager {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get or create the lock for a URI
    pub fn get_lock(&self, uri: &str) -> Arc<RwLock<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(uri) {
                return lock.clone();
            }
        }

        let mut map = self.locks.write();
        // Another writer may have inserted it between the two locks
        map.entry(uri.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Run `f` holding the write lock for `uri`, then prune the entry if idle
    pub fn with_write_lock<T>(&self, uri: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.get_lock(uri);
        let outcome = {
            let _guard = lock.write();
            f()
        };
        drop(lock);
        self.prune(uri);
        outcome
    }

    /// Drop the entry for `uri` when nothing outside the map holds its lock
    ///
    /// Clones are only taken under the map lock, so a count of one cannot
    /// race with a concurrent `get_lock`.
    pub fn prune(&self, uri: &str) {
        let mut map = self.locks.write();
        if map.get(uri).map_or(false, |lock| Arc::strong_count(lock) == 1) {
            map.remove(uri);
        }
    }

    /// Number of URIs with a live lock entry
    pub fn tracked(&self) -> usize {
        self.locks.read().len()
    }
}

impl Default for UriLockManager {
    fn default() -> Self {
        Self::new()
    }
}
