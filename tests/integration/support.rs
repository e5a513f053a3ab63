use agent_bridge::canonical::NativeAgent;
use agent_bridge::error::StorageError;
use agent_bridge::framework::AgentFramework;
use agent_bridge::store::{KeyValueStore, MemoryKv};
use semver::Version;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn usa(data: Value) -> NativeAgent {
    NativeAgent::new(AgentFramework::Usa, data, Version::new(2, 0, 0))
}

/// Memory store whose first `failures` puts fail with a transient error
pub struct FlakyKv {
    inner: MemoryKv,
    failures: AtomicUsize,
    pub puts: AtomicUsize,
}

impl FlakyKv {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: MemoryKv::new(),
            failures: AtomicUsize::new(failures),
            puts: AtomicUsize::new(0),
        }
    }
}

impl KeyValueStore for FlakyKv {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StorageError::Transient("simulated I/O hiccup".to_string()));
        }
        self.inner.put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.keys(prefix)
    }
}
