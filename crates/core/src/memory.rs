//! In-memory ObjectStore
//!
//! Keeps objects in a sorted map. Available to tests and, through the
//! `test-util` feature, to downstream crates' tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use jiff::Timestamp;

use crate::error::{Error, Result};
use crate::traits::{ObjectInfo, ObjectStore};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    modified: Timestamp,
}

/// ObjectStore backed by a process-local map
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored, in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Whether an object exists at `key`
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        // A poisoned map is still structurally valid
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<()> {
        self.lock().insert(
            key.to_string(),
            StoredObject {
                data,
                modified: Timestamp::now(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.lock()
            .get(key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn list_objects(&self) -> Result<Vec<ObjectInfo>> {
        Ok(self
            .lock()
            .iter()
            .map(|(key, obj)| ObjectInfo::new(key, obj.data.len() as i64).modified_at(obj.modified))
            .collect())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
