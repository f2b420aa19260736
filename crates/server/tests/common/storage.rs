//! Storage test utilities.

use async_trait::async_trait;
use bytes::Bytes;
use clientpulse_storage::{ObjectStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// An object stored by [`MemoryStore`].
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// In-memory object store that records every put.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[derive(Default)]
#[allow(dead_code)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Object store whose writes always fail.
#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put(&self, _key: &str, _data: Bytes, _content_type: &str) -> StorageResult<()> {
        Err(StorageError::AccessDenied("screens".to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        Err(StorageError::NotFound(key.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
