//! Key-value store abstraction and implementations
//!
//! This module provides the seam between the shared logic and the
//! platform-provided settings backend. Each platform supplies a store with
//! typed get/put/remove over a flat, persistent namespace; the library ships
//! an in-memory store for tests and previews and a JSON-file store for
//! desktop use.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Result, StorageError};

/// Flat typed key-value store over a persistent namespace
///
/// Implementations must be safe to share between repositories; every
/// operation is a complete read or write with no cross-key transaction.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a string value, or `None` if the key is absent
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Write a string value, replacing any previous value
    async fn put_string(&self, key: &str, value: &str) -> Result<()>;

    /// Read an integer value, or `None` if the key is absent
    async fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    /// Write an integer value, replacing any previous value
    async fn put_i64(&self, key: &str, value: i64) -> Result<()>;

    /// Remove a key; absent keys are a no-op
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key in the namespace
    async fn clear(&self) -> Result<()>;
}

/// In-memory store for tests and previews
///
/// Optionally simulates backend latency so that view-model suspension points
/// behave like they do against a real settings backend.
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    delay: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            delay: Duration::from_millis(0),
        }
    }

    /// Create a store that sleeps before every operation
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            delay,
        }
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.simulate_latency().await;
        let values = self.values.lock().unwrap();
        Ok(values.get(key).and_then(Value::as_str).map(String::from))
    }

    async fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.simulate_latency().await;
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), Value::String(value.to_string()));
        Ok(())
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.simulate_latency().await;
        let values = self.values.lock().unwrap();
        Ok(values.get(key).and_then(Value::as_i64))
    }

    async fn put_i64(&self, key: &str, value: i64) -> Result<()> {
        self.simulate_latency().await;
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), Value::from(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.simulate_latency().await;
        let mut values = self.values.lock().unwrap();
        values.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.simulate_latency().await;
        let mut values = self.values.lock().unwrap();
        values.clear();
        Ok(())
    }
}

/// JSON-file-backed store for desktop targets
///
/// The whole namespace lives in one JSON object; every write is a
/// read-modify-write of the full file, serialized behind an internal lock.
pub struct FileStore {
    path: PathBuf,
    io_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    /// Open a store at the given path, creating parent directories
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::IoError)?;
        }

        Ok(Self {
            path,
            io_lock: tokio::sync::Mutex::new(()),
        })
    }

    async fn read_map(&self) -> Result<Map<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let value: Value =
                    serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
                        key: self.path.display().to_string(),
                        detail: e.to_string(),
                    })?;
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(StorageError::Corrupt {
                        key: self.path.display().to_string(),
                        detail: format!("expected a JSON object, found {}", other),
                    }
                    .into()),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(StorageError::IoError(e).into()),
        }
    }

    async fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_string_pretty(&Value::Object(map.clone()))
            .map_err(StorageError::SerializeError)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(StorageError::IoError)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.io_lock.lock().await;
        let map = self.read_map().await?;
        Ok(map.get(key).and_then(Value::as_str).map(String::from))
    }

    async fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.io_lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map).await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        let _guard = self.io_lock.lock().await;
        let map = self.read_map().await?;
        Ok(map.get(key).and_then(Value::as_i64))
    }

    async fn put_i64(&self, key: &str, value: i64) -> Result<()> {
        let _guard = self.io_lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), Value::from(value));
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.io_lock.lock().await;
        let mut map = self.read_map().await?;
        map.remove(key);
        self.write_map(&map).await
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.io_lock.lock().await;
        self.write_map(&Map::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        store.put_string("users", "[]").await.unwrap();
        store.put_i64("active_user_id", 42).await.unwrap();

        assert_eq!(store.get_string("users").await.unwrap().unwrap(), "[]");
        assert_eq!(store.get_i64("active_user_id").await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_memory_store_absent_keys() {
        let store = MemoryStore::new();
        assert_eq!(store.get_string("missing").await.unwrap(), None);
        assert_eq!(store.get_i64("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_type_mismatch_reads_as_absent() {
        let store = MemoryStore::new();
        store.put_i64("key", 7).await.unwrap();
        assert_eq!(store.get_string("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_remove_and_clear() {
        let store = MemoryStore::new();
        store.put_string("a", "1").await.unwrap();
        store.put_string("b", "2").await.unwrap();

        store.remove("a").await.unwrap();
        assert_eq!(store.get_string("a").await.unwrap(), None);
        assert_eq!(store.get_string("b").await.unwrap().unwrap(), "2");

        store.clear().await.unwrap();
        assert_eq!(store.get_string("b").await.unwrap(), None);

        // Removing an absent key is a no-op
        store.remove("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_delay() {
        let store = MemoryStore::with_delay(Duration::from_millis(20));
        let start = std::time::Instant::now();
        store.put_string("k", "v").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.put_string("users", "[{\"id\":1}]").await.unwrap();
            store.put_i64("active_user_id", 1).await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(
            store.get_string("users").await.unwrap().unwrap(),
            "[{\"id\":1}]"
        );
        assert_eq!(store.get_i64("active_user_id").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("settings.json");

        let store = FileStore::open(&path).await.unwrap();
        store.put_string("k", "v").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileStore::open(&path).await.unwrap();
        let result = store.get_string("users").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_file_store_clear() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let store = FileStore::open(&path).await.unwrap();
        store.put_string("users", "[]").await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get_string("users").await.unwrap(), None);
    }
}
