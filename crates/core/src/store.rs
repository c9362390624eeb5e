//! Local key-value persistence.
//!
//! Values are stored as text, JSON-encoded where structured, under a small
//! fixed set of keys.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;

/// Key holding the JSON array of board posts.
pub const BOARD_POSTS_KEY: &str = "boardPosts";
/// Key holding the next board post id.
pub const BOARD_NEXT_ID_KEY: &str = "boardPostId";
/// Key holding the board developer-mode flag (`"true"`/`"false"`).
pub const BOARD_DEVELOPER_MODE_KEY: &str = "boardDeveloperMode";
/// Key holding the acquired-items mapping.
pub const ACQUIRED_ITEMS_KEY: &str = "acquiredItems";

/// Text key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Remove `key`; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Decode the JSON value stored under `key`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Encoding {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let text = serde_json::to_string(value).map_err(|source| StoreError::Encoding {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &text)
}

/// Store keeping one file per key beneath a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// In-memory store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.write().remove(key);
        Ok(())
    }
}

fn sanitize_key(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
            result.push(ch);
        }
    }
    if result.is_empty() {
        "value".to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path().join("storage"));

        assert_eq!(store.get(BOARD_NEXT_ID_KEY)?, None);
        store.set(BOARD_NEXT_ID_KEY, "7")?;
        assert_eq!(store.get(BOARD_NEXT_ID_KEY)?.as_deref(), Some("7"));
        assert!(dir.path().join("storage/boardPostId.json").is_file());

        store.remove(BOARD_NEXT_ID_KEY)?;
        store.remove(BOARD_NEXT_ID_KEY)?;
        assert_eq!(store.get(BOARD_NEXT_ID_KEY)?, None);
        Ok(())
    }

    #[test]
    fn json_helpers_report_bad_values() -> Result<()> {
        let store = MemoryStore::new();
        write_json(&store, ACQUIRED_ITEMS_KEY, &vec!["a", "b"])?;
        let decoded: Option<Vec<String>> = read_json(&store, ACQUIRED_ITEMS_KEY)?;
        assert_eq!(decoded, Some(vec!["a".to_string(), "b".to_string()]));

        store.set(ACQUIRED_ITEMS_KEY, "{not json")?;
        let err = read_json::<Vec<String>>(&store, ACQUIRED_ITEMS_KEY).unwrap_err();
        assert!(matches!(err, StoreError::Encoding { .. }));
        Ok(())
    }

    #[test]
    fn sanitize_strips_path_characters() {
        assert_eq!(sanitize_key("../board Posts"), "boardPosts");
        assert_eq!(sanitize_key("///"), "value");
    }
}
