//! Durable local edit buffers.
//!
//! ## Key strategy
//!
//! Each notebook's unsaved edits live under
//! `"{schema_version}:notebook:{short_id}:local"`. The schema prefix means a
//! schema bump silently abandons buffers written by older clients instead of
//! feeding them un-migrated content.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use notebook_editor::JsonContent;

use crate::error::NotebookError;

/// Build the buffer key for a notebook.
pub fn local_content_key(schema_version: u32, short_id: &str) -> String {
    format!("{schema_version}:notebook:{short_id}:local")
}

/// Key/value storage for serialized buffers.
pub trait LocalBufferStore {
    fn get(&self, key: &str) -> Result<Option<String>, NotebookError>;
    fn set(&self, key: &str, value: &str) -> Result<(), NotebookError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), NotebookError>;
}

/// In-memory buffer store. Clones share entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryBufferStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl LocalBufferStore for MemoryBufferStore {
    fn get(&self, key: &str) -> Result<Option<String>, NotebookError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NotebookError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), NotebookError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileBufferStore {
    dir: PathBuf,
}

impl FileBufferStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9._-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl LocalBufferStore for FileBufferStore {
    fn get(&self, key: &str) -> Result<Option<String>, NotebookError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NotebookError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), NotebookError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A single notebook's buffer: a store plus its key.
///
/// Failures never escape. A buffer that cannot be read or parsed is treated
/// as absent, and write failures only cost durability, so both are logged.
pub struct LocalBuffer {
    store: Box<dyn LocalBufferStore>,
    key: String,
}

impl LocalBuffer {
    pub fn new(store: Box<dyn LocalBufferStore>, key: String) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the persisted buffer, if any.
    pub fn load(&self) -> Option<JsonContent> {
        let raw = match self.store.get(&self.key) {
            Ok(raw) => raw?,
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "failed to read local buffer");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(content) => Some(content),
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "discarding unparseable local buffer");
                None
            }
        }
    }

    pub fn save(&self, content: &JsonContent) {
        let result = serde_json::to_string(content)
            .map_err(NotebookError::from)
            .and_then(|raw| self.store.set(&self.key, &raw));
        if let Err(error) = result {
            tracing::warn!(key = %self.key, %error, "failed to persist local buffer");
        }
    }

    pub fn clear(&self) {
        if let Err(error) = self.store.remove(&self.key) {
            tracing::warn!(key = %self.key, %error, "failed to clear local buffer");
        }
    }
}

impl std::fmt::Debug for LocalBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBuffer").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(text: &str) -> JsonContent {
        JsonContent::doc([JsonContent::heading(1, text)])
    }

    #[test]
    fn test_key_is_namespaced_by_schema() {
        assert_eq!(local_content_key(1, "abc"), "1:notebook:abc:local");
        assert_ne!(local_content_key(1, "abc"), local_content_key(2, "abc"));
    }

    #[test]
    fn test_memory_buffer_round_trip() {
        let store = MemoryBufferStore::new();
        let buffer = LocalBuffer::new(Box::new(store.clone()), local_content_key(1, "abc"));
        assert_eq!(buffer.load(), None);

        buffer.save(&heading("Draft"));
        assert!(store.contains_key("1:notebook:abc:local"));
        assert_eq!(buffer.load(), Some(heading("Draft")));

        buffer.clear();
        assert_eq!(buffer.load(), None);
        // clearing twice is fine
        buffer.clear();
    }

    #[test]
    fn test_unparseable_buffer_is_discarded() {
        let store = MemoryBufferStore::new();
        store.set("1:notebook:abc:local", "{not json").unwrap();
        let buffer = LocalBuffer::new(Box::new(store), local_content_key(1, "abc"));
        assert_eq!(buffer.load(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let key = local_content_key(1, "abc");

        let first = LocalBuffer::new(Box::new(FileBufferStore::new(dir.path())), key.clone());
        first.save(&heading("On disk"));

        let second = LocalBuffer::new(Box::new(FileBufferStore::new(dir.path())), key.clone());
        assert_eq!(second.load(), Some(heading("On disk")));

        second.clear();
        assert!(!FileBufferStore::new(dir.path()).path_for(&key).exists());
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let store = FileBufferStore::new("/tmp/buffers");
        assert_eq!(
            store.path_for("1:notebook:a/b:local"),
            PathBuf::from("/tmp/buffers/1_notebook_a_b_local.json")
        );
    }

    #[test]
    fn test_file_store_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBufferStore::new(dir.path().join("not-yet-created"));
        assert_eq!(store.get("nothing").unwrap(), None);
        store.remove("nothing").unwrap();
    }

    #[test]
    fn test_file_store_write_failure_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "a file, not a directory").unwrap();

        let store = FileBufferStore::new(&blocked);
        assert!(matches!(store.set("key", "{}"), Err(NotebookError::Io(_))));

        // Buffer failures are logged, never raised.
        let buffer = LocalBuffer::new(Box::new(store), local_content_key(1, "abc"));
        buffer.save(&heading("lost"));
        assert_eq!(buffer.load(), None);
    }
}
