//! The remote notebook service.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use notebook_editor::SmolStr;

use crate::error::StoreError;
use crate::notebook::{NewNotebook, Notebook, NotebookUpdate};

/// Remote document service.
///
/// Updates carry the version the client last saw. A store must answer a stale
/// version with `StoreError::Conflict` rather than overwriting.
pub trait NotebookStore {
    /// Fetch a notebook by short id. `Ok(None)` when it does not exist.
    fn get(
        &self,
        short_id: &str,
    ) -> impl Future<Output = Result<Option<Notebook>, StoreError>>;

    /// Create a notebook and return the stored record.
    fn create(&self, notebook: NewNotebook) -> impl Future<Output = Result<Notebook, StoreError>>;

    /// Update a notebook and return the stored record.
    fn update(
        &self,
        short_id: &str,
        update: NotebookUpdate,
    ) -> impl Future<Output = Result<Notebook, StoreError>>;
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    notebooks: BTreeMap<SmolStr, Notebook>,
    next_id: u64,
}

/// In-memory `NotebookStore` with optimistic version checks.
///
/// Clones share the same records, so one handle can play "another client"
/// while a controller holds the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotebookStore {
    inner: Rc<RefCell<MemoryStoreInner>>,
}

impl MemoryNotebookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record as-is.
    pub fn insert(&self, notebook: Notebook) {
        self.inner
            .borrow_mut()
            .notebooks
            .insert(notebook.short_id.clone(), notebook);
    }

    /// Current record for `short_id`.
    pub fn notebook(&self, short_id: &str) -> Option<Notebook> {
        self.inner.borrow().notebooks.get(short_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().notebooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().notebooks.is_empty()
    }
}

impl NotebookStore for MemoryNotebookStore {
    async fn get(&self, short_id: &str) -> Result<Option<Notebook>, StoreError> {
        Ok(self.notebook(short_id))
    }

    async fn create(&self, notebook: NewNotebook) -> Result<Notebook, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let short_id = SmolStr::new(format!("nb-{}", inner.next_id));
        let created = Notebook {
            short_id: short_id.clone(),
            title: notebook.title,
            content: notebook.content,
            text_content: Some(notebook.text_content),
            version: 0,
            is_template: false,
        };
        inner.notebooks.insert(short_id, created.clone());
        Ok(created)
    }

    async fn update(&self, short_id: &str, update: NotebookUpdate) -> Result<Notebook, StoreError> {
        let mut inner = self.inner.borrow_mut();
        let Some(existing) = inner.notebooks.get_mut(short_id) else {
            return Err(StoreError::transport(format!("notebook {short_id} does not exist")));
        };
        if existing.version != update.version {
            return Err(StoreError::Conflict);
        }

        existing.content = update.content;
        existing.text_content = Some(update.text_content);
        existing.title = update.title;
        existing.version += 1;
        Ok(existing.clone())
    }
}

#[cfg(test)]
mod tests {
    use notebook_editor::JsonContent;

    use super::*;

    fn update(version: u64, heading: &str) -> NotebookUpdate {
        NotebookUpdate {
            version,
            content: JsonContent::doc([JsonContent::heading(1, heading)]),
            text_content: heading.to_string(),
            title: Some(heading.to_string()),
        }
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = MemoryNotebookStore::new();
        store.insert(Notebook::new("abc"));

        let saved = store.update("abc", update(0, "First")).await.unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(saved.title.as_deref(), Some("First"));
        assert_eq!(store.notebook("abc"), Some(saved));
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let store = MemoryNotebookStore::new();
        store.insert(Notebook::new("abc").with_version(3));

        let result = store.update("abc", update(2, "Stale")).await;
        assert_eq!(result, Err(StoreError::Conflict));
        assert_eq!(store.notebook("abc").unwrap().version, 3);
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let store = MemoryNotebookStore::new();
        let new = NewNotebook {
            content: JsonContent::doc([]),
            text_content: String::new(),
            title: None,
        };
        let a = store.create(new.clone()).await.unwrap();
        let b = store.create(new).await.unwrap();
        assert_ne!(a.short_id, b.short_id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&a.short_id).await.unwrap(), Some(a));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }
}
