//! Callbacks into the application hosting a notebook.

use futures_util::future::LocalBoxFuture;

use crate::error::NotebookError;
use crate::notebook::Notebook;
use crate::source::SCRATCHPAD_SHORT_ID;

/// What a duplicated notebook was copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateSource {
    Scratchpad,
    Template,
    Notebook,
}

impl DuplicateSource {
    pub fn of(notebook: &Notebook) -> Self {
        if notebook.short_id == SCRATCHPAD_SHORT_ID {
            DuplicateSource::Scratchpad
        } else if notebook.is_template {
            DuplicateSource::Template
        } else {
            DuplicateSource::Notebook
        }
    }
}

/// Application hooks. Every method has a default, so hosts only implement
/// what they care about.
pub trait NotebookHost {
    /// A non-scratch notebook was loaded or saved. Keeps notebook lists fresh.
    fn notebook_updated(&self, _notebook: &Notebook) {}

    /// The live editor's content or selection changed.
    fn editor_updated(&self) {}

    /// A notebook was duplicated into `notebook`.
    fn notebook_duplicated(&self, _source: DuplicateSource, _notebook: &Notebook) {}

    /// A debounced save failed with something other than a version conflict.
    fn save_failed(&self, _error: &NotebookError) {}

    /// Navigate to a notebook.
    fn open_notebook<'a>(&'a self, _short_id: &'a str) -> LocalBoxFuture<'a, Result<(), NotebookError>> {
        Box::pin(async { Ok(()) })
    }
}

/// Host that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl NotebookHost for NoopHost {}
