//! notebook-sync: the notebook controller.
//!
//! This crate provides:
//! - `NotebookLogic` - per-notebook controller holding the remote document,
//!   the local edit buffer and the read-only preview, with debounced saves
//!   and version-conflict detection
//! - `NotebookStore` trait - the remote document service
//! - `LocalBufferStore` trait - durable per-notebook edit buffers
//! - `Migration` trait - schema upgrades applied to every loaded document
//! - `NotebookHost` trait - callbacks into the surrounding application
//!
//! Everything here is single-threaded. `NotebookLogic` schedules its timers
//! and background saves with `tokio::task::spawn_local`, so it must be driven
//! from inside a `tokio::task::LocalSet`.

pub mod buffer;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod host;
pub mod logic;
pub mod migration;
pub mod notebook;
pub mod precedence;
pub mod source;
pub mod store;

pub use buffer::{
    FileBufferStore, LocalBuffer, LocalBufferStore, MemoryBufferStore, local_content_key,
};
pub use config::{DEFAULT_SYNC_DELAY, NotebookConfig};
pub use debounce::Debouncer;
pub use error::{NotebookError, StoreError};
pub use export::{ExportedFile, slugify};
pub use host::{DuplicateSource, NoopHost, NotebookHost};
pub use logic::{NotebookLogic, NotebookLogicBuilder, NotebookPhase};
pub use migration::{CurrentSchema, Migration, NOTEBOOKS_VERSION};
pub use notebook::{NewNotebook, Notebook, NotebookUpdate, SyncStatus};
pub use precedence::{SyncInputs, derive_title, effective_content, sync_status};
pub use source::{NotebookSource, NotebookSources, SCRATCHPAD_SHORT_ID, TEMPLATE_PREFIX};
pub use store::{MemoryNotebookStore, NotebookStore};

// Re-export the editor-side types callers need alongside the controller.
pub use notebook_editor::{JsonContent, NotebookEditor, TextSelection, TimestampComment};
