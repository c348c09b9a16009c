//! Error types for the notebook controller.

use miette::Diagnostic;
use notebook_editor::{GateError, SmolStr};

/// Failure reported by a `NotebookStore`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The submitted version is stale: someone else saved in between.
    #[error("version conflict: notebook was modified elsewhere")]
    Conflict,

    /// Network or server failure.
    #[error("notebook store request failed: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// Main error type for notebook operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum NotebookError {
    /// No document with this id exists (remote, template or scratchpad).
    #[error("notebook not found: {0}")]
    #[diagnostic(code(notebook::not_found))]
    NotFound(SmolStr),

    /// The editor surface never attached.
    #[error(transparent)]
    #[diagnostic(
        code(notebook::editor_not_ready),
        help("the notebook editor must be mounted before editor commands can run")
    )]
    EditorNotReady(#[from] GateError),

    /// Remote store failure.
    #[error(transparent)]
    #[diagnostic(code(notebook::store))]
    Store(#[from] StoreError),

    /// IO error
    #[error(transparent)]
    #[diagnostic(code(notebook::io))]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic(code(notebook::serialization))]
    Serialization(#[from] serde_json::Error),
}
