//! Waiting for the editor to attach.
//!
//! Commands against a notebook can arrive before its editor has mounted (for
//! example "open this notebook and insert a comment"). The gate holds the
//! attached editor and lets those commands wait for it. Attaching fires a
//! one-shot notification; waiters give up after a timeout, which means the
//! editor surface never mounted and is treated as a bug in the caller rather
//! than something to retry.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::editor::NotebookEditor;

/// How long commands wait for an editor before giving up.
pub const EDITOR_READY_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// No editor attached within the timeout.
    #[error("notebook editor not ready after {0:?}")]
    NotReady(Duration),
}

/// Slot for the live editor plus an attach notification.
pub struct EditorGate<E: ?Sized = dyn NotebookEditor> {
    editor: RefCell<Option<Rc<E>>>,
    attached: Notify,
}

impl<E: ?Sized> Default for EditorGate<E> {
    fn default() -> Self {
        Self {
            editor: RefCell::new(None),
            attached: Notify::new(),
        }
    }
}

impl<E: ?Sized> EditorGate<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or replace) the editor and wake every waiting command.
    pub fn attach(&self, editor: Rc<E>) {
        *self.editor.borrow_mut() = Some(editor);
        self.attached.notify_waiters();
    }

    /// Drop the editor, e.g. when its surface unmounts.
    pub fn detach(&self) -> Option<Rc<E>> {
        self.editor.borrow_mut().take()
    }

    /// The attached editor, if any.
    pub fn current(&self) -> Option<Rc<E>> {
        self.editor.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.editor.borrow().is_some()
    }

    /// Wait until an editor is attached, for at most `timeout`.
    pub async fn ready(&self, timeout: Duration) -> Result<Rc<E>, GateError> {
        let wait = async {
            loop {
                // Register interest before checking so an attach between the
                // check and the await is not missed.
                let notified = self.attached.notified();
                if let Some(editor) = self.current() {
                    return editor;
                }
                notified.await;
            }
        };

        tokio::time::timeout(timeout, wait).await.map_err(|_| {
            tracing::error!(?timeout, "notebook editor never attached");
            GateError::NotReady(timeout)
        })
    }

    /// Run `f` against the editor once it is attached.
    ///
    /// `f` runs at most once; if the editor does not attach within `timeout`
    /// it never runs.
    pub async fn run_when_ready<T>(
        &self,
        timeout: Duration,
        f: impl FnOnce(&E) -> T,
    ) -> Result<T, GateError> {
        let editor = self.ready(timeout).await?;
        Ok(f(&editor))
    }
}
