//! Per-notebook controller.
//!
//! `NotebookLogic` owns everything one open notebook needs: the last remote
//! copy, the local edit buffer, an optional read-only preview, the live
//! editor (through an `EditorGate`), the node logic registry, and the
//! debounced save loop.
//!
//! ## Lifecycle
//!
//! ```text
//! NoDocument --load--> Loaded --save--> Saving --ok--> Loaded
//!                        ^                 |
//!                        |              conflict
//!                        +-----load------ Conflict
//! ```
//!
//! Saves are debounced: every local edit restarts a timer, and only when it
//! fires without a save already in flight does the controller submit the
//! effective content together with the last version it saw. A stale version
//! puts the controller into `Conflict` and keeps the local buffer; reloading
//! clears the conflict.
//!
//! The handle is cheap to clone and not `Send`. Timers and background saves
//! are local tasks, so drive it from inside a `tokio::task::LocalSet`.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;

use notebook_editor::{
    Attrs, EditorGate, JsonContent, NodeLogic, NodeLogicRegistry, NotebookEditor, SmolStr,
    TextSelection, TimestampComment, insertion,
};

use crate::buffer::{LocalBuffer, LocalBufferStore, MemoryBufferStore, local_content_key};
use crate::config::NotebookConfig;
use crate::debounce::Debouncer;
use crate::error::{NotebookError, StoreError};
use crate::export::ExportedFile;
use crate::host::{DuplicateSource, NoopHost, NotebookHost};
use crate::migration::{CurrentSchema, Migration};
use crate::notebook::{NewNotebook, Notebook, NotebookUpdate, SyncStatus};
use crate::precedence::{self, SyncInputs};
use crate::source::{NotebookSource, NotebookSources, SCRATCHPAD_SHORT_ID};
use crate::store::NotebookStore;


/// Coarse controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotebookPhase {
    NoDocument,
    Loaded,
    Saving,
    Conflict,
}

#[derive(Debug, Default)]
struct LogicState {
    notebook: Option<Notebook>,
    local_content: Option<JsonContent>,
    preview_content: Option<JsonContent>,
    /// Most recent duplicate created from this notebook.
    new_notebook: Option<Notebook>,
    conflict_warning_visible: bool,
    saving: bool,
    editing_node_id: Option<SmolStr>,
    should_be_editable: bool,
    show_history: bool,
}

struct Inner<S> {
    short_id: SmolStr,
    config: NotebookConfig,
    store: S,
    migration: Box<dyn Migration>,
    sources: NotebookSources,
    host: Rc<dyn NotebookHost>,
    buffer: LocalBuffer,
    gate: EditorGate,
    nodes: RefCell<NodeLogicRegistry>,
    debouncer: Debouncer,
    state: RefCell<LogicState>,
}

/// Controller for one open notebook.
pub struct NotebookLogic<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for NotebookLogic<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Builder for `NotebookLogic`. Everything but the id and store has a default.
pub struct NotebookLogicBuilder<S> {
    short_id: SmolStr,
    store: S,
    config: NotebookConfig,
    migration: Box<dyn Migration>,
    sources: NotebookSources,
    host: Rc<dyn NotebookHost>,
    buffer_store: Box<dyn LocalBufferStore>,
}

impl<S: NotebookStore + 'static> NotebookLogicBuilder<S> {
    pub fn config(mut self, config: NotebookConfig) -> Self {
        self.config = config;
        self
    }

    pub fn migration(mut self, migration: impl Migration + 'static) -> Self {
        self.migration = Box::new(migration);
        self
    }

    pub fn sources(mut self, sources: NotebookSources) -> Self {
        self.sources = sources;
        self
    }

    pub fn host(mut self, host: Rc<dyn NotebookHost>) -> Self {
        self.host = host;
        self
    }

    pub fn buffer_store(mut self, store: impl LocalBufferStore + 'static) -> Self {
        self.buffer_store = Box::new(store);
        self
    }

    /// Build the controller, rehydrating any persisted local buffer.
    pub fn build(self) -> NotebookLogic<S> {
        let key = local_content_key(self.migration.schema_version(), &self.short_id);
        let buffer = LocalBuffer::new(self.buffer_store, key);
        let local_content = buffer.load();
        if local_content.is_some() {
            tracing::debug!(short_id = %self.short_id, "restored local buffer");
        }

        NotebookLogic {
            inner: Rc::new(Inner {
                debouncer: Debouncer::new(self.config.sync_delay()),
                short_id: self.short_id,
                config: self.config,
                store: self.store,
                migration: self.migration,
                sources: self.sources,
                host: self.host,
                buffer,
                gate: EditorGate::new(),
                nodes: RefCell::new(NodeLogicRegistry::new()),
                state: RefCell::new(LogicState {
                    local_content,
                    ..Default::default()
                }),
            }),
        }
    }
}

impl<S: NotebookStore + 'static> NotebookLogic<S> {
    pub fn builder(short_id: impl Into<SmolStr>, store: S) -> NotebookLogicBuilder<S> {
        NotebookLogicBuilder {
            short_id: short_id.into(),
            store,
            config: NotebookConfig::default(),
            migration: Box::new(CurrentSchema),
            sources: NotebookSources::default(),
            host: Rc::new(NoopHost),
            buffer_store: Box::new(MemoryBufferStore::new()),
        }
    }

    // State access. Borrows never live across an await or a host callback.

    fn state(&self) -> Ref<'_, LogicState> {
        self.inner.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, LogicState> {
        self.inner.state.borrow_mut()
    }

    pub fn short_id(&self) -> &SmolStr {
        &self.inner.short_id
    }

    pub fn config(&self) -> &NotebookConfig {
        &self.inner.config
    }

    /// The scratchpad lives only in the local buffer.
    pub fn is_local_only(&self) -> bool {
        self.inner.short_id == SCRATCHPAD_SHORT_ID
    }

    /// Last remote copy.
    pub fn notebook(&self) -> Option<Notebook> {
        self.state().notebook.clone()
    }

    pub fn local_content(&self) -> Option<JsonContent> {
        self.state().local_content.clone()
    }

    pub fn preview_content(&self) -> Option<JsonContent> {
        self.state().preview_content.clone()
    }

    pub fn is_previewing(&self) -> bool {
        self.state().preview_content.is_some()
    }

    /// Most recent duplicate created from this notebook.
    pub fn new_notebook(&self) -> Option<Notebook> {
        self.state().new_notebook.clone()
    }

    pub fn phase(&self) -> NotebookPhase {
        let state = self.state();
        if state.notebook.is_none() {
            NotebookPhase::NoDocument
        } else if state.saving {
            NotebookPhase::Saving
        } else if state.conflict_warning_visible {
            NotebookPhase::Conflict
        } else {
            NotebookPhase::Loaded
        }
    }

    pub fn is_saving(&self) -> bool {
        self.state().saving
    }

    /// Preview, else local buffer, else remote content. Empty when none.
    pub fn content(&self) -> JsonContent {
        let state = self.state();
        precedence::effective_content(
            state.preview_content.as_ref(),
            state.local_content.as_ref(),
            state.notebook.as_ref().map(|n| &n.content),
        )
        .cloned()
        .unwrap_or_default()
    }

    pub fn title(&self) -> String {
        let state = self.state();
        let content = precedence::effective_content(
            state.preview_content.as_ref(),
            state.local_content.as_ref(),
            state.notebook.as_ref().map(|n| &n.content),
        );
        let stored = state.notebook.as_ref().and_then(|n| n.title.as_deref());
        precedence::derive_title(content, stored)
    }

    pub fn sync_status(&self) -> SyncStatus {
        let state = self.state();
        precedence::sync_status(&SyncInputs {
            previewing: state.preview_content.is_some(),
            is_template: state.notebook.as_ref().is_some_and(|n| n.is_template),
            is_local_only: self.is_local_only(),
            has_document: state.notebook.is_some(),
            has_local_content: state.local_content.is_some(),
            saving: state.saving,
        })
    }

    pub fn conflict_warning_visible(&self) -> bool {
        self.state().conflict_warning_visible
    }

    pub fn show_conflict_warning(&self) {
        self.state_mut().conflict_warning_visible = true;
    }

    /// Editable only when requested and not showing a preview.
    pub fn is_editable(&self) -> bool {
        let state = self.state();
        state.should_be_editable && state.preview_content.is_none()
    }

    pub fn set_editable(&self, editable: bool) {
        self.state_mut().should_be_editable = editable;
    }

    pub fn show_history(&self) -> bool {
        self.state().show_history
    }

    /// Closing history also drops any preview it was showing.
    pub fn set_show_history(&self, show: bool) {
        self.state_mut().show_history = show;
        if !show {
            self.clear_preview_content();
        }
    }

    pub fn is_showing_sidebar(&self) -> bool {
        let state = self.state();
        state.editing_node_id.is_some() || state.show_history
    }

    // Editor

    /// Attach the live editor and show the current effective content in it.
    pub fn set_editor(&self, editor: Rc<dyn NotebookEditor>) {
        editor.set_content(&self.content());
        self.inner.gate.attach(editor);
        tracing::debug!(short_id = %self.inner.short_id, "editor attached");
    }

    pub fn detach_editor(&self) -> Option<Rc<dyn NotebookEditor>> {
        self.inner.gate.detach()
    }

    pub fn editor(&self) -> Option<Rc<dyn NotebookEditor>> {
        self.inner.gate.current()
    }

    /// The editor's document changed: take it as the new local content.
    ///
    /// Not mirrored back into the editor, which already shows it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a [`tokio::task::LocalSet`], as
    /// [`set_local_content`](Self::set_local_content) does.
    pub fn on_editor_update(&self) {
        let Some(editor) = self.editor() else {
            return;
        };
        if self.state().notebook.is_none() {
            return;
        }
        self.set_local_content(editor.get_json(), false);
        self.inner.host.editor_updated();
    }

    pub fn on_editor_selection_update(&self) {
        if self.editor().is_some() {
            self.inner.host.editor_updated();
        }
    }

    /// Apply a selection after one scheduling tick, once the editor has had a
    /// chance to process pending content changes.
    pub async fn set_text_selection(&self, selection: impl Into<TextSelection>) {
        let selection = selection.into();
        tokio::task::yield_now().await;
        if let Some(editor) = self.editor() {
            editor.set_text_selection(selection);
        }
    }

    pub fn scroll_to_selection(&self) {
        if let Some(editor) = self.editor() {
            editor.scroll_to_selection();
        }
    }

    // Content layers

    /// Record a local edit and (re)start the save timer.
    ///
    /// Ignored entirely while a preview is showing.
    ///
    /// # Panics
    ///
    /// Panics if called outside a [`tokio::task::LocalSet`]: the save timer
    /// and the save it fires are spawned with `spawn_local`.
    pub fn set_local_content(&self, content: JsonContent, update_editor: bool) {
        if self.is_previewing() {
            tracing::debug!(short_id = %self.inner.short_id, "ignoring local edit while previewing");
            return;
        }
        if update_editor {
            if let Some(editor) = self.editor() {
                editor.set_content(&content);
            }
        }

        self.inner.buffer.save(&content);
        self.state_mut().local_content = Some(content);

        let logic = self.clone();
        self.inner
            .debouncer
            .schedule(move || logic.on_sync_delay_elapsed());
    }

    pub fn clear_local_content(&self) {
        self.state_mut().local_content = None;
        self.inner.buffer.clear();
    }

    /// Show a historical version read-only.
    pub fn set_preview_content(&self, content: JsonContent) {
        self.state_mut().preview_content = Some(content);
        self.refresh_editor();
    }

    pub fn clear_preview_content(&self) {
        let had_preview = self.state_mut().preview_content.take().is_some();
        if had_preview {
            self.refresh_editor();
        }
    }

    fn refresh_editor(&self) {
        if let Some(editor) = self.editor() {
            editor.set_content(&self.content());
        }
    }

    // Node logics

    pub fn register_node_logic(&self, logic: Rc<dyn NodeLogic>) {
        self.inner.nodes.borrow_mut().register(logic);
    }

    pub fn unregister_node_logic(&self, logic: &(dyn NodeLogic + 'static)) {
        self.inner.nodes.borrow_mut().unregister(logic);
    }

    pub fn find_node_logic(&self, node_type: &str, attrs: &Attrs) -> Option<Rc<dyn NodeLogic>> {
        self.inner.nodes.borrow().find(node_type, attrs)
    }

    pub fn find_node_logic_by_id(&self, node_id: &str) -> Option<Rc<dyn NodeLogic>> {
        self.inner.nodes.borrow().find_by_id(node_id)
    }

    pub fn editing_node_id(&self) -> Option<SmolStr> {
        self.state().editing_node_id.clone()
    }

    /// Mark a node as being edited and select it in the editor.
    pub fn set_editing_node_id(&self, node_id: Option<&str>) {
        self.state_mut().editing_node_id = node_id.map(SmolStr::new);
        if let Some(logic) = self.editing_node_logic() {
            logic.select_node();
        }
    }

    pub fn editing_node_logic(&self) -> Option<Rc<dyn NodeLogic>> {
        let id = self.editing_node_id()?;
        self.find_node_logic_by_id(&id)
    }

    // Editor commands. Each waits for the editor to attach.

    fn ready_timeout(&self) -> Duration {
        self.inner.config.editor_ready_timeout()
    }

    pub async fn insert_after_last_node(&self, content: JsonContent) -> Result<(), NotebookError> {
        self.inner
            .gate
            .run_when_ready(self.ready_timeout(), |editor| {
                insertion::insert_after_last_node(editor, content)
            })
            .await?;
        Ok(())
    }

    pub async fn paste_after_last_node(&self, content: &str) -> Result<(), NotebookError> {
        self.inner
            .gate
            .run_when_ready(self.ready_timeout(), |editor| {
                insertion::paste_after_last_node(editor, content)
            })
            .await?;
        Ok(())
    }

    pub async fn insert_after_last_node_of_type(
        &self,
        node_type: &str,
        content: JsonContent,
        known_starting_position: usize,
    ) -> Result<(), NotebookError> {
        self.inner
            .gate
            .run_when_ready(self.ready_timeout(), |editor| {
                insertion::insert_after_last_node_of_type(
                    editor,
                    node_type,
                    content,
                    known_starting_position,
                )
            })
            .await?;
        Ok(())
    }

    pub async fn insert_replay_comment_by_timestamp(
        &self,
        comment: TimestampComment,
    ) -> Result<(), NotebookError> {
        self.inner
            .gate
            .run_when_ready(self.ready_timeout(), |editor| {
                insertion::insert_replay_comment_by_timestamp(editor, &comment)
            })
            .await?;
        Ok(())
    }

    // Load / save / duplicate

    /// Load the document for this notebook's id and migrate it.
    ///
    /// On the first load the editor is reset to the effective content: a
    /// local buffer restored at construction wins over the loaded document.
    /// Clears any conflict.
    pub async fn load_notebook(&self) -> Result<Notebook, NotebookError> {
        let short_id = self.inner.short_id.clone();
        let response = match NotebookSource::for_short_id(&short_id) {
            NotebookSource::Scratchpad => Some(self.inner.sources.scratchpad_document()),
            NotebookSource::Template(id) => self.inner.sources.template(id),
            NotebookSource::Remote(id) => self.inner.store.get(id).await?,
        };
        let Some(response) = response else {
            tracing::warn!(%short_id, "notebook not found");
            return Err(NotebookError::NotFound(short_id));
        };

        let notebook = self.inner.migration.migrate(response);
        let first_load = self.state().notebook.is_none();
        if first_load {
            if let Some(editor) = self.editor() {
                let shown = self.local_content().unwrap_or_else(|| notebook.content.clone());
                editor.set_content(&shown);
            }
        }

        {
            let mut state = self.state_mut();
            state.notebook = Some(notebook.clone());
            state.conflict_warning_visible = false;
        }
        tracing::info!(%short_id, version = notebook.version, "notebook loaded");
        self.notify_notebook_changed(&notebook);
        Ok(notebook)
    }

    /// Submit `content` as the next version.
    ///
    /// Returns `Ok(None)` without contacting the store when there is no
    /// document or a save is already in flight, and when the store reports a
    /// version conflict (the controller moves to `Conflict` instead).
    pub async fn save_notebook(
        &self,
        content: JsonContent,
        title: String,
    ) -> Result<Option<Notebook>, NotebookError> {
        {
            let mut state = self.state_mut();
            if state.notebook.is_none() {
                return Ok(None);
            }
            if state.saving {
                tracing::debug!(short_id = %self.inner.short_id, "save already in flight");
                return Ok(None);
            }
            state.saving = true;
        }
        self.finish_save(content, title).await
    }

    /// Runs with `saving` already set; always clears it.
    async fn finish_save(
        &self,
        content: JsonContent,
        title: String,
    ) -> Result<Option<Notebook>, NotebookError> {
        let result = self.submit_save(content, title).await;
        self.state_mut().saving = false;
        result
    }

    async fn submit_save(
        &self,
        content: JsonContent,
        title: String,
    ) -> Result<Option<Notebook>, NotebookError> {
        let Some((short_id, version)) = self
            .state()
            .notebook
            .as_ref()
            .map(|n| (n.short_id.clone(), n.version))
        else {
            return Ok(None);
        };

        let update = NotebookUpdate {
            version,
            content: content.clone(),
            text_content: self.editor().map(|e| e.get_text()).unwrap_or_default(),
            title: Some(title),
        };
        tracing::debug!(%short_id, version, "saving notebook");

        match self.inner.store.update(&short_id, update).await {
            Ok(saved) => {
                let buffer_is_saved = self
                    .state()
                    .local_content
                    .as_ref()
                    .is_some_and(|local| *local == content || *local == saved.content);
                if buffer_is_saved {
                    self.clear_local_content();
                }
                self.state_mut().notebook = Some(saved.clone());
                tracing::info!(%short_id, version = saved.version, "notebook saved");
                self.notify_notebook_changed(&saved);
                Ok(Some(saved))
            }
            Err(StoreError::Conflict) => {
                tracing::warn!(%short_id, version, "notebook changed remotely, not saving");
                self.show_conflict_warning();
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Debounce timer fired. Scratchpad and template edits stay local.
    fn on_sync_delay_elapsed(&self) {
        tracing::info!(short_id = %self.inner.short_id, "notebook content changed");
        {
            let mut state = self.state_mut();
            let saveable = state.notebook.as_ref().is_some_and(|n| !n.is_template);
            if self.is_local_only() || state.preview_content.is_some() || !saveable || state.saving {
                return;
            }
            state.saving = true;
        }

        let content = self.content();
        let title = self.title();
        let logic = self.clone();
        tokio::task::spawn_local(async move {
            if let Err(error) = logic.finish_save(content, title).await {
                tracing::error!(short_id = %logic.inner.short_id, %error, "background save failed");
                logic.inner.host.save_failed(&error);
            }
        });
    }

    /// Copy this notebook into a new remote document and open it.
    ///
    /// Returns `Ok(None)` when no document is loaded.
    pub async fn duplicate_notebook(&self) -> Result<Option<Notebook>, NotebookError> {
        let Some(source) = self.notebook() else {
            return Ok(None);
        };
        let new = NewNotebook {
            content: self.content(),
            text_content: self.editor().map(|e| e.get_text()).unwrap_or_default(),
            title: Some(self.title()),
        };
        let created = self.inner.store.create(new).await?;

        let kind = DuplicateSource::of(&source);
        tracing::info!(
            from = %source.short_id,
            to = %created.short_id,
            ?kind,
            "notebook duplicated"
        );
        self.inner.host.notebook_duplicated(kind, &created);
        if kind == DuplicateSource::Scratchpad {
            self.clear_local_content();
        }
        self.state_mut().new_notebook = Some(created.clone());

        self.inner.host.open_notebook(&created.short_id).await?;
        Ok(Some(created))
    }

    /// Current editor content as a downloadable JSON file.
    pub fn export_json(&self) -> Result<ExportedFile, NotebookError> {
        let content = match self.editor() {
            Some(editor) => editor.get_json(),
            None => self.content(),
        };
        ExportedFile::notebook_json(&self.title(), &content)
    }

    fn notify_notebook_changed(&self, notebook: &Notebook) {
        if !self.is_local_only() {
            self.inner.host.notebook_updated(notebook);
        }
    }
}
