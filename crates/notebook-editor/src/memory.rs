//! In-memory `NotebookEditor`.
//!
//! Positions address top-level blocks by index: position `n` is the `n`-th
//! block, and the end position is the block count. Useful headless (tests,
//! server-side tooling) wherever the notebook logic needs an editor but no UI
//! is mounted.

use std::cell::{Cell, RefCell};

use crate::content::{Attrs, JsonContent};
use crate::editor::{EditorRange, NodeAtPosition, NotebookEditor, TextSelection};

#[derive(Debug)]
pub struct MemoryEditor {
    doc: RefCell<JsonContent>,
    selection: Cell<EditorRange>,
    set_content_calls: Cell<usize>,
    scroll_requests: Cell<usize>,
}

impl Default for MemoryEditor {
    fn default() -> Self {
        Self::with_content(JsonContent::doc([]))
    }
}

impl MemoryEditor {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor preloaded with `content`.
    pub fn with_content(content: JsonContent) -> Self {
        Self {
            doc: RefCell::new(normalize_doc(&content)),
            selection: Cell::new(EditorRange::caret(0)),
            set_content_calls: Cell::new(0),
            scroll_requests: Cell::new(0),
        }
    }

    /// Top-level blocks of the current document.
    pub fn blocks(&self) -> Vec<JsonContent> {
        self.doc.borrow().content.clone()
    }

    /// Number of times the document was replaced through `set_content`.
    pub fn set_content_calls(&self) -> usize {
        self.set_content_calls.get()
    }

    /// Number of `scroll_to_selection` requests.
    pub fn scroll_requests(&self) -> usize {
        self.scroll_requests.get()
    }

    fn len(&self) -> usize {
        self.doc.borrow().content.len()
    }
}

/// Wrap arbitrary content into a `doc` node.
fn normalize_doc(content: &JsonContent) -> JsonContent {
    if content.is_type("doc") {
        content.clone()
    } else if content.is_empty() {
        JsonContent::doc([])
    } else {
        JsonContent::doc([content.clone()])
    }
}

impl NotebookEditor for MemoryEditor {
    fn get_json(&self) -> JsonContent {
        self.doc.borrow().clone()
    }

    fn set_content(&self, content: &JsonContent) {
        *self.doc.borrow_mut() = normalize_doc(content);
        self.set_content_calls.set(self.set_content_calls.get() + 1);
    }

    fn get_text(&self) -> String {
        self.doc.borrow().plain_text()
    }

    fn get_selection(&self) -> EditorRange {
        self.selection.get()
    }

    fn set_text_selection(&self, selection: TextSelection) {
        let end = self.len();
        let range = selection.to_range();
        self.selection
            .set(EditorRange::new(range.from.min(end), range.to.min(end)));
    }

    fn get_end_position(&self) -> usize {
        self.len()
    }

    fn next_node(&self, position: usize) -> Option<NodeAtPosition> {
        let next = position + 1;
        self.doc
            .borrow()
            .content
            .get(next)
            .map(|node| NodeAtPosition {
                position: next,
                node: node.clone(),
            })
    }

    fn find_node_position_by_attrs(&self, attrs: &Attrs) -> Option<usize> {
        self.doc
            .borrow()
            .content
            .iter()
            .position(|node| node.attrs_match(attrs))
    }

    fn insert_content_after_node(&self, position: usize, content: JsonContent) {
        let mut doc = self.doc.borrow_mut();
        let index = if doc.content.is_empty() {
            0
        } else {
            (position + 1).min(doc.content.len())
        };

        let blocks = if content.is_type("doc") {
            content.content
        } else {
            vec![content]
        };
        doc.content.splice(index..index, blocks);
    }

    fn paste_content(&self, position: usize, content: &str) {
        let mut doc = self.doc.borrow_mut();
        let mut index = position.min(doc.content.len());
        let mut lines = content.split('\n').filter(|line| !line.is_empty());

        let Some(first) = lines.next() else {
            return;
        };

        // The first line merges into a preceding paragraph.
        match index.checked_sub(1).and_then(|i| doc.content.get_mut(i)) {
            Some(prev) if prev.is_type("paragraph") => {
                prev.content.push(JsonContent::text(first));
            }
            _ => {
                doc.content
                    .insert(index, JsonContent::paragraph([JsonContent::text(first)]));
                index += 1;
            }
        }

        for line in lines {
            doc.content
                .insert(index, JsonContent::paragraph([JsonContent::text(line)]));
            index += 1;
        }
    }

    fn scroll_to_selection(&self) {
        self.scroll_requests.set(self.scroll_requests.get() + 1);
    }
}
