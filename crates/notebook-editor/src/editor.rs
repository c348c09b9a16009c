//! Capability surface of a live rich-text editor.
//!
//! The notebook logic never touches rendering internals. Everything it needs
//! from the editor (reading and replacing the document, walking top-level
//! nodes, inserting and pasting) goes through `NotebookEditor`. The browser
//! implementation wraps the real editor; `MemoryEditor` implements the same
//! surface in memory.

use crate::content::{Attrs, JsonContent};

/// A top-level node together with the position it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAtPosition {
    pub position: usize,
    pub node: JsonContent,
}

/// A text range in editor positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorRange {
    pub from: usize,
    pub to: usize,
}

impl EditorRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Collapsed range at a single position.
    pub fn caret(position: usize) -> Self {
        Self {
            from: position,
            to: position,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.from == self.to
    }
}

/// Requested text selection: a caret position or a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSelection {
    Caret(usize),
    Range(EditorRange),
}

impl TextSelection {
    /// Normalize to a range.
    pub fn to_range(self) -> EditorRange {
        match self {
            TextSelection::Caret(position) => EditorRange::caret(position),
            TextSelection::Range(range) => range,
        }
    }
}

impl From<usize> for TextSelection {
    fn from(position: usize) -> Self {
        TextSelection::Caret(position)
    }
}

impl From<EditorRange> for TextSelection {
    fn from(range: EditorRange) -> Self {
        TextSelection::Range(range)
    }
}

/// Operations the notebook logic performs against a live editor.
///
/// Methods take `&self`: the editor is shared with the platform that renders
/// it, so implementations use interior mutability the way a DOM-backed handle
/// would.
pub trait NotebookEditor {
    /// Current document as a JSON tree.
    fn get_json(&self) -> JsonContent;

    /// Replace the whole document.
    fn set_content(&self, content: &JsonContent);

    /// Plain-text projection of the current document.
    fn get_text(&self) -> String;

    /// Current selection.
    fn get_selection(&self) -> EditorRange;

    /// Move the selection.
    fn set_text_selection(&self, selection: TextSelection);

    /// Position just past the last node of the document.
    fn get_end_position(&self) -> usize;

    /// The top-level sibling following the node at `position`, if any.
    fn next_node(&self, position: usize) -> Option<NodeAtPosition>;

    /// True if `node` has a descendant of `node_type`.
    fn has_child_of_type(&self, node: &JsonContent, node_type: &str) -> bool {
        node.has_descendant_of_type(node_type)
    }

    /// Position of the first top-level node whose attributes contain `attrs`.
    fn find_node_position_by_attrs(&self, attrs: &Attrs) -> Option<usize>;

    /// Insert `content` as a new block after the node at `position`.
    fn insert_content_after_node(&self, position: usize, content: JsonContent);

    /// Paste `content` at `position`, merging with adjacent compatible blocks.
    fn paste_content(&self, position: usize, content: &str);

    /// Scroll the viewport so the selection is visible.
    fn scroll_to_selection(&self);
}
