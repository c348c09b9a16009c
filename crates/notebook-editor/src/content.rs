//! Rich-text document tree.
//!
//! `JsonContent` mirrors the JSON shape rich-text editors exchange: every node
//! has an optional type, an attribute map, ordered children, and text runs
//! carry their text plus marks. Empty fields are omitted when serialized so a
//! round trip through the editor produces the same JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

/// Node attribute map.
pub type Attrs = serde_json::Map<String, Value>;

/// Separator placed between top-level blocks in the plain-text projection.
const BLOCK_SEPARATOR: &str = "\n\n";

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonContent {
    /// Node type (`doc`, `paragraph`, `text`, ...). Absent on an empty document.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<SmolStr>,

    /// Node attributes.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attrs: Attrs,

    /// Ordered child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<JsonContent>,

    /// Text of a text run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Inline marks applied to a text run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

/// Inline formatting mark (bold, link, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: SmolStr,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attrs: Attrs,
}

impl JsonContent {
    /// Create a node of the given type with no attributes or children.
    pub fn node(node_type: impl Into<SmolStr>) -> Self {
        Self {
            node_type: Some(node_type.into()),
            ..Default::default()
        }
    }

    /// Create a `doc` node holding the given top-level blocks.
    pub fn doc(blocks: impl IntoIterator<Item = JsonContent>) -> Self {
        Self::node("doc").with_content(blocks)
    }

    /// Create a `paragraph` node holding the given inline children.
    pub fn paragraph(children: impl IntoIterator<Item = JsonContent>) -> Self {
        Self::node("paragraph").with_content(children)
    }

    /// Create a `heading` node with a single text run.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::node("heading")
            .with_attr("level", level)
            .with_content([Self::text(text)])
    }

    /// Create a text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            node_type: Some(SmolStr::new_static("text")),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Builder: set an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Builder: append children.
    pub fn with_content(mut self, children: impl IntoIterator<Item = JsonContent>) -> Self {
        self.content.extend(children);
        self
    }

    /// True if this node has the given type.
    pub fn is_type(&self, node_type: &str) -> bool {
        self.node_type.as_deref() == Some(node_type)
    }

    /// True for the empty document (`{}`), which has no type, text or children.
    pub fn is_empty(&self) -> bool {
        self.node_type.is_none() && self.text.is_none() && self.content.is_empty()
    }

    /// First child node, if any.
    pub fn first_child(&self) -> Option<&JsonContent> {
        self.content.first()
    }

    /// Text of the first run of the first top-level block.
    ///
    /// Used to derive a notebook title from its content. Empty text counts as
    /// absent.
    pub fn first_text(&self) -> Option<&str> {
        self.first_child()?
            .first_child()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    /// Depth-first search for a descendant (excluding `self`) of the given type.
    pub fn find_descendant_of_type(&self, node_type: &str) -> Option<&JsonContent> {
        self.content.iter().find_map(|child| {
            if child.is_type(node_type) {
                Some(child)
            } else {
                child.find_descendant_of_type(node_type)
            }
        })
    }

    /// True if any descendant (excluding `self`) has the given type.
    pub fn has_descendant_of_type(&self, node_type: &str) -> bool {
        self.find_descendant_of_type(node_type).is_some()
    }

    /// True if every key/value in `attrs` is present on this node with an
    /// equal value. Extra attributes on the node are ignored.
    pub fn attrs_match(&self, attrs: &Attrs) -> bool {
        attrs_contain(&self.attrs, attrs)
    }

    /// Plain-text projection: top-level blocks separated by a blank line,
    /// inline text concatenated.
    pub fn plain_text(&self) -> String {
        if self.is_type("doc") {
            self.content
                .iter()
                .map(JsonContent::inline_text)
                .collect::<Vec<_>>()
                .join(BLOCK_SEPARATOR)
        } else {
            self.inline_text()
        }
    }

    fn inline_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }
}

/// True if `haystack` contains every key of `needle` with an equal value.
pub fn attrs_contain(haystack: &Attrs, needle: &Attrs) -> bool {
    needle
        .iter()
        .all(|(key, value)| haystack.get(key) == Some(value))
}
