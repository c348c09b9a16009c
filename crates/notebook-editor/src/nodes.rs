//! Notebook node types the logic needs to recognize.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::content::{Attrs, JsonContent};

/// Custom node types embedded in notebook documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// An embedded session recording player. Carries an `id` attribute.
    Recording,
    /// A timestamp pointing into a recording's playback.
    ReplayTimestamp,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Recording => "recording",
            NodeType::ReplayTimestamp => "replay-timestamp",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a `replay-timestamp` node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayTimestampAttrs {
    /// Playback offset in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_time: Option<u64>,
    #[serde(default)]
    pub session_recording_id: SmolStr,
    /// Node the comment was created from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_node_id: Option<SmolStr>,
}

impl ReplayTimestampAttrs {
    /// Read the attributes off a node, tolerating missing or malformed fields.
    pub fn from_node(node: &JsonContent) -> Self {
        serde_json::from_value(serde_json::Value::Object(node.attrs.clone())).unwrap_or_default()
    }

    fn to_attrs(&self) -> Attrs {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Attrs::new(),
        }
    }
}

/// Build the paragraph inserted for a new timestamp comment: the timestamp
/// node followed by a space the user can type after.
pub fn build_timestamp_comment_content(attrs: &ReplayTimestampAttrs) -> JsonContent {
    let mut timestamp = JsonContent::node(NodeType::ReplayTimestamp.as_str());
    timestamp.attrs = attrs.to_attrs();
    JsonContent::paragraph([timestamp, JsonContent::text(" ")])
}
