//! notebook-editor: editor-facing notebook logic without persistence.
//!
//! This crate provides:
//! - `JsonContent` - the rich-text document tree and its helpers
//! - `NotebookEditor` trait - the capability surface of a live editor
//! - `MemoryEditor` - an in-memory implementation of that surface
//! - `EditorGate` - waits for an editor to attach before running commands
//! - `NodeLogicRegistry` - per-notebook lookup of mounted node controllers
//! - Insertion position resolution (append, append-after-type, chronological)

pub mod content;
pub mod editor;
pub mod gate;
pub mod insertion;
pub mod memory;
pub mod nodes;
pub mod registry;

pub use content::{Attrs, JsonContent, Mark};
pub use editor::{EditorRange, NodeAtPosition, NotebookEditor, TextSelection};
pub use gate::{EDITOR_READY_TIMEOUT, EditorGate, GateError};
pub use insertion::{
    TimestampComment, insert_after_last_node, insert_after_last_node_of_type,
    insert_replay_comment_by_timestamp, last_node_of_type_position, last_node_position,
    paste_after_last_node, timestamp_insertion_position,
};
pub use memory::MemoryEditor;
pub use nodes::{NodeType, ReplayTimestampAttrs, build_timestamp_comment_content};
pub use registry::{NodeLogic, NodeLogicRegistry};
pub use smol_str::SmolStr;
