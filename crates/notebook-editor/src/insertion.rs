//! Where new content goes.
//!
//! Every policy walks the top-level blocks of the live document with
//! `NotebookEditor::next_node`, starting from some position, and inserts the
//! new block after the last position it reached. Running out of siblings just
//! ends the walk.

use smol_str::SmolStr;

use crate::content::{Attrs, JsonContent};
use crate::editor::NotebookEditor;
use crate::nodes::{NodeType, ReplayTimestampAttrs, build_timestamp_comment_content};

/// Request to add a timestamp comment for a recording.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampComment {
    /// Playback offset in milliseconds.
    pub timestamp: u64,
    pub session_recording_id: SmolStr,
    /// Where the recording's run of comments starts, if the caller knows.
    pub known_starting_position: Option<usize>,
    /// Node the comment originates from.
    pub node_id: Option<SmolStr>,
}

impl TimestampComment {
    pub fn new(timestamp: u64, session_recording_id: impl Into<SmolStr>) -> Self {
        Self {
            timestamp,
            session_recording_id: session_recording_id.into(),
            known_starting_position: None,
            node_id: None,
        }
    }

    pub fn starting_at(mut self, position: usize) -> Self {
        self.known_starting_position = Some(position);
        self
    }

    pub fn from_node(mut self, node_id: impl Into<SmolStr>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// The paragraph that gets inserted.
    pub fn content(&self) -> JsonContent {
        build_timestamp_comment_content(&ReplayTimestampAttrs {
            playback_time: Some(self.timestamp),
            session_recording_id: self.session_recording_id.clone(),
            source_node_id: self.node_id.clone(),
        })
    }
}

/// Position of the last top-level node reachable from `start`.
pub fn last_node_position<E: NotebookEditor + ?Sized>(editor: &E, start: usize) -> usize {
    let mut position = start;
    while let Some(next) = editor.next_node(position) {
        position = next.position;
    }
    position
}

/// Walk forward from `start` while the next sibling contains a `node_type`
/// descendant; returns the last position reached.
pub fn last_node_of_type_position<E: NotebookEditor + ?Sized>(
    editor: &E,
    start: usize,
    node_type: &str,
) -> usize {
    let mut position = start;
    while let Some(next) = editor.next_node(position) {
        if !editor.has_child_of_type(&next.node, node_type) {
            break;
        }
        position = next.position;
    }
    position
}

/// Position after which a timestamp comment belongs.
///
/// Starts at the known position, or at the recording node with a matching
/// `id`, then skips over the run of timestamp comments whose playback time is
/// not later than the new one. Equal times keep insertion order, so a new
/// comment lands after existing comments at the same time.
pub fn timestamp_insertion_position<E: NotebookEditor + ?Sized>(
    editor: &E,
    comment: &TimestampComment,
) -> usize {
    let start = comment.known_starting_position.unwrap_or_else(|| {
        let mut attrs = Attrs::new();
        attrs.insert(
            "id".into(),
            comment.session_recording_id.as_str().into(),
        );
        editor.find_node_position_by_attrs(&attrs).unwrap_or_else(|| {
            tracing::warn!(
                session_recording_id = %comment.session_recording_id,
                "recording node not found, inserting from document start"
            );
            0
        })
    });

    let timestamp_type = NodeType::ReplayTimestamp.as_str();
    let mut position = start;
    while let Some(next) = editor.next_node(position) {
        if !editor.has_child_of_type(&next.node, timestamp_type) {
            break;
        }
        let playback_time = next
            .node
            .find_descendant_of_type(timestamp_type)
            .map(ReplayTimestampAttrs::from_node)
            .and_then(|attrs| attrs.playback_time);

        // A timestamp without a time sorts before everything.
        match playback_time {
            Some(existing) if existing > comment.timestamp => break,
            _ => position = next.position,
        }
    }
    position
}

/// Append `content` after the last top-level node.
pub fn insert_after_last_node<E: NotebookEditor + ?Sized>(editor: &E, content: JsonContent) {
    let position = last_node_position(editor, 0);
    tracing::debug!(position, "inserting after last node");
    editor.insert_content_after_node(position, content);
}

/// Paste text at the end of the document.
pub fn paste_after_last_node<E: NotebookEditor + ?Sized>(editor: &E, content: &str) {
    let position = editor.get_end_position();
    tracing::debug!(position, "pasting at end of document");
    editor.paste_content(position, content);
}

/// Insert `content` after the run of siblings containing `node_type`,
/// starting the walk at `known_starting_position`.
pub fn insert_after_last_node_of_type<E: NotebookEditor + ?Sized>(
    editor: &E,
    node_type: &str,
    content: JsonContent,
    known_starting_position: usize,
) {
    let position = last_node_of_type_position(editor, known_starting_position, node_type);
    tracing::debug!(position, node_type, "inserting after last node of type");
    editor.insert_content_after_node(position, content);
}

/// Insert a timestamp comment in playback-time order.
pub fn insert_replay_comment_by_timestamp<E: NotebookEditor + ?Sized>(
    editor: &E,
    comment: &TimestampComment,
) {
    let position = timestamp_insertion_position(editor, comment);
    tracing::debug!(position, timestamp = comment.timestamp, "inserting timestamp comment");
    editor.insert_content_after_node(position, comment.content());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEditor;

    fn para(text: &str) -> JsonContent {
        JsonContent::paragraph([JsonContent::text(text)])
    }

    fn recording(id: &str) -> JsonContent {
        JsonContent::node("recording").with_attr("id", id)
    }

    fn comment_at(time: u64, marker: &str) -> JsonContent {
        TimestampComment::new(time, "rec-1").from_node(marker).content()
    }

    /// Playback times (and source markers) of the timestamp comments in order.
    fn timeline(editor: &MemoryEditor) -> Vec<(u64, String)> {
        editor
            .blocks()
            .iter()
            .filter_map(|block| block.find_descendant_of_type("replay-timestamp"))
            .map(ReplayTimestampAttrs::from_node)
            .map(|attrs| {
                (
                    attrs.playback_time.unwrap_or_default(),
                    attrs.source_node_id.unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    fn editor_with_run(times: &[u64]) -> MemoryEditor {
        let mut blocks = vec![para("intro"), recording("rec-1")];
        blocks.extend(
            times
                .iter()
                .enumerate()
                .map(|(i, t)| comment_at(*t, &format!("old-{i}"))),
        );
        blocks.push(para("outro"));
        MemoryEditor::with_content(JsonContent::doc(blocks))
    }

    #[test]
    fn test_insert_after_last_node() {
        let editor = MemoryEditor::with_content(JsonContent::doc([para("a"), para("b")]));
        insert_after_last_node(&editor, para("c"));
        assert_eq!(editor.blocks(), vec![para("a"), para("b"), para("c")]);
    }

    #[test]
    fn test_insert_after_last_node_on_empty_document() {
        let editor = MemoryEditor::new();
        assert_eq!(last_node_position(&editor, 0), 0);
        insert_after_last_node(&editor, para("only"));
        assert_eq!(editor.blocks(), vec![para("only")]);
    }

    #[test]
    fn test_paste_after_last_node() {
        let editor = MemoryEditor::with_content(JsonContent::doc([recording("rec-1")]));
        paste_after_last_node(&editor, "pasted");
        assert_eq!(editor.blocks(), vec![recording("rec-1"), para("pasted")]);
    }

    #[test]
    fn test_insert_after_last_node_of_type() {
        let editor = editor_with_run(&[5, 10]);
        insert_after_last_node_of_type(&editor, "replay-timestamp", para("new"), 1);

        let blocks = editor.blocks();
        assert_eq!(blocks[4], para("new"));
        assert_eq!(blocks[5], para("outro"));
    }

    #[test]
    fn test_insert_after_last_node_of_type_without_matches() {
        let editor = MemoryEditor::with_content(JsonContent::doc([para("a"), para("b")]));
        assert_eq!(last_node_of_type_position(&editor, 0, "replay-timestamp"), 0);
        insert_after_last_node_of_type(&editor, "replay-timestamp", para("new"), 0);
        assert_eq!(editor.blocks(), vec![para("a"), para("new"), para("b")]);
    }

    #[test]
    fn test_timestamp_equal_times_append_after_existing() {
        let editor = editor_with_run(&[5, 10, 10, 20]);
        insert_replay_comment_by_timestamp(
            &editor,
            &TimestampComment::new(10, "rec-1").from_node("new"),
        );

        assert_eq!(
            timeline(&editor),
            vec![
                (5, "old-0".to_string()),
                (10, "old-1".to_string()),
                (10, "old-2".to_string()),
                (10, "new".to_string()),
                (20, "old-3".to_string()),
            ]
        );
    }

    #[test]
    fn test_timestamp_later_than_all_appends_to_run() {
        let editor = editor_with_run(&[5, 10, 10, 20]);
        insert_replay_comment_by_timestamp(
            &editor,
            &TimestampComment::new(25, "rec-1").from_node("new"),
        );

        let blocks = editor.blocks();
        // intro, recording, 4 existing comments, then the new one before outro
        assert_eq!(
            ReplayTimestampAttrs::from_node(blocks[6].first_child().unwrap()).playback_time,
            Some(25)
        );
        assert_eq!(blocks[7], para("outro"));
    }

    #[test]
    fn test_timestamp_on_empty_run_lands_at_start() {
        let editor = editor_with_run(&[]);
        let comment = TimestampComment::new(1, "rec-1");
        assert_eq!(timestamp_insertion_position(&editor, &comment), 1);

        insert_replay_comment_by_timestamp(&editor, &comment);
        let blocks = editor.blocks();
        assert_eq!(blocks[1], recording("rec-1"));
        assert!(blocks[2].has_descendant_of_type("replay-timestamp"));
        assert_eq!(blocks[3], para("outro"));
    }

    #[test]
    fn test_timestamp_earlier_than_all_goes_first() {
        let editor = editor_with_run(&[5, 10]);
        let comment = TimestampComment::new(1, "rec-1");
        assert_eq!(timestamp_insertion_position(&editor, &comment), 1);
    }

    #[test]
    fn test_timestamp_known_starting_position_skips_lookup() {
        let editor = MemoryEditor::with_content(JsonContent::doc([
            para("a"),
            comment_at(5, "old"),
            para("b"),
        ]));
        let comment = TimestampComment::new(7, "missing").starting_at(0);
        assert_eq!(timestamp_insertion_position(&editor, &comment), 1);
    }

    #[test]
    fn test_timestamp_without_time_is_skipped_over() {
        let untimed = JsonContent::paragraph([JsonContent::node("replay-timestamp")]);
        let editor = MemoryEditor::with_content(JsonContent::doc([recording("rec-1"), untimed]));
        let comment = TimestampComment::new(0, "rec-1");
        assert_eq!(timestamp_insertion_position(&editor, &comment), 1);
    }
}
