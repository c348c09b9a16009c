//! Which content wins, and what to tell the user about it.
//!
//! Three layers can hold content for one notebook: a read-only preview of a
//! historical version, the local edit buffer, and the last remote copy. The
//! first one present wins, in that order.

use notebook_editor::JsonContent;

use crate::notebook::SyncStatus;

pub const UNTITLED: &str = "Untitled";

/// Preview beats local beats remote.
pub fn effective_content<'a>(
    preview: Option<&'a JsonContent>,
    local: Option<&'a JsonContent>,
    remote: Option<&'a JsonContent>,
) -> Option<&'a JsonContent> {
    preview.or(local).or(remote)
}

/// First text of the first block of `content`, else the stored title, else
/// `Untitled`.
pub fn derive_title(content: Option<&JsonContent>, stored_title: Option<&str>) -> String {
    content
        .and_then(JsonContent::first_text)
        .or(stored_title.filter(|t| !t.is_empty()))
        .unwrap_or(UNTITLED)
        .to_string()
}

/// Snapshot of the controller state that `sync_status` depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncInputs {
    pub previewing: bool,
    pub is_template: bool,
    pub is_local_only: bool,
    pub has_document: bool,
    pub has_local_content: bool,
    pub saving: bool,
}

pub fn sync_status(inputs: &SyncInputs) -> SyncStatus {
    if inputs.previewing || inputs.is_template {
        SyncStatus::Synced
    } else if inputs.is_local_only {
        SyncStatus::Local
    } else if !inputs.has_document || !inputs.has_local_content {
        SyncStatus::Synced
    } else if inputs.saving {
        SyncStatus::Saving
    } else {
        SyncStatus::Unsaved
    }
}
