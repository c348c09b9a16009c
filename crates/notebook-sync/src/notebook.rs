//! Notebook records as exchanged with the store.

use notebook_editor::{JsonContent, SmolStr};
use serde::{Deserialize, Serialize};

/// A notebook document as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Notebook {
    pub short_id: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: JsonContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// Assigned by the store, bumped on every successful update.
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub is_template: bool,
}

impl Notebook {
    pub fn new(short_id: impl Into<SmolStr>) -> Self {
        Self {
            short_id: short_id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: JsonContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn template(mut self) -> Self {
        self.is_template = true;
        self
    }
}

/// Payload for creating a notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotebook {
    pub content: JsonContent,
    pub text_content: String,
    pub title: Option<String>,
}

/// Payload for updating a notebook. `version` is the last version the
/// client saw; the store rejects the update if it is stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookUpdate {
    pub version: u64,
    pub content: JsonContent,
    pub text_content: String,
    pub title: Option<String>,
}

/// What the user should be told about unsaved work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Nothing pending.
    Synced,
    /// Local-only document; never saved remotely.
    Local,
    /// A save is in flight.
    Saving,
    /// Local edits waiting for the next save.
    Unsaved,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Local => "local",
            SyncStatus::Saving => "saving",
            SyncStatus::Unsaved => "unsaved",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
