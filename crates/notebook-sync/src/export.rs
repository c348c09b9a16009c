//! Downloadable notebook files.

use notebook_editor::JsonContent;

use crate::error::NotebookError;

pub const NOTEBOOK_FILE_SUFFIX: &str = ".notebook.json";
pub const NOTEBOOK_MIME_TYPE: &str = "application/json";

/// A file ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

impl ExportedFile {
    /// Pretty-printed notebook content named after its title.
    pub fn notebook_json(title: &str, content: &JsonContent) -> Result<Self, NotebookError> {
        Ok(Self {
            file_name: format!("{}{NOTEBOOK_FILE_SUFFIX}", slugify(title)),
            mime_type: NOTEBOOK_MIME_TYPE,
            contents: serde_json::to_string_pretty(content)?,
        })
    }
}

/// Lowercase, whitespace to `-`, drop everything that is not an ASCII word
/// character, collapse repeated dashes. Empty results become `untitled`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_whitespace() || ch == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}
