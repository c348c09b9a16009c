//! Where a notebook's document comes from.

use notebook_editor::JsonContent;

use crate::notebook::Notebook;

/// Reserved id of the local-only scratch notebook.
pub const SCRATCHPAD_SHORT_ID: &str = "scratchpad";

/// Id prefix of built-in templates.
pub const TEMPLATE_PREFIX: &str = "template-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotebookSource<'a> {
    /// Synthesized locally, never saved.
    Scratchpad,
    /// One of the supplied templates.
    Template(&'a str),
    /// Fetched from the remote store.
    Remote(&'a str),
}

impl<'a> NotebookSource<'a> {
    pub fn for_short_id(short_id: &'a str) -> Self {
        if short_id == SCRATCHPAD_SHORT_ID {
            NotebookSource::Scratchpad
        } else if short_id.starts_with(TEMPLATE_PREFIX) {
            NotebookSource::Template(short_id)
        } else {
            NotebookSource::Remote(short_id)
        }
    }
}

/// Locally supplied notebooks: the scratchpad record and the templates.
#[derive(Debug, Clone, PartialEq)]
pub struct NotebookSources {
    pub scratchpad: Notebook,
    pub templates: Vec<Notebook>,
}

impl Default for NotebookSources {
    fn default() -> Self {
        Self {
            scratchpad: Notebook::new(SCRATCHPAD_SHORT_ID).with_title("Scratchpad"),
            templates: Vec::new(),
        }
    }
}

impl NotebookSources {
    pub fn with_templates(mut self, templates: impl IntoIterator<Item = Notebook>) -> Self {
        self.templates.extend(templates);
        self
    }

    /// The scratchpad as loaded: empty content at version 0. Its real
    /// content lives only in the local buffer.
    pub fn scratchpad_document(&self) -> Notebook {
        Notebook {
            content: JsonContent::default(),
            text_content: None,
            version: 0,
            ..self.scratchpad.clone()
        }
    }

    pub fn template(&self, short_id: &str) -> Option<Notebook> {
        self.templates
            .iter()
            .find(|template| template.short_id == short_id)
            .cloned()
    }
}
