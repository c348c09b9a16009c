//! Schema upgrades for loaded notebooks.

use crate::notebook::Notebook;

/// Current notebook schema version. Also namespaces local buffers, so a
/// schema bump abandons buffers written by older clients.
pub const NOTEBOOKS_VERSION: u32 = 1;

/// Upgrade step applied to every loaded notebook.
pub trait Migration {
    /// Schema version produced by `migrate`.
    fn schema_version(&self) -> u32;

    /// Bring `notebook` up to `schema_version`. Must be pure.
    fn migrate(&self, notebook: Notebook) -> Notebook;
}

/// Pass-through migration for notebooks already at `NOTEBOOKS_VERSION`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentSchema;

impl Migration for CurrentSchema {
    fn schema_version(&self) -> u32 {
        NOTEBOOKS_VERSION
    }

    fn migrate(&self, notebook: Notebook) -> Notebook {
        notebook
    }
}
