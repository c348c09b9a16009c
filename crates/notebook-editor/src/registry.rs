//! Lookup table of mounted node controllers.
//!
//! Every node rendered in a notebook gets a small controller ("node logic")
//! that knows how to select or edit that node. The notebook logic routes
//! node-scoped actions through this registry without knowing anything about
//! the individual node types. One registry belongs to one notebook, so two
//! open notebooks never see each other's nodes.

use std::collections::HashMap;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::content::{Attrs, attrs_contain};

/// A mounted node's controller.
pub trait NodeLogic {
    /// Stable node id. Transient nodes have none and are never registered.
    fn node_id(&self) -> Option<&str>;

    /// Node type, e.g. `recording`.
    fn node_type(&self) -> &str;

    /// Snapshot of the node's attributes.
    fn attributes(&self) -> &Attrs;

    /// Programmatically select/focus the node.
    fn select_node(&self);
}

/// Per-notebook registry of node logics, keyed by node id.
pub struct NodeLogicRegistry<N: ?Sized = dyn NodeLogic> {
    entries: HashMap<SmolStr, Rc<N>>,
}

impl<N: ?Sized> Default for NodeLogicRegistry<N> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<N: NodeLogic + ?Sized> NodeLogicRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node logic. Entries without an id are ignored.
    pub fn register(&mut self, logic: Rc<N>) {
        let Some(id) = logic.node_id().map(SmolStr::new) else {
            tracing::trace!(node_type = logic.node_type(), "skipping node logic without id");
            return;
        };
        self.entries.insert(id, logic);
    }

    /// Remove a node logic by its id. No-op if it was never registered.
    pub fn unregister(&mut self, logic: &N) {
        if let Some(id) = logic.node_id() {
            self.entries.remove(id);
        }
    }

    /// First entry of `node_type` whose attributes contain all of `attrs`.
    ///
    /// Iteration order is unspecified, so with an empty `attrs` any entry of
    /// that type may be returned.
    pub fn find(&self, node_type: &str, attrs: &Attrs) -> Option<Rc<N>> {
        self.entries
            .values()
            .find(|logic| logic.node_type() == node_type && attrs_contain(logic.attributes(), attrs))
            .cloned()
    }

    /// Exact lookup by node id.
    pub fn find_by_id(&self, id: &str) -> Option<Rc<N>> {
        self.entries.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
