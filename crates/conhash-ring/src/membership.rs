use std::collections::BTreeMap;
use std::sync::Arc;

use conhash_core::{Node, NodeId};

/// Physical nodes currently registered, keyed by id.
///
/// Never consulted for key resolution; it backs duplicate detection,
/// counting and listing.
#[derive(Debug, Clone, Default)]
pub struct Membership {
    nodes: BTreeMap<NodeId, Arc<Node>>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns `false` and leaves the table untouched if the id is taken.
    pub fn insert(&mut self, node: Arc<Node>) -> bool {
        if self.nodes.contains_key(node.id()) {
            return false;
        }
        self.nodes.insert(node.id().clone(), node);
        true
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<Arc<Node>> {
        self.nodes.remove(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Arc<Node>> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
