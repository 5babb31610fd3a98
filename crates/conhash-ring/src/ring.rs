use std::collections::BTreeMap;
use std::ops::Bound::{Included, Unbounded};
use std::sync::Arc;

use conhash_core::Node;

/// Ordered keyspace positions, each bound to the node that owns it.
///
/// Lookup walks clockwise from the queried position to the nearest stored
/// position, wrapping to the smallest one past the end of the keyspace.
#[derive(Debug, Clone, Default)]
pub struct HashRing {
    positions: BTreeMap<u64, Arc<Node>>,
}

impl HashRing {
    pub fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
        }
    }

    /// Bind `position` to `node`, replacing any previous owner.
    pub fn insert(&mut self, position: u64, node: Arc<Node>) -> Option<Arc<Node>> {
        self.positions.insert(position, node)
    }

    pub fn remove(&mut self, position: u64) -> Option<Arc<Node>> {
        self.positions.remove(&position)
    }

    /// Remove `position` only while it is still owned by `node_id`.
    ///
    /// A position overwritten by another node's collision keeps its new owner.
    pub fn remove_owned(&mut self, position: u64, node_id: &str) -> bool {
        match self.positions.get(&position) {
            Some(owner) if owner.id().as_str() == node_id => {
                self.positions.remove(&position);
                true
            }
            _ => false,
        }
    }

    /// Owner of the first position at or after `query`, wrapping around.
    pub fn resolve(&self, query: u64) -> Option<&Arc<Node>> {
        self.positions
            .range((Included(query), Unbounded))
            .next()
            .or_else(|| self.positions.iter().next())
            .map(|(_, node)| node)
    }

    pub fn owner_at(&self, position: u64) -> Option<&Arc<Node>> {
        self.positions.get(&position)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Positions in ascending keyspace order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Arc<Node>)> {
        self.positions.iter().map(|(pos, node)| (*pos, node))
    }
}
