use std::collections::BTreeMap;
use std::sync::Arc;

use conhash_core::{Node, NodeId, RingConfig, RingError};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::hash;
use crate::membership::Membership;
use crate::ring::HashRing;
use crate::stats::{DistributionReport, RingInfo};

/// Ring and membership table, always locked together.
#[derive(Debug, Clone, Default)]
struct RingState {
    ring: HashRing,
    members: Membership,
}

impl RingState {
    fn resolve(&self, key: &str) -> Option<&Arc<Node>> {
        if self.members.is_empty() {
            return None;
        }
        self.ring.resolve(hash::position(key))
    }

    /// Owner tally for `"{prefix}_{i}"`, seeded with every member at zero.
    fn tally(&self, prefix: &str, key_count: usize) -> BTreeMap<NodeId, usize> {
        let mut counts: BTreeMap<NodeId, usize> =
            self.members.ids().into_iter().map(|id| (id, 0)).collect();
        for i in 0..key_count {
            let key = format!("{prefix}_{i}");
            if let Some(node) = self.resolve(&key) {
                match counts.get_mut(node.id()) {
                    Some(count) => *count += 1,
                    None => {
                        counts.insert(node.id().clone(), 1);
                    }
                }
            }
        }
        counts
    }
}

/// Operation surface over a consistent hash ring.
///
/// Handles are cheap to clone and share one ring. Lookups and introspection
/// take the shared lock; registration, deregistration and reset take the
/// exclusive lock, so a reader never sees the ring and the membership table
/// disagree.
#[derive(Debug, Clone)]
pub struct RingManager {
    state: Arc<RwLock<RingState>>,
    config: RingConfig,
}

impl Default for RingManager {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(RingState::default())),
            config: RingConfig::default(),
        }
    }
}

impl RingManager {
    pub fn new(config: RingConfig) -> Result<Self, RingError> {
        config.validate().map_err(RingError::InvalidArgument)?;
        Ok(Self {
            state: Arc::new(RwLock::new(RingState::default())),
            config,
        })
    }

    pub fn with_virtual_nodes(virtual_nodes_per_node: usize) -> Result<Self, RingError> {
        Self::new(RingConfig::with_virtual_nodes(virtual_nodes_per_node))
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    pub fn virtual_nodes_per_node(&self) -> usize {
        self.config.virtual_nodes_per_node
    }

    /// Add a node and its virtual positions.
    ///
    /// A node whose id is already registered is left as is, address
    /// included. Returns whether the node was added.
    pub fn register_node(&self, node: Node) -> bool {
        let mut state = self.state.write();
        if state.members.contains(node.id()) {
            debug!(node_id = %node.id(), "Node already registered");
            return false;
        }

        let node = Arc::new(node);
        for i in 0..self.config.virtual_nodes_per_node {
            let position = hash::virtual_position(node.id().as_str(), i);
            if let Some(previous) = state.ring.insert(position, node.clone()) {
                debug!(
                    node_id = %node.id(),
                    displaced = %previous.id(),
                    position,
                    "Virtual position collision"
                );
            }
        }
        state.members.insert(node.clone());

        conhash_core::metrics::record_node_registered();
        conhash_core::metrics::set_ring_size(state.members.len(), state.ring.len());
        info!(
            node_id = %node.id(),
            address = %node.address(),
            virtual_nodes = self.config.virtual_nodes_per_node,
            "Node registered"
        );
        true
    }

    /// Remove a node and every virtual position it still owns.
    ///
    /// Positions are found by recomputing the node's virtual keys. Returns
    /// whether the node was present.
    pub fn deregister_node(&self, node_id: &str) -> bool {
        let mut state = self.state.write();
        let Some(node) = state.members.remove(&NodeId::from(node_id)) else {
            debug!(node_id, "Node not registered, nothing to remove");
            return false;
        };

        for i in 0..self.config.virtual_nodes_per_node {
            let position = hash::virtual_position(node_id, i);
            state.ring.remove_owned(position, node_id);
        }

        conhash_core::metrics::record_node_deregistered();
        conhash_core::metrics::set_ring_size(state.members.len(), state.ring.len());
        info!(node_id = %node.id(), "Node deregistered");
        true
    }

    /// Owner of `key`, or `None` when no node is registered.
    pub fn resolve(&self, key: &str) -> Option<Arc<Node>> {
        let state = self.state.read();
        let owner = state.resolve(key).cloned();
        if owner.is_none() {
            debug!(key, "Lookup against empty ring");
        }
        conhash_core::metrics::record_lookup(owner.is_some());
        owner
    }

    /// Like [`resolve`](Self::resolve), for callers whose key may be absent.
    pub fn try_resolve(&self, key: Option<&str>) -> Result<Option<Arc<Node>>, RingError> {
        let key = key.ok_or_else(|| RingError::InvalidArgument("key must not be null".into()))?;
        Ok(self.resolve(key))
    }

    pub fn node_count(&self) -> usize {
        self.state.read().members.len()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.state.read().members.contains(&NodeId::from(node_id))
    }

    pub fn node(&self, node_id: &str) -> Option<Arc<Node>> {
        self.state.read().members.get(&NodeId::from(node_id)).cloned()
    }

    /// Snapshot of membership with a sampled ownership distribution.
    pub fn ring_info(&self) -> RingInfo {
        let state = self.state.read();
        let distribution = state.tally(
            &self.config.sample_key_prefix,
            self.config.sample_key_count,
        );
        RingInfo::new(state.ring.len(), state.members.ids(), distribution)
    }

    /// Resolve `"{prefix}_{i}"` for `i in 0..key_count` and summarize owners.
    ///
    /// Runs against a copy of the ring taken under the read lock, so large
    /// key counts never hold up registration or deregistration.
    pub fn distribution(&self, prefix: &str, key_count: usize) -> DistributionReport {
        let snapshot = self.state.read().clone();
        DistributionReport::new(key_count, snapshot.tally(prefix, key_count))
    }

    /// Current owner of each key, taken under a single read lock.
    pub fn snapshot_owners<I, S>(&self, keys: I) -> BTreeMap<String, Option<NodeId>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = self.state.read();
        keys.into_iter()
            .map(|key| {
                let key = key.into();
                let owner = state.resolve(&key).map(|node| node.id().clone());
                (key, owner)
            })
            .collect()
    }

    /// Drop every node and position.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.ring.clear();
        state.members.clear();
        conhash_core::metrics::record_ring_reset();
        conhash_core::metrics::set_ring_size(0, 0);
        info!("Ring reset");
    }
}

/// A key whose owner differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMove {
    pub key: String,
    pub from: Option<NodeId>,
    pub to: Option<NodeId>,
}

/// Keys present in both snapshots whose owner changed, in key order.
pub fn moved_keys(
    before: &BTreeMap<String, Option<NodeId>>,
    after: &BTreeMap<String, Option<NodeId>>,
) -> Vec<KeyMove> {
    before
        .iter()
        .filter_map(|(key, from)| {
            let to = after.get(key)?;
            (from != to).then(|| KeyMove {
                key: key.clone(),
                from: from.clone(),
                to: to.clone(),
            })
        })
        .collect()
}
