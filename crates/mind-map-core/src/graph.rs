//! The mind-map graph container.
//!
//! [`MindMapGraph`] owns the node table, connection list, and derived
//! clusters for one logical mind map. All mutation is funneled through the
//! orchestrator that owns the instance; this type performs no numeric
//! simulation of its own.
//!
//! # Referential integrity
//!
//! - The node table is keyed by id; `add_node` is insert-or-replace.
//! - `add_connection` refuses connections whose endpoints are not both
//!   present, so a dangling connection can never be stored.
//! - `remove` prunes every connection referencing the removed node.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::geometry::Vec2;
use crate::types::{Cluster, Connection, MindMapNode, NodeId};

/// Aggregate of node table + connection list + cluster list.
#[derive(Debug, Clone, Default)]
pub struct MindMapGraph {
    nodes: HashMap<NodeId, MindMapNode>,
    connections: Vec<Connection>,
    clusters: Vec<Cluster>,
}

impl MindMapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------------

    /// Insert or replace a node by id.
    pub fn add_node(&mut self, node: MindMapNode) {
        self.nodes.insert(node.id, node);
    }

    /// Look up a node. Constant time.
    pub fn node(&self, id: &NodeId) -> Option<&MindMapNode> {
        self.nodes.get(id)
    }

    /// Mutable node lookup. Constant time.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut MindMapNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &MindMapNode> {
        self.nodes.values()
    }

    /// Mutably iterate over all nodes in unspecified order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut MindMapNode> {
        self.nodes.values_mut()
    }

    /// Clone the node table. Used to hand the layout engine a working copy.
    pub fn node_table(&self) -> HashMap<NodeId, MindMapNode> {
        self.nodes.clone()
    }

    /// Write a node position directly, zeroing its velocity.
    ///
    /// Validates finiteness; used for programmatic placement and drag
    /// feedback.
    pub fn set_node_position(&mut self, id: &NodeId, position: Vec2) -> CoreResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or(CoreError::NodeNotFound { id: *id })?;
        node.set_position(position)
    }

    /// Remove a node and every connection referencing it.
    ///
    /// Returns the removed node, or `None` if it was not present. Clusters
    /// are not updated here; they are re-derived on the next pipeline run.
    pub fn remove(&mut self, id: &NodeId) -> Option<MindMapNode> {
        let removed = self.nodes.remove(id)?;
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        let pruned = before - self.connections.len();
        if pruned > 0 {
            debug!(node_id = %id, pruned, "pruned connections for removed node");
        }
        Some(removed)
    }

    /// Clear nodes, connections, and clusters.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.clusters.clear();
    }

    // ---------------------------------------------------------------------
    // Connections
    // ---------------------------------------------------------------------

    /// Insert a connection only if both endpoints already exist.
    ///
    /// Returns `true` when stored. A connection with a missing endpoint is
    /// dropped silently (logged at debug level) — this is the non-fatal
    /// integrity guarantee, the caller is responsible for pre-filtering.
    pub fn add_connection(&mut self, connection: Connection) -> bool {
        if !self.nodes.contains_key(&connection.source_id)
            || !self.nodes.contains_key(&connection.target_id)
        {
            debug!(
                source = %connection.source_id,
                target = %connection.target_id,
                "dropping connection with missing endpoint"
            );
            return false;
        }
        self.connections.push(connection);
        true
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// All nodes directly connected to `id`, on either endpoint.
    ///
    /// Used by layout attraction forces, focus/highlight, and clustering.
    pub fn neighbors(&self, id: &NodeId) -> Vec<NodeId> {
        self.connections
            .iter()
            .filter_map(|c| c.other_endpoint(id))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Clusters
    // ---------------------------------------------------------------------

    /// Replace the derived cluster list.
    pub fn set_clusters(&mut self, clusters: Vec<Cluster>) {
        self.clusters = clusters;
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    // ---------------------------------------------------------------------
    // Integrity
    // ---------------------------------------------------------------------

    /// Check referential integrity of connections and clusters.
    ///
    /// Every connection endpoint and every cluster member must reference an
    /// existing node. Exercised by the test suites after each pipeline.
    pub fn verify_integrity(&self) -> CoreResult<()> {
        for c in &self.connections {
            for endpoint in [c.source_id, c.target_id] {
                if !self.nodes.contains_key(&endpoint) {
                    return Err(CoreError::NodeNotFound { id: endpoint });
                }
            }
        }
        for cluster in &self.clusters {
            for member in &cluster.node_ids {
                if !self.nodes.contains_key(member) {
                    return Err(CoreError::NodeNotFound { id: *member });
                }
            }
        }
        Ok(())
    }
}
