//! Derived clusters — retained connected components with a computed summary.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::types::node::NodeId;

/// Minimum component size for a cluster to be retained.
pub const MIN_CLUSTER_SIZE: usize = 2;

/// A cluster of connected nodes.
///
/// Clusters are derived, never independently authored: each is one connected
/// component of size >= [`MIN_CLUSTER_SIZE`], regenerated on every pipeline
/// run and never persisted apart from its source nodes/connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Member node ids.
    pub node_ids: Vec<NodeId>,

    /// Mean member position.
    pub centroid: Vec2,

    /// Max member distance from the centroid, plus a fixed margin.
    pub radius: f32,

    /// Fraction of all graph nodes contained in this cluster, in [0.0, 1.0].
    pub importance: f32,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node_ids.contains(id)
    }
}
