//! Layout-cache seam and the stored record format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::geometry::Vec2;
use crate::graph::MindMapGraph;
use crate::types::{Connection, NodeId};

/// A cached node position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
}

/// The persisted layout record. Must round-trip exactly.
///
/// Scores (importance, radius) are intentionally absent: they are
/// re-derivable from the item collection, and the fingerprint guarantees the
/// collection is unchanged whenever this record is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLayout {
    /// Fingerprint of the item collection this layout was computed for.
    pub fingerprint: String,
    pub nodes: Vec<StoredNode>,
    pub connections: Vec<Connection>,
}

impl StoredLayout {
    /// Snapshot a graph's final positions and connections under a key.
    pub fn from_graph(fingerprint: String, graph: &MindMapGraph) -> Self {
        let mut nodes: Vec<StoredNode> = graph
            .nodes()
            .map(|n| StoredNode {
                id: n.id,
                x: n.position.x,
                y: n.position.y,
            })
            .collect();
        // Node-table iteration order is unspecified; sort for a stable record.
        nodes.sort_by_key(|n| n.id);
        Self {
            fingerprint,
            nodes,
            connections: graph.connections().to_vec(),
        }
    }

    /// Position of a stored node, if present.
    pub fn position_of(&self, id: &NodeId) -> Option<Vec2> {
        self.nodes
            .iter()
            .find(|n| n.id == *id)
            .map(|n| Vec2::new(n.x, n.y))
    }
}

/// External layout cache keyed by collection fingerprint.
///
/// Backed by local file or key-value storage in hosts; stubs in this
/// workspace provide in-memory and JSON-file implementations. A read or
/// deserialize failure is reported as an error and treated as a cache miss
/// by the orchestrator.
#[async_trait]
pub trait LayoutCache: Send + Sync {
    /// Fetch the stored layout for a fingerprint, if any.
    async fn get(&self, fingerprint: &str) -> CoreResult<Option<StoredLayout>>;

    /// Store a layout under its fingerprint, replacing any previous entry.
    async fn set(&self, fingerprint: &str, layout: StoredLayout) -> CoreResult<()>;

    /// Drop every cached layout containing any of the given nodes.
    async fn invalidate(&self, node_ids: &[NodeId]) -> CoreResult<()>;
}
