//! Interactive drag and selection APIs.
//!
//! These run concurrently with an in-flight generation: a dragged node is
//! frozen by the layout engine but keeps acting as a force source, and the
//! simulation picks up live drag positions at its yield boundaries.

use mind_map_core::geometry::Vec2;
use mind_map_core::types::NodeId;
use mind_map_core::CoreError;
use tracing::debug;

use crate::error::EngineResult;
use crate::orchestrator::MindMapOrchestrator;

/// The current selection: one node plus its direct neighbors.
///
/// Neighbors are recomputed from the live connection list on each query, so
/// the highlight set stays correct while layout or edits are in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub selected: NodeId,
    pub neighbors: Vec<NodeId>,
}

impl MindMapOrchestrator {
    /// Begin dragging a node: freeze it for the layout engine and zero its
    /// velocity so no stale momentum survives the release.
    pub async fn start_drag(&self, id: &NodeId) -> EngineResult<()> {
        {
            let mut graph = self.graph_lock().write().await;
            let node = graph
                .node_mut(id)
                .ok_or(CoreError::NodeNotFound { id: *id })?;
            node.dragging = true;
            node.velocity = Vec2::ZERO;
        }
        self.bump_revision();
        debug!(node = %id, "drag started");
        Ok(())
    }

    /// Move a dragged node. Finiteness-validated; the dragging flag is left
    /// untouched so repeated pointer events need no re-arming.
    pub async fn update_drag_position(&self, id: &NodeId, position: Vec2) -> EngineResult<()> {
        {
            let mut graph = self.graph_lock().write().await;
            graph.set_node_position(id, position)?;
        }
        self.bump_revision();
        Ok(())
    }

    /// Release a dragged node back to the physics.
    pub async fn end_drag(&self, id: &NodeId) -> EngineResult<()> {
        {
            let mut graph = self.graph_lock().write().await;
            let node = graph
                .node_mut(id)
                .ok_or(CoreError::NodeNotFound { id: *id })?;
            node.dragging = false;
        }
        self.bump_revision();
        debug!(node = %id, "drag ended");
        Ok(())
    }

    /// Select one node (or clear the selection with `None`).
    ///
    /// Selection is exclusive; returns the new selection with its neighbor
    /// set for highlight rendering.
    pub async fn select(&self, id: Option<NodeId>) -> EngineResult<Option<Selection>> {
        let selection = {
            let mut graph = self.graph_lock().write().await;
            if let Some(id) = id {
                if !graph.contains_node(&id) {
                    return Err(CoreError::NodeNotFound { id }.into());
                }
            }
            for node in graph.nodes_mut() {
                node.selected = false;
            }
            match id {
                Some(id) => {
                    if let Some(node) = graph.node_mut(&id) {
                        node.selected = true;
                    }
                    Some(Selection {
                        selected: id,
                        neighbors: graph.neighbors(&id),
                    })
                }
                None => None,
            }
        };
        self.bump_revision();
        Ok(selection)
    }

    /// The current selection, with neighbors recomputed from the live
    /// connection list.
    pub async fn selection(&self) -> Option<Selection> {
        let graph = self.graph_lock().read().await;
        let selected = graph.nodes().find(|n| n.selected)?.id;
        Some(Selection {
            selected,
            neighbors: graph.neighbors(&selected),
        })
    }
}
