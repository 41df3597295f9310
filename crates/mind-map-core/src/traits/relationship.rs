//! Relationship discovery seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::types::{CapturedItem, NodeId, RelationshipType};

/// A relationship proposed by the discovery collaborator.
///
/// Endpoints reference item ids; the orchestrator drops any relationship
/// whose endpoints did not survive the node cap before storing a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredRelationship {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub relationship: RelationshipType,
    /// Governs the attraction rest distance, in [0.0, 1.0].
    pub strength: f32,
    /// Informational confidence score, in [0.0, 1.0].
    pub confidence: f32,
}

/// External relationship discovery (text/vision analysis lives behind this).
///
/// Called once per generation with the (possibly capped) ordered item list.
/// A failure or empty result is non-fatal: the pipeline proceeds with zero
/// connections and the nodes keep their provisional layout.
#[async_trait]
pub trait RelationshipProvider: Send + Sync {
    /// Discover relationships among the given items.
    async fn discover(&self, items: &[CapturedItem]) -> CoreResult<Vec<DiscoveredRelationship>>;
}
