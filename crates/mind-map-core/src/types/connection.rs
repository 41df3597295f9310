//! Connections — discovered relationships between two nodes.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::node::NodeId;

/// Categorical relationship type produced by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    /// Content-level similarity between the items' text.
    Semantic,
    /// Items captured close together in time.
    Temporal,
    /// Items sharing user-assigned tags.
    Tag,
    /// Items originating from the same source.
    Source,
}

impl RelationshipType {
    /// Lowercase name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RelationshipType::Semantic => "semantic",
            RelationshipType::Temporal => "temporal",
            RelationshipType::Tag => "tag",
            RelationshipType::Source => "source",
        }
    }
}

/// A stored connection between two existing nodes.
///
/// # Invariants
///
/// - Both endpoint ids reference nodes present in the graph. Connections with
///   a missing endpoint are dropped at creation time, never stored dangling.
/// - `strength` ∈ [0.0, 1.0] — governs the attraction rest distance.
/// - `confidence` ∈ [0.0, 1.0] — informational only, never used by physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub relationship: RelationshipType,
    pub strength: f32,
    pub confidence: f32,
}

impl Connection {
    pub fn new(
        source_id: NodeId,
        target_id: NodeId,
        relationship: RelationshipType,
        strength: f32,
        confidence: f32,
    ) -> Self {
        Self {
            source_id,
            target_id,
            relationship,
            strength: strength.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// True when the connection touches the given node on either end.
    pub fn touches(&self, id: &NodeId) -> bool {
        self.source_id == *id || self.target_id == *id
    }

    /// The endpoint opposite to `id`, if `id` is an endpoint at all.
    pub fn other_endpoint(&self, id: &NodeId) -> Option<NodeId> {
        if self.source_id == *id {
            Some(self.target_id)
        } else if self.target_id == *id {
            Some(self.source_id)
        } else {
            None
        }
    }

    /// Validate score ranges. Construction clamps, so this only fails for
    /// values produced by deserialization of untrusted cache content.
    pub fn validate(&self) -> CoreResult<()> {
        for (field, value) in [("strength", self.strength), ("confidence", self.confidence)] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(CoreError::OutOfBounds {
                    field: field.to_string(),
                    value: value as f64,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn scores_are_clamped_on_construction() {
        let c = Connection::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            RelationshipType::Semantic,
            1.7,
            -0.3,
        );
        assert_eq!(c.strength, 1.0);
        assert_eq!(c.confidence, 0.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn endpoint_queries() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let other = Uuid::new_v4();
        let c = Connection::new(a, b, RelationshipType::Tag, 0.5, 0.5);

        assert!(c.touches(&a));
        assert!(c.touches(&b));
        assert!(!c.touches(&other));
        assert_eq!(c.other_endpoint(&a), Some(b));
        assert_eq!(c.other_endpoint(&b), Some(a));
        assert_eq!(c.other_endpoint(&other), None);
    }

    #[test]
    fn relationship_type_serde_roundtrip() {
        let json = serde_json::to_string(&RelationshipType::Temporal).unwrap();
        assert_eq!(json, "\"temporal\"");
        let back: RelationshipType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RelationshipType::Temporal);
    }
}
