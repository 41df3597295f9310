//! Deterministic heuristic relationship discovery.

use async_trait::async_trait;
use chrono::Duration;

use crate::error::CoreResult;
use crate::traits::{DiscoveredRelationship, RelationshipProvider};
use crate::types::{CapturedItem, RelationshipType};

/// Heuristic relationship provider for tests and demos.
///
/// Produces deterministic relationships from metadata alone:
/// - shared tags → [`RelationshipType::Tag`], strength = Jaccard-style
///   overlap ratio;
/// - captures within a time window → [`RelationshipType::Temporal`],
///   strength decaying linearly with the gap.
///
/// No text analysis happens here; real hosts inject an ML-backed provider.
#[derive(Debug, Clone)]
pub struct HeuristicRelationshipProvider {
    /// Two items captured closer than this are considered related in time.
    temporal_window: Duration,
}

impl Default for HeuristicRelationshipProvider {
    fn default() -> Self {
        Self {
            temporal_window: Duration::minutes(30),
        }
    }
}

impl HeuristicRelationshipProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temporal_window(temporal_window: Duration) -> Self {
        Self { temporal_window }
    }

    fn tag_overlap(a: &CapturedItem, b: &CapturedItem) -> f32 {
        if a.tags.is_empty() || b.tags.is_empty() {
            return 0.0;
        }
        let shared = a.tags.iter().filter(|t| b.tags.contains(t)).count();
        let union = a.tags.len() + b.tags.len() - shared;
        if union == 0 {
            0.0
        } else {
            shared as f32 / union as f32
        }
    }
}

#[async_trait]
impl RelationshipProvider for HeuristicRelationshipProvider {
    async fn discover(&self, items: &[CapturedItem]) -> CoreResult<Vec<DiscoveredRelationship>> {
        let mut relationships = Vec::new();

        for (i, a) in items.iter().enumerate() {
            for b in items.iter().skip(i + 1) {
                let overlap = Self::tag_overlap(a, b);
                if overlap > 0.0 {
                    relationships.push(DiscoveredRelationship {
                        source_id: a.id,
                        target_id: b.id,
                        relationship: RelationshipType::Tag,
                        strength: overlap,
                        confidence: 0.9,
                    });
                    continue;
                }

                let gap = (a.timestamp - b.timestamp).abs();
                if gap < self.temporal_window {
                    let window_us = self.temporal_window.num_microseconds().unwrap_or(i64::MAX);
                    let gap_us = gap.num_microseconds().unwrap_or(i64::MAX);
                    let strength = 1.0 - (gap_us as f32 / window_us as f32);
                    relationships.push(DiscoveredRelationship {
                        source_id: a.id,
                        target_id: b.id,
                        relationship: RelationshipType::Temporal,
                        strength,
                        confidence: 0.6,
                    });
                }
            }
        }

        Ok(relationships)
    }
}
