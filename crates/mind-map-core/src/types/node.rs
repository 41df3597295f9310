//! Mind-map node — one item rendered as a positioned circle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::geometry::Vec2;

/// Unique identifier for mind-map nodes.
///
/// A node's id equals the id of the captured item it represents.
pub type NodeId = Uuid;

/// Base radius for the least important node.
pub const BASE_RADIUS: f32 = 25.0;

/// Additional radius at full importance. Radius is monotonic in importance:
/// `radius = BASE_RADIUS + importance * RADIUS_RANGE`.
pub const RADIUS_RANGE: f32 = 15.0;

/// A node in the mind map.
///
/// # Invariants
///
/// - `position` components are finite at all times.
/// - `radius > 0` and is derived monotonically from `importance`.
/// - `importance` is clamped to [0.0, 1.0].
///
/// The layout engine mutates `position`/`velocity`; interactive drags write
/// `position` directly with `velocity` forced to zero. While `dragging` is
/// set the node is invisible to the physics writer (frozen-node semantics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapNode {
    /// Stable identity tied to the source item.
    pub id: NodeId,

    /// Current 2D position.
    pub position: Vec2,

    /// Current 2D velocity, consumed by the layout engine.
    pub velocity: Vec2,

    /// Display radius, derived from importance.
    pub radius: f32,

    /// Importance score in [0.0, 1.0].
    pub importance: f32,

    /// True while the node is being interactively dragged.
    pub dragging: bool,

    /// True when this node is the (single) selection.
    pub selected: bool,
}

impl MindMapNode {
    /// Create a node at a position with the given importance.
    ///
    /// Importance is clamped to [0.0, 1.0]; the radius follows from it.
    pub fn new(id: NodeId, position: Vec2, importance: f32) -> Self {
        let importance = importance.clamp(0.0, 1.0);
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            radius: radius_for_importance(importance),
            importance,
            dragging: false,
            selected: false,
        }
    }

    /// Replace the importance score, re-deriving the radius.
    pub fn set_importance(&mut self, importance: f32) {
        self.importance = importance.clamp(0.0, 1.0);
        self.radius = radius_for_importance(self.importance);
    }

    /// Write a new position directly, zeroing velocity.
    ///
    /// Used for programmatic placement and drag feedback. Rejects non-finite
    /// input so the position invariant holds unconditionally.
    pub fn set_position(&mut self, position: Vec2) -> CoreResult<()> {
        if !position.is_finite() {
            return Err(CoreError::NonFiniteValue {
                field: "position",
                x: position.x,
                y: position.y,
            });
        }
        self.position = position;
        self.velocity = Vec2::ZERO;
        Ok(())
    }
}

/// Radius derivation shared by node construction and score updates.
pub fn radius_for_importance(importance: f32) -> f32 {
    BASE_RADIUS + importance.clamp(0.0, 1.0) * RADIUS_RANGE
}
