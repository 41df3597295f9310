//! Mind-Map Core Library
//!
//! Provides the domain types, collaborator traits, and stub implementations
//! for the mind-map graph system.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`MindMapNode`, `Connection`, `Cluster`, `CapturedItem`)
//! - The `MindMapGraph` container with referential-integrity maintenance
//! - Collaborator traits (`RelationshipProvider`, `LayoutCache`, `ChangeTracker`)
//! - The collection fingerprint used as the layout-cache key
//! - Error types and result aliases
//!
//! The force simulation lives in `mind-map-layout` and the generation
//! pipeline in `mind-map-engine`; this crate performs no numeric simulation.
//!
//! # Example
//!
//! ```
//! use mind_map_core::graph::MindMapGraph;
//! use mind_map_core::types::MindMapNode;
//! use mind_map_core::geometry::Vec2;
//! use uuid::Uuid;
//!
//! let mut graph = MindMapGraph::new();
//! let node = MindMapNode::new(Uuid::new_v4(), Vec2::new(100.0, 100.0), 0.5);
//! let id = node.id;
//! graph.add_node(node);
//! assert!(graph.node(&id).is_some());
//! ```

pub mod error;
pub mod fingerprint;
pub mod geometry;
pub mod graph;
pub mod stubs;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use error::{CoreError, CoreResult};
pub use fingerprint::fingerprint;
pub use geometry::{Bounds, Vec2};
pub use graph::MindMapGraph;
pub use types::{CapturedItem, Cluster, Connection, MindMapNode, NodeId, RelationshipType};
