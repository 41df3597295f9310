//! Domain types for the mind-map graph.

pub mod cluster;
pub mod connection;
pub mod item;
pub mod node;

pub use cluster::Cluster;
pub use connection::{Connection, RelationshipType};
pub use item::CapturedItem;
pub use node::{MindMapNode, NodeId};
