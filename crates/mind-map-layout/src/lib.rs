//! Mind-Map Layout Library
//!
//! Positions mind-map nodes with a force-directed physics simulation and
//! derives clusters from the connection graph.
//!
//! # Components
//!
//! - [`ForceDirectedLayout`] / [`LayoutSimulation`]: iterative repulsion +
//!   attraction simulation with convergence detection, cooperative yielding,
//!   and per-step numeric safety guards
//! - [`rings`]: deterministic provisional ring placement with seeded jitter
//! - [`components`]: connected-component search (iterative, NOT recursive)
//! - [`clusters`]: retained-component clusters with centroid/radius/importance
//!
//! The engine is stateless between calls: it receives a working copy of the
//! node table, runs to convergence or the iteration cap, and returns updated
//! positions. It never retains cross-call state.

pub mod clusters;
pub mod components;
pub mod engine;
pub mod params;
pub mod rings;

pub use clusters::derive_clusters;
pub use components::connected_components;
pub use engine::{ForceDirectedLayout, LayoutOutcome, LayoutSimulation};
pub use params::LayoutParams;
pub use rings::RingLayout;
