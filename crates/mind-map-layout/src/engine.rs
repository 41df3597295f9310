//! Force-directed layout engine.
//!
//! Given a node set, a connection set, and a bounding rectangle, iteratively
//! computes a 2D layout that separates unconnected nodes and pulls connected
//! nodes toward a relationship-weighted rest distance.
//!
//! # Per-iteration algorithm
//!
//! For every node that is not being dragged:
//! 1. Repulsion from every other node closer than
//!    `radius_i + radius_j + collision_margin`, scaled
//!    `repulsion_constant / (d² + 1)` away from the neighbor. Pairs at or
//!    beyond the minimum distance exert no repulsion, which bounds the force
//!    magnitude and avoids the singularity at d → 0.
//! 2. Attraction along every incident connection whose length exceeds
//!    `max_attraction_distance × strength`, scaled
//!    `attraction_constant × strength × (d − rest)` toward the neighbor.
//! 3. Integration: `v = (v + F·dt)·damping; p += v·dt`, clamped into the
//!    bounding rectangle.
//!
//! A NaN or infinity produced at any arithmetic step discards that node's
//! update for the iteration; the prior valid state is retained unchanged.
//! Dragging nodes are never updated but still act as force sources at their
//! externally-set position.
//!
//! # Convergence
//!
//! Every 10th iteration (never before iteration 10) the mean velocity
//! magnitude is compared against `convergence_threshold`; the run also stops
//! at the hard cap `min(max_iterations, 2 × node_count)`. The async driver
//! yields to the scheduler every `yield_interval` iterations so one
//! generation never blocks the host.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use mind_map_core::geometry::{Bounds, Vec2};
use mind_map_core::types::{Connection, MindMapNode, NodeId};
use mind_map_core::CoreResult;

use crate::params::LayoutParams;

/// Iterations between convergence checks.
const CONVERGENCE_CHECK_INTERVAL: usize = 10;

/// Stateless-between-calls layout engine.
///
/// Holds only configuration; every call to [`ForceDirectedLayout::run`] or
/// [`ForceDirectedLayout::simulation`] operates on a caller-supplied working
/// copy of the node table and returns updated positions.
#[derive(Debug, Clone)]
pub struct ForceDirectedLayout {
    params: LayoutParams,
    bounds: Bounds,
}

/// Result of a finished (or cancelled) simulation.
#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    /// Node table with final positions and velocities.
    pub nodes: HashMap<NodeId, MindMapNode>,
    /// Iterations actually executed.
    pub iterations: usize,
    /// True when mean velocity dropped below the threshold before the cap.
    pub converged: bool,
}

impl ForceDirectedLayout {
    pub fn new(params: LayoutParams, bounds: Bounds) -> Self {
        Self { params, bounds }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Build a stepper over a working copy of the node table.
    ///
    /// The orchestrator drives the stepper directly so it can publish
    /// intermediate positions and feed live drag updates in at yield
    /// boundaries.
    pub fn simulation(
        &self,
        nodes: HashMap<NodeId, MindMapNode>,
        connections: Vec<Connection>,
    ) -> LayoutSimulation {
        LayoutSimulation::new(self.params, self.bounds, nodes, connections)
    }

    /// Run a full simulation, yielding to the scheduler every
    /// `yield_interval` iterations and polling the cancellation flag.
    ///
    /// On cancellation the outcome carries whatever positions were valid at
    /// the last completed iteration.
    pub async fn run(
        &self,
        nodes: HashMap<NodeId, MindMapNode>,
        connections: Vec<Connection>,
        cancel: &AtomicBool,
    ) -> LayoutOutcome {
        let mut sim = self.simulation(nodes, connections);
        while !sim.finished() {
            for _ in 0..self.params.yield_interval {
                if cancel.load(Ordering::Relaxed) {
                    debug!(iteration = sim.iteration(), "layout cancelled");
                    return sim.into_outcome();
                }
                sim.step();
                if sim.finished() {
                    break;
                }
            }
            tokio::task::yield_now().await;
        }
        sim.into_outcome()
    }
}

/// Per-node adjacency entry: neighbor id + connection strength.
type AdjacencyMap = HashMap<NodeId, Vec<(NodeId, f32)>>;

/// One in-flight simulation over a working copy of the graph.
#[derive(Debug)]
pub struct LayoutSimulation {
    params: LayoutParams,
    bounds: Bounds,
    nodes: HashMap<NodeId, MindMapNode>,
    adjacency: AdjacencyMap,
    iteration: usize,
    cap: usize,
    converged: bool,
}

impl LayoutSimulation {
    fn new(
        params: LayoutParams,
        bounds: Bounds,
        nodes: HashMap<NodeId, MindMapNode>,
        connections: Vec<Connection>,
    ) -> Self {
        let mut adjacency: AdjacencyMap = HashMap::with_capacity(nodes.len());
        for c in &connections {
            adjacency
                .entry(c.source_id)
                .or_default()
                .push((c.target_id, c.strength));
            adjacency
                .entry(c.target_id)
                .or_default()
                .push((c.source_id, c.strength));
        }
        let cap = params.iteration_cap(nodes.len());
        Self {
            params,
            bounds,
            nodes,
            adjacency,
            iteration: 0,
            cap,
            converged: false,
        }
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Effective iteration cap: `min(max_iterations, 2 × node_count)`.
    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// True once the simulation converged or hit the iteration cap.
    pub fn finished(&self) -> bool {
        self.converged || self.iteration >= self.cap
    }

    pub fn nodes(&self) -> &HashMap<NodeId, MindMapNode> {
        &self.nodes
    }

    /// Interactive update: write a position directly, zeroing velocity.
    ///
    /// Validates finiteness; used for drag feedback while a simulation is
    /// in flight.
    pub fn set_node_position(&mut self, id: &NodeId, position: Vec2) -> CoreResult<()> {
        match self.nodes.get_mut(id) {
            Some(node) => node.set_position(position),
            None => Err(mind_map_core::CoreError::NodeNotFound { id: *id }),
        }
    }

    /// Update a node's dragging flag (drags can start or end mid-run).
    pub fn set_dragging(&mut self, id: &NodeId, dragging: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.dragging = dragging;
            if dragging {
                node.velocity = Vec2::ZERO;
            }
        }
    }

    /// Mean velocity magnitude across all nodes.
    ///
    /// Summed in sorted id order for run-to-run determinism.
    pub fn mean_velocity(&self) -> f32 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort();
        let total: f32 = ids
            .iter()
            .map(|id| self.nodes[id].velocity.magnitude())
            .sum();
        total / self.nodes.len() as f32
    }

    /// Execute one iteration. No-op once finished.
    pub fn step(&mut self) {
        if self.finished() {
            return;
        }
        self.iteration += 1;

        // Freeze this iteration's force sources: every node contributes at
        // its pre-iteration position, dragging nodes at their externally-set
        // one. Sorted by id so force summation order (and therefore the f32
        // result) never depends on hash-map iteration order.
        let mut bodies: Vec<Body> = self
            .nodes
            .values()
            .map(|n| Body {
                id: n.id,
                position: n.position,
                radius: n.radius,
            })
            .collect();
        bodies.sort_by_key(|b| b.id);

        let mut updates: Vec<(NodeId, Vec2, Vec2)> = Vec::with_capacity(self.nodes.len());
        let mut discarded = 0usize;
        for body in &bodies {
            let node = &self.nodes[&body.id];
            if node.dragging {
                continue;
            }
            match self.integrate(node, &bodies) {
                Some((position, velocity)) => updates.push((node.id, position, velocity)),
                None => discarded += 1,
            }
        }
        if discarded > 0 {
            trace!(
                iteration = self.iteration,
                discarded,
                "discarded non-finite node updates"
            );
        }

        for (id, position, velocity) in updates {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.position = position;
                node.velocity = velocity;
            }
        }

        if self.iteration >= CONVERGENCE_CHECK_INTERVAL
            && self.iteration % CONVERGENCE_CHECK_INTERVAL == 0
        {
            let mean = self.mean_velocity();
            if mean < self.params.convergence_threshold {
                debug!(
                    iteration = self.iteration,
                    mean_velocity = mean,
                    "layout converged"
                );
                self.converged = true;
            }
        }
    }

    pub fn into_outcome(self) -> LayoutOutcome {
        LayoutOutcome {
            nodes: self.nodes,
            iterations: self.iteration,
            converged: self.converged,
        }
    }

    /// Total force on a node, or `None` if any step produced a non-finite
    /// value.
    fn force_on(&self, node: &MindMapNode, bodies: &[Body]) -> Option<Vec2> {
        let mut force = Vec2::ZERO;

        // Repulsion: every pair below its minimum distance pushes apart.
        for other in bodies {
            if other.id == node.id {
                continue;
            }
            let delta = node.position - other.position;
            let dist_sq = delta.magnitude_squared();
            if !dist_sq.is_finite() {
                return None;
            }
            let dist = dist_sq.sqrt();
            let min_distance = node.radius + other.radius + self.params.collision_margin;
            if dist < min_distance {
                let direction = delta.normalized_or_zero();
                let contribution =
                    direction * (self.params.repulsion_constant / (dist_sq + 1.0));
                if !contribution.is_finite() {
                    return None;
                }
                force += contribution;
            }
        }

        // Attraction: incident connections longer than their rest distance
        // pull toward the neighbor.
        if let Some(neighbors) = self.adjacency.get(&node.id) {
            for (neighbor_id, strength) in neighbors {
                let Some(neighbor) = self.nodes.get(neighbor_id) else {
                    continue;
                };
                let delta = neighbor.position - node.position;
                let dist = delta.magnitude();
                if !dist.is_finite() {
                    return None;
                }
                let rest = self.params.max_attraction_distance * strength;
                if dist > rest {
                    let direction = delta.normalized_or_zero();
                    let contribution = direction
                        * (self.params.attraction_constant * strength * (dist - rest));
                    if !contribution.is_finite() {
                        return None;
                    }
                    force += contribution;
                }
            }
        }

        force.is_finite().then_some(force)
    }

    /// Integrate one node, returning the clamped new position and velocity,
    /// or `None` when the update must be discarded.
    fn integrate(&self, node: &MindMapNode, bodies: &[Body]) -> Option<(Vec2, Vec2)> {
        let force = self.force_on(node, bodies)?;
        let velocity = (node.velocity + force * self.params.time_step) * self.params.damping;
        if !velocity.is_finite() {
            return None;
        }
        let position = node.position + velocity * self.params.time_step;
        if !position.is_finite() {
            return None;
        }
        Some((self.bounds.clamp(position), velocity))
    }
}

/// Frozen force source for one iteration.
#[derive(Debug, Clone, Copy)]
struct Body {
    id: NodeId,
    position: Vec2,
    radius: f32,
}
