//! The generation pipeline orchestrator.
//!
//! One [`MindMapOrchestrator`] exclusively owns one [`MindMapGraph`] for its
//! process lifetime. A generation run walks the stages:
//!
//! 1. cache check (hit → load stored layout and finish — the common case
//!    for unchanged data, fast enough to feel instant)
//! 2. provisional ring layout, published immediately
//! 3. relationship discovery (external collaborator, called once per run)
//! 4. node creation (capped, importance-scored)
//! 5. connection creation (capped, endpoint-filtered)
//! 6. iterative force layout, yielding periodically
//! 7. cluster derivation
//! 8. cache persistence keyed by the collection fingerprint
//!
//! Runs are single-flight: starting a new generation cooperatively cancels
//! any in-flight one. Cancellation is polled at stage boundaries and inside
//! the iteration loop; a cancelled run leaves the last committed graph
//! state visible and writes no cache entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use mind_map_core::geometry::Vec2;
use mind_map_core::stubs::{BasicChangeTracker, HeuristicRelationshipProvider, InMemoryLayoutCache};
use mind_map_core::traits::{ChangeTracker, LayoutCache, RelationshipProvider, StoredLayout};
use mind_map_core::types::{CapturedItem, Connection, MindMapNode, NodeId};
use mind_map_core::{fingerprint, MindMapGraph};
use mind_map_layout::{derive_clusters, ForceDirectedLayout, LayoutSimulation};

use crate::config::MindMapConfig;
use crate::error::EngineResult;
use crate::progress::{
    GenerationOutcome, GenerationProgress, GenerationReport, GenerationStage, GenerationState,
};

/// Importance score for a captured item.
///
/// `clamp(0.5 + text-length term + tag-count term, 0, 1)`: richer items get
/// larger nodes, but both terms saturate so a wall of text cannot dominate
/// the canvas.
pub fn importance_for(item: &CapturedItem) -> f32 {
    let text_term = (item.text_len() as f32 / 800.0).min(0.3);
    let tag_term = (item.tags.len() as f32 * 0.05).min(0.2);
    (0.5 + text_term + tag_term).clamp(0.0, 1.0)
}

/// Orchestrates generation, interactive edits, and change intake for one
/// mind map.
///
/// All collaborators are injected at construction; there is no global
/// shared instance. Every mutation of the graph is serialized through the
/// single `RwLock` owned here, and every committed mutation is followed by
/// an explicit revision bump on the change channel — downstream observers
/// subscribe to that, nothing relies on assignment side effects.
pub struct MindMapOrchestrator {
    config: MindMapConfig,
    graph: Arc<RwLock<MindMapGraph>>,
    provider: Arc<dyn RelationshipProvider>,
    cache: Arc<dyn LayoutCache>,
    tracker: Arc<dyn ChangeTracker>,
    progress_tx: watch::Sender<GenerationProgress>,
    completion_tx: broadcast::Sender<()>,
    revision_tx: watch::Sender<u64>,
    /// Cancellation flag of the in-flight run, if any.
    active: Mutex<Option<Arc<AtomicBool>>>,
}

impl MindMapOrchestrator {
    /// Create an orchestrator with explicit collaborators.
    pub fn new(
        config: MindMapConfig,
        provider: Arc<dyn RelationshipProvider>,
        cache: Arc<dyn LayoutCache>,
        tracker: Arc<dyn ChangeTracker>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let (progress_tx, _) = watch::channel(GenerationProgress::default());
        let (completion_tx, _) = broadcast::channel(16);
        let (revision_tx, _) = watch::channel(0u64);
        Ok(Self {
            config,
            graph: Arc::new(RwLock::new(MindMapGraph::new())),
            provider,
            cache,
            tracker,
            progress_tx,
            completion_tx,
            revision_tx,
            active: Mutex::new(None),
        })
    }

    /// Create an orchestrator wired to the in-process stubs.
    ///
    /// Useful for tests and demos; hosts inject real collaborators via
    /// [`MindMapOrchestrator::new`].
    pub fn with_stubs(config: MindMapConfig) -> EngineResult<Self> {
        Self::new(
            config,
            Arc::new(HeuristicRelationshipProvider::new()),
            Arc::new(InMemoryLayoutCache::new()),
            Arc::new(BasicChangeTracker::new()),
        )
    }

    pub fn config(&self) -> &MindMapConfig {
        &self.config
    }

    pub(crate) fn graph_lock(&self) -> &Arc<RwLock<MindMapGraph>> {
        &self.graph
    }

    pub(crate) fn cache(&self) -> &Arc<dyn LayoutCache> {
        &self.cache
    }

    pub(crate) fn tracker(&self) -> &Arc<dyn ChangeTracker> {
        &self.tracker
    }

    /// Clone the current graph state.
    pub async fn graph_snapshot(&self) -> MindMapGraph {
        self.graph.read().await.clone()
    }

    /// Observe generation progress.
    pub fn subscribe_progress(&self) -> watch::Receiver<GenerationProgress> {
        self.progress_tx.subscribe()
    }

    /// Last published progress observation.
    pub fn progress(&self) -> GenerationProgress {
        *self.progress_tx.borrow()
    }

    /// Fire-and-forget completion signal, emitted once per finished
    /// (non-provisional) generation.
    pub fn subscribe_completion(&self) -> broadcast::Receiver<()> {
        self.completion_tx.subscribe()
    }

    /// Monotonic revision counter, bumped after every committed graph
    /// mutation.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    /// Cooperatively cancel the in-flight generation, if any.
    pub async fn cancel(&self) {
        if let Some(flag) = self.active.lock().await.as_ref() {
            flag.store(true, Ordering::SeqCst);
        }
    }

    /// Whether the given run is still the registered in-flight one.
    ///
    /// A superseded run keeps executing until it observes its flag; it must
    /// not publish on the shared channels in that window, or it would
    /// clobber the successor's state.
    async fn is_current(&self, cancel: &Arc<AtomicBool>) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .map_or(false, |current| Arc::ptr_eq(current, cancel))
    }

    // ---------------------------------------------------------------------
    // Generation
    // ---------------------------------------------------------------------

    /// Run one generation over the given ordered item collection.
    ///
    /// Single-flight: any in-flight run is cancelled first. The call runs
    /// the pipeline in the caller's task; spawn it to keep a UI thread
    /// free.
    pub async fn generate(&self, items: &[CapturedItem]) -> EngineResult<GenerationOutcome> {
        let cancel = Arc::new(AtomicBool::new(false));
        {
            let mut active = self.active.lock().await;
            if let Some(previous) = active.replace(cancel.clone()) {
                previous.store(true, Ordering::SeqCst);
                debug!("cancelling in-flight generation");
            }
        }

        let outcome = self.run_pipeline(items, &cancel).await;

        // Deregister only if no newer run has taken over.
        let mut active = self.active.lock().await;
        if active
            .as_ref()
            .map_or(false, |current| Arc::ptr_eq(current, &cancel))
        {
            *active = None;
        }
        outcome
    }

    async fn run_pipeline(
        &self,
        items: &[CapturedItem],
        cancel: &Arc<AtomicBool>,
    ) -> EngineResult<GenerationOutcome> {
        let started_at = Utc::now();
        let key = fingerprint(items);
        info!(fingerprint = %key, items = items.len(), "starting generation");
        self.publish(cancel, GenerationState::Generating, GenerationStage::CacheCheck, 0.0)
            .await;

        // Stage 1: cache check.
        match self.cache.get(&key).await {
            Ok(Some(stored)) if stored.fingerprint == key => {
                if cancel.load(Ordering::SeqCst) {
                    return Ok(self.finish_cancelled(cancel, GenerationStage::CacheCheck).await);
                }
                return Ok(self
                    .finish_from_cache(items, stored, key, started_at, cancel)
                    .await);
            }
            Ok(stored) => {
                if stored.is_some() {
                    warn!(fingerprint = %key, "cached layout carries a foreign fingerprint; ignoring");
                } else {
                    debug!(fingerprint = %key, "cache miss");
                }
            }
            Err(e) => warn!(error = %e, "cache read failed; treating as miss"),
        }
        if cancel.load(Ordering::SeqCst) {
            return Ok(self.finish_cancelled(cancel, GenerationStage::CacheCheck).await);
        }

        // Cap input to a stable prefix; the physics cost is O(n²) per
        // iteration.
        let max_nodes = self.config.pipeline.max_nodes;
        let capped = &items[..items.len().min(max_nodes)];
        if capped.len() < items.len() {
            warn!(
                items = items.len(),
                cap = max_nodes,
                "truncating item collection for interactive layout"
            );
        }

        // Stage 2: provisional ring layout, published before the expensive
        // stages so the caller has something to show.
        let positions = self.config.rings.place(
            capped.len(),
            &self.config.bounds,
            self.config.pipeline.jitter_seed,
        );
        {
            let mut graph = self.graph.write().await;
            graph.clear();
            for (item, position) in capped.iter().zip(positions) {
                graph.add_node(MindMapNode::new(item.id, position, importance_for(item)));
            }
        }
        self.bump_revision();
        self.publish(cancel, GenerationState::Generating, GenerationStage::Provisional, 0.0)
            .await;
        if cancel.load(Ordering::SeqCst) {
            return Ok(self.finish_cancelled(cancel, GenerationStage::Provisional).await);
        }

        // Stage 3: relationship discovery. Failure and empty results are
        // non-fatal; the provisional layout stays.
        let relationships = match self.provider.discover(capped).await {
            Ok(relationships) => relationships,
            Err(e) => {
                warn!(error = %e, "relationship discovery failed; proceeding with zero connections");
                Vec::new()
            }
        };
        self.publish(
            cancel,
            GenerationState::Generating,
            GenerationStage::Discovery,
            GenerationStage::Discovery.completed_fraction(),
        )
        .await;
        if cancel.load(Ordering::SeqCst) {
            return Ok(self.finish_cancelled(cancel, GenerationStage::Discovery).await);
        }

        // Stage 4: node scores. The capped node set already exists at its
        // provisional positions; re-derive importance so late metadata edits
        // are reflected.
        {
            let mut graph = self.graph.write().await;
            for item in capped {
                if let Some(node) = graph.node_mut(&item.id) {
                    node.set_importance(importance_for(item));
                }
            }
        }
        self.bump_revision();
        self.publish(
            cancel,
            GenerationState::Generating,
            GenerationStage::Nodes,
            GenerationStage::Nodes.completed_fraction(),
        )
        .await;
        if cancel.load(Ordering::SeqCst) {
            return Ok(self.finish_cancelled(cancel, GenerationStage::Nodes).await);
        }

        // Stage 5: connections, capped to a stable prefix, endpoints
        // pre-filtered by the graph.
        let max_connections = self.config.pipeline.max_connections;
        let capped_relationships = &relationships[..relationships.len().min(max_connections)];
        if capped_relationships.len() < relationships.len() {
            warn!(
                discovered = relationships.len(),
                cap = max_connections,
                "truncating discovered relationships"
            );
        }
        {
            let mut graph = self.graph.write().await;
            let mut stored = 0usize;
            for rel in capped_relationships {
                let connection = Connection::new(
                    rel.source_id,
                    rel.target_id,
                    rel.relationship,
                    rel.strength,
                    rel.confidence,
                );
                if graph.add_connection(connection) {
                    stored += 1;
                }
            }
            debug!(
                stored,
                dropped = capped_relationships.len() - stored,
                "connections created"
            );
        }
        self.bump_revision();
        self.publish(
            cancel,
            GenerationState::Generating,
            GenerationStage::Connections,
            GenerationStage::Connections.completed_fraction(),
        )
        .await;
        if cancel.load(Ordering::SeqCst) {
            return Ok(self.finish_cancelled(cancel, GenerationStage::Connections).await);
        }

        // Stage 6: force layout on a working copy, synced with the live
        // graph at every yield boundary.
        let (iterations, converged) = match self.run_layout(cancel).await {
            Some(result) => result,
            None => return Ok(self.finish_cancelled(cancel, GenerationStage::Layout).await),
        };

        // Stage 7: clustering.
        {
            let mut graph = self.graph.write().await;
            let clusters = derive_clusters(&graph);
            graph.set_clusters(clusters);
        }
        self.bump_revision();
        self.publish(
            cancel,
            GenerationState::Generating,
            GenerationStage::Clustering,
            GenerationStage::Clustering.completed_fraction(),
        )
        .await;
        if cancel.load(Ordering::SeqCst) {
            return Ok(self.finish_cancelled(cancel, GenerationStage::Clustering).await);
        }

        // Stage 8: persistence. A write failure is logged, not fatal.
        let (stored, node_count, connection_count, cluster_count) = {
            let graph = self.graph.read().await;
            (
                StoredLayout::from_graph(key.clone(), &graph),
                graph.node_count(),
                graph.connection_count(),
                graph.clusters().len(),
            )
        };
        self.publish(cancel, GenerationState::Generating, GenerationStage::Persisting, 1.0)
            .await;
        if let Err(e) = self.cache.set(&key, stored).await {
            warn!(error = %e, "layout cache write failed; continuing");
        }

        self.publish(cancel, GenerationState::Converged, GenerationStage::Done, 1.0)
            .await;
        if self.is_current(cancel).await {
            let _ = self.completion_tx.send(());
        }

        let report = GenerationReport {
            fingerprint: key,
            node_count,
            connection_count,
            cluster_count,
            iterations,
            converged,
            cache_hit: false,
            started_at,
            ended_at: Utc::now(),
        };
        info!(
            nodes = report.node_count,
            connections = report.connection_count,
            clusters = report.cluster_count,
            iterations = report.iterations,
            converged = report.converged,
            "generation complete"
        );
        Ok(GenerationOutcome::Completed(report))
    }

    /// Drive the force simulation, returning `(iterations, converged)` or
    /// `None` on cancellation.
    async fn run_layout(&self, cancel: &Arc<AtomicBool>) -> Option<(usize, bool)> {
        let (node_table, connection_list) = {
            let graph = self.graph.read().await;
            (graph.node_table(), graph.connections().to_vec())
        };
        let engine = ForceDirectedLayout::new(self.config.layout, self.config.bounds);
        let mut sim = engine.simulation(node_table, connection_list);
        let cap = sim.cap().max(1);

        loop {
            for _ in 0..self.config.layout.yield_interval {
                // Polled inside the iteration loop, not only at stage
                // boundaries.
                if cancel.load(Ordering::SeqCst) {
                    return None;
                }
                sim.step();
                if sim.finished() {
                    break;
                }
            }

            self.sync_simulation(&mut sim).await;
            let fraction = 0.7 + 0.2 * (sim.iteration() as f32 / cap as f32).min(1.0);
            self.publish(cancel, GenerationState::Generating, GenerationStage::Layout, fraction)
                .await;

            if sim.finished() {
                break;
            }
            tokio::task::yield_now().await;
        }

        Some((sim.iteration(), sim.converged()))
    }

    /// Two-way sync between the working copy and the live graph.
    ///
    /// Non-dragging simulated positions are committed so observers see
    /// motion; dragging nodes' live positions flow into the simulation so
    /// an active drag acts as a force source at its externally-set
    /// position.
    async fn sync_simulation(&self, sim: &mut LayoutSimulation) {
        let mut graph = self.graph.write().await;

        let live_drag_states: Vec<(NodeId, Vec2, bool)> = graph
            .nodes()
            .map(|n| (n.id, n.position, n.dragging))
            .collect();

        let updates: Vec<(NodeId, Vec2, Vec2)> = sim
            .nodes()
            .values()
            .filter(|n| !n.dragging)
            .map(|n| (n.id, n.position, n.velocity))
            .collect();
        for (id, position, velocity) in updates {
            if let Some(live) = graph.node_mut(&id) {
                // Frozen-node semantics: a drag that started since the last
                // sync wins over the physics writer.
                if !live.dragging {
                    live.position = position;
                    live.velocity = velocity;
                }
            }
        }

        for (id, position, dragging) in live_drag_states {
            sim.set_dragging(&id, dragging);
            if dragging {
                // Position came from the live table, so it is already
                // finite; an error here would only mean the node left the
                // simulation.
                let _ = sim.set_node_position(&id, position);
            }
        }

        drop(graph);
        self.bump_revision();
    }

    /// Rebuild the graph from a cached layout. No discovery call is made on
    /// this path.
    async fn finish_from_cache(
        &self,
        items: &[CapturedItem],
        stored: StoredLayout,
        key: String,
        started_at: DateTime<Utc>,
        cancel: &Arc<AtomicBool>,
    ) -> GenerationOutcome {
        info!(fingerprint = %key, nodes = stored.nodes.len(), "cache hit; loading stored layout");

        let by_id: HashMap<NodeId, &CapturedItem> = items.iter().map(|i| (i.id, i)).collect();
        let (node_count, connection_count, cluster_count) = {
            let mut graph = self.graph.write().await;
            graph.clear();
            for snode in &stored.nodes {
                let position = Vec2::new(snode.x, snode.y);
                if !position.is_finite() {
                    warn!(node = %snode.id, "cached position non-finite; skipping node");
                    continue;
                }
                let importance = by_id.get(&snode.id).map_or(0.5, |item| importance_for(item));
                graph.add_node(MindMapNode::new(snode.id, position, importance));
            }
            for connection in &stored.connections {
                graph.add_connection(connection.clone());
            }
            let clusters = derive_clusters(&graph);
            graph.set_clusters(clusters);
            (
                graph.node_count(),
                graph.connection_count(),
                graph.clusters().len(),
            )
        };
        self.bump_revision();
        self.publish(cancel, GenerationState::Converged, GenerationStage::Done, 1.0)
            .await;
        if self.is_current(cancel).await {
            let _ = self.completion_tx.send(());
        }

        GenerationOutcome::Completed(GenerationReport {
            fingerprint: key,
            node_count,
            connection_count,
            cluster_count,
            iterations: 0,
            converged: true,
            cache_hit: true,
            started_at,
            ended_at: Utc::now(),
        })
    }

    async fn finish_cancelled(
        &self,
        cancel: &Arc<AtomicBool>,
        stage: GenerationStage,
    ) -> GenerationOutcome {
        info!(stage = ?stage, "generation cancelled; keeping last committed state");
        self.publish(
            cancel,
            GenerationState::Cancelled,
            stage,
            stage.completed_fraction(),
        )
        .await;
        GenerationOutcome::Cancelled
    }

    /// Publish a progress observation, but only while this run is still the
    /// registered one. A run cancelled by a successor stays silent so the
    /// successor's terminal state survives on the channel.
    async fn publish(
        &self,
        cancel: &Arc<AtomicBool>,
        state: GenerationState,
        stage: GenerationStage,
        fraction: f32,
    ) {
        if self.is_current(cancel).await {
            self.progress_tx.send_replace(GenerationProgress {
                state,
                stage,
                fraction,
            });
        }
    }

    pub(crate) fn bump_revision(&self) {
        self.revision_tx.send_modify(|revision| *revision += 1);
    }
}
