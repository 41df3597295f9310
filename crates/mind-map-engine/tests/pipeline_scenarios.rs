//! End-to-end pipeline scenarios driven through the orchestrator with mock
//! collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use mind_map_core::geometry::Vec2;
use mind_map_core::stubs::{BasicChangeTracker, FileLayoutCache, InMemoryLayoutCache};
use mind_map_core::traits::{
    ChangeEvent, DiscoveredRelationship, LayoutCache, RelationshipProvider, StoredLayout,
};
use mind_map_core::types::{CapturedItem, RelationshipType};
use mind_map_core::{fingerprint, CoreResult};
use mind_map_engine::{GenerationState, MindMapConfig, MindMapOrchestrator};

/// Provider returning a fixed relationship list, counting invocations.
struct CountingProvider {
    relationships: Vec<DiscoveredRelationship>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    delay_first_call_only: bool,
}

impl CountingProvider {
    fn new(relationships: Vec<DiscoveredRelationship>) -> Self {
        Self {
            relationships,
            calls: AtomicUsize::new(0),
            delay: None,
            delay_first_call_only: false,
        }
    }

    fn slow(relationships: Vec<DiscoveredRelationship>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(relationships)
        }
    }

    /// Delays only the first discovery call, so a superseding run can
    /// finish while the superseded one is still asleep.
    fn slow_first(relationships: Vec<DiscoveredRelationship>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            delay_first_call_only: true,
            ..Self::new(relationships)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationshipProvider for CountingProvider {
    async fn discover(&self, _items: &[CapturedItem]) -> CoreResult<Vec<DiscoveredRelationship>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            if !self.delay_first_call_only || call == 0 {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(self.relationships.clone())
    }
}

fn items(count: usize) -> Vec<CapturedItem> {
    (0..count)
        .map(|i| {
            CapturedItem::new(
                Some(format!("captured note number {i}")),
                vec![format!("tag-{}", i % 4)],
            )
        })
        .collect()
}

/// One relationship per adjacent item pair: (0,1), (1,2), …
fn chain_relationships(items: &[CapturedItem], count: usize) -> Vec<DiscoveredRelationship> {
    (0..count)
        .map(|i| DiscoveredRelationship {
            source_id: items[i].id,
            target_id: items[i + 1].id,
            relationship: RelationshipType::Semantic,
            strength: 0.6,
            confidence: 0.8,
        })
        .collect()
}

fn orchestrator_with_cache(
    provider: Arc<CountingProvider>,
    cache: Arc<dyn LayoutCache>,
) -> MindMapOrchestrator {
    MindMapOrchestrator::new(
        MindMapConfig::default(),
        provider,
        cache,
        Arc::new(BasicChangeTracker::new()),
    )
    .unwrap()
}

fn orchestrator_with(
    provider: Arc<CountingProvider>,
    cache: Arc<InMemoryLayoutCache>,
) -> MindMapOrchestrator {
    orchestrator_with_cache(provider, cache)
}

#[tokio::test]
async fn full_generation_produces_expected_counts_and_caches() {
    let items = items(20);
    let provider = Arc::new(CountingProvider::new(chain_relationships(&items, 15)));
    let cache = Arc::new(InMemoryLayoutCache::new());
    let orchestrator = orchestrator_with(provider.clone(), cache.clone());

    let outcome = orchestrator.generate(&items).await.unwrap();
    let report = outcome.report().expect("uncancelled run must complete");

    assert_eq!(report.node_count, 20);
    assert_eq!(report.connection_count, 15);
    assert!(!report.cache_hit);
    assert!(report.iterations > 0);
    assert_eq!(provider.calls(), 1);

    let progress = orchestrator.progress();
    assert_eq!(progress.state, GenerationState::Converged);
    assert_eq!(progress.fraction, 1.0);

    let graph = orchestrator.graph_snapshot().await;
    graph.verify_integrity().unwrap();
    for node in graph.nodes() {
        assert!(node.position.is_finite());
    }

    // The persisted record must match the final graph exactly.
    let key = fingerprint(&items);
    assert_eq!(report.fingerprint, key);
    let stored = cache.get(&key).await.unwrap().expect("layout must be cached");
    assert_eq!(stored, StoredLayout::from_graph(key, &graph));
}

#[tokio::test]
async fn rerun_with_unchanged_items_hits_the_cache() {
    let items = items(12);
    let provider = Arc::new(CountingProvider::new(chain_relationships(&items, 8)));
    let cache = Arc::new(InMemoryLayoutCache::new());
    let orchestrator = orchestrator_with(provider.clone(), cache.clone());

    let first = orchestrator.generate(&items).await.unwrap();
    let first_graph = orchestrator.graph_snapshot().await;
    assert!(!first.report().unwrap().cache_hit);
    assert_eq!(provider.calls(), 1);

    let second = orchestrator.generate(&items).await.unwrap();
    let report = second.report().unwrap();
    assert!(report.cache_hit, "unchanged collection must be a cache hit");
    assert_eq!(report.iterations, 0);
    assert_eq!(provider.calls(), 1, "cache hit must skip discovery");

    // Positions must survive the round trip exactly.
    let second_graph = orchestrator.graph_snapshot().await;
    assert_eq!(second_graph.node_count(), first_graph.node_count());
    for node in first_graph.nodes() {
        let restored = second_graph.node(&node.id).expect("node must be restored");
        assert_eq!(restored.position, node.position);
    }
    assert_eq!(orchestrator.progress().fraction, 1.0);
}

#[tokio::test]
async fn edited_item_changes_fingerprint_and_forces_regeneration() {
    let mut items = items(10);
    let provider = Arc::new(CountingProvider::new(chain_relationships(&items, 5)));
    let cache = Arc::new(InMemoryLayoutCache::new());
    let orchestrator = orchestrator_with(provider.clone(), cache.clone());

    let first = orchestrator.generate(&items).await.unwrap();
    let first_key = first.report().unwrap().fingerprint.clone();

    items[0].text = Some("edited annotation".to_string());
    let second = orchestrator.generate(&items).await.unwrap();
    let report = second.report().unwrap();

    assert_ne!(report.fingerprint, first_key);
    assert!(!report.cache_hit, "edited collection must miss the cache");
    assert_eq!(provider.calls(), 2, "discovery must run again after an edit");
}

#[tokio::test]
async fn new_generation_cancels_the_inflight_one() {
    let first_items = items(10);
    let second_items = items(10);
    let provider = Arc::new(CountingProvider::slow(vec![], Duration::from_millis(200)));
    let cache = Arc::new(InMemoryLayoutCache::new());
    let orchestrator = Arc::new(orchestrator_with(provider.clone(), cache.clone()));

    let background = {
        let orchestrator = orchestrator.clone();
        let items = first_items.clone();
        tokio::spawn(async move { orchestrator.generate(&items).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = orchestrator.generate(&second_items).await.unwrap();
    let first = background.await.unwrap().unwrap();

    assert!(first.is_cancelled(), "superseded run must report cancellation");
    assert!(!second.is_cancelled());

    // A cancelled run persists nothing.
    let first_key = fingerprint(&first_items);
    assert!(cache.get(&first_key).await.unwrap().is_none());
    assert!(cache
        .get(&fingerprint(&second_items))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn superseded_run_leaves_the_successors_terminal_progress_intact() {
    let first_items = items(6);
    let second_items = items(6);
    // Only the first run sleeps in discovery; the successor finishes while
    // the superseded run is still asleep.
    let provider = Arc::new(CountingProvider::slow_first(
        vec![],
        Duration::from_millis(400),
    ));
    let orchestrator = Arc::new(orchestrator_with(
        provider,
        Arc::new(InMemoryLayoutCache::new()),
    ));

    let background = {
        let orchestrator = orchestrator.clone();
        let items = first_items.clone();
        tokio::spawn(async move { orchestrator.generate(&items).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = orchestrator.generate(&second_items).await.unwrap();
    assert!(!second.is_cancelled());
    assert_eq!(orchestrator.progress().state, GenerationState::Converged);

    // The first run wakes long after the second completed; it must not
    // republish over the terminal state.
    let first = background.await.unwrap().unwrap();
    assert!(first.is_cancelled());

    let progress = orchestrator.progress();
    assert_eq!(
        progress.state,
        GenerationState::Converged,
        "a superseded run must stay silent on the progress channel"
    );
    assert_eq!(progress.fraction, 1.0);
}

#[tokio::test]
async fn explicit_cancel_publishes_the_cancelled_state() {
    let items = items(6);
    let provider = Arc::new(CountingProvider::slow(vec![], Duration::from_millis(200)));
    let orchestrator = Arc::new(orchestrator_with(
        provider,
        Arc::new(InMemoryLayoutCache::new()),
    ));

    let background = {
        let orchestrator = orchestrator.clone();
        let items = items.clone();
        tokio::spawn(async move { orchestrator.generate(&items).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    orchestrator.cancel().await;

    let outcome = background.await.unwrap().unwrap();
    assert!(outcome.is_cancelled());
    // No successor took over, so the cancelled state is the observable one.
    assert_eq!(orchestrator.progress().state, GenerationState::Cancelled);
}

#[test]
fn constructor_rejects_invalid_ring_config() {
    let mut config = MindMapConfig::default();
    config.rings.jitter = -1.0;
    let result = MindMapOrchestrator::new(
        config,
        Arc::new(CountingProvider::new(vec![])),
        Arc::new(InMemoryLayoutCache::new()),
        Arc::new(BasicChangeTracker::new()),
    );
    assert!(
        result.is_err(),
        "a negative ring jitter must be rejected before any generation runs"
    );
}

#[tokio::test]
async fn oversized_collection_is_truncated_to_the_node_cap() {
    let items = items(30);
    let provider = Arc::new(CountingProvider::new(vec![]));
    let cache = Arc::new(InMemoryLayoutCache::new());
    let orchestrator = orchestrator_with(provider, cache);

    let outcome = orchestrator.generate(&items).await.unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.node_count, 20, "node count must be capped");
    let graph = orchestrator.graph_snapshot().await;
    // The cap keeps a stable prefix of the ordered collection.
    for item in &items[..20] {
        assert!(graph.contains_node(&item.id));
    }
    for item in &items[20..] {
        assert!(!graph.contains_node(&item.id));
    }
}

#[tokio::test]
async fn discovered_relationships_are_capped_at_fifty() {
    let items = items(20);
    let mut relationships = Vec::new();
    'outer: for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            relationships.push(DiscoveredRelationship {
                source_id: items[i].id,
                target_id: items[j].id,
                relationship: RelationshipType::Tag,
                strength: 0.5,
                confidence: 0.7,
            });
            if relationships.len() == 60 {
                break 'outer;
            }
        }
    }
    let provider = Arc::new(CountingProvider::new(relationships));
    let orchestrator = orchestrator_with(provider, Arc::new(InMemoryLayoutCache::new()));

    let outcome = orchestrator.generate(&items).await.unwrap();
    assert_eq!(outcome.report().unwrap().connection_count, 50);
}

#[tokio::test]
async fn selection_is_exclusive_and_reports_neighbors() {
    let items = items(5);
    let provider = Arc::new(CountingProvider::new(chain_relationships(&items, 4)));
    let orchestrator = orchestrator_with(provider, Arc::new(InMemoryLayoutCache::new()));
    orchestrator.generate(&items).await.unwrap();

    // items[1] sits in the middle of the chain: neighbors are 0 and 2.
    let selection = orchestrator
        .select(Some(items[1].id))
        .await
        .unwrap()
        .expect("selecting an existing node must return a selection");
    assert_eq!(selection.selected, items[1].id);
    let mut neighbors = selection.neighbors;
    neighbors.sort();
    let mut expected = vec![items[0].id, items[2].id];
    expected.sort();
    assert_eq!(neighbors, expected);

    // Selecting another node displaces the first.
    orchestrator.select(Some(items[3].id)).await.unwrap();
    let graph = orchestrator.graph_snapshot().await;
    let selected: Vec<_> = graph.nodes().filter(|n| n.selected).collect();
    assert_eq!(selected.len(), 1, "selection must be exclusive");
    assert_eq!(selected[0].id, items[3].id);

    // Clearing.
    assert!(orchestrator.select(None).await.unwrap().is_none());
    assert!(orchestrator.selection().await.is_none());

    // Unknown node.
    assert!(orchestrator.select(Some(uuid::Uuid::new_v4())).await.is_err());
}

#[tokio::test]
async fn drag_api_freezes_moves_and_releases() {
    let items = items(4);
    let provider = Arc::new(CountingProvider::new(vec![]));
    let orchestrator = orchestrator_with(provider, Arc::new(InMemoryLayoutCache::new()));
    orchestrator.generate(&items).await.unwrap();

    let id = items[0].id;
    orchestrator.start_drag(&id).await.unwrap();
    orchestrator
        .update_drag_position(&id, Vec2::new(321.0, 123.0))
        .await
        .unwrap();

    let graph = orchestrator.graph_snapshot().await;
    let node = graph.node(&id).unwrap();
    assert!(node.dragging);
    assert_eq!(node.position, Vec2::new(321.0, 123.0));
    assert_eq!(node.velocity, Vec2::ZERO);

    // Non-finite drag positions are rejected outright.
    assert!(orchestrator
        .update_drag_position(&id, Vec2::new(f32::NAN, 0.0))
        .await
        .is_err());

    orchestrator.end_drag(&id).await.unwrap();
    let graph = orchestrator.graph_snapshot().await;
    assert!(!graph.node(&id).unwrap().dragging);

    // Unknown node.
    assert!(orchestrator.start_drag(&uuid::Uuid::new_v4()).await.is_err());
}

#[tokio::test]
async fn deletion_event_removes_the_node_and_invalidates_the_cache() {
    let items = items(6);
    let provider = Arc::new(CountingProvider::new(chain_relationships(&items, 5)));
    let cache = Arc::new(InMemoryLayoutCache::new());
    let orchestrator = orchestrator_with(provider, cache.clone());

    let report = orchestrator.generate(&items).await.unwrap();
    let key = report.report().unwrap().fingerprint.clone();
    assert!(cache.get(&key).await.unwrap().is_some());

    let deleted = items[2].id;
    orchestrator
        .apply_change(&ChangeEvent::ItemDeleted { id: deleted })
        .await
        .unwrap();

    let graph = orchestrator.graph_snapshot().await;
    assert!(!graph.contains_node(&deleted));
    assert_eq!(graph.node_count(), 5);
    graph.verify_integrity().unwrap();
    assert!(
        cache.get(&key).await.unwrap().is_none(),
        "layouts containing the deleted node must be invalidated"
    );
}

#[tokio::test]
async fn mutations_publish_revision_bumps() {
    let items = items(3);
    let provider = Arc::new(CountingProvider::new(vec![]));
    let orchestrator = orchestrator_with(provider, Arc::new(InMemoryLayoutCache::new()));

    let revisions = orchestrator.subscribe_changes();
    assert_eq!(*revisions.borrow(), 0);

    orchestrator.generate(&items).await.unwrap();
    let after_generate = *revisions.borrow();
    assert!(after_generate > 0, "generation must bump the revision counter");

    orchestrator.select(Some(items[0].id)).await.unwrap();
    assert!(*revisions.borrow() > after_generate);
}

#[tokio::test]
async fn completion_signal_fires_once_per_finished_generation() {
    let items = items(4);
    let provider = Arc::new(CountingProvider::new(vec![]));
    let orchestrator = orchestrator_with(provider, Arc::new(InMemoryLayoutCache::new()));

    let mut completions = orchestrator.subscribe_completion();
    orchestrator.generate(&items).await.unwrap();
    completions
        .try_recv()
        .expect("a finished generation must signal completion");
    assert!(completions.try_recv().is_err(), "exactly one signal per run");
}

#[tokio::test]
async fn file_cache_survives_an_orchestrator_restart() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = tempfile::tempdir().unwrap();
    let items = items(8);

    let first_graph = {
        let provider = Arc::new(CountingProvider::new(chain_relationships(&items, 6)));
        let cache = Arc::new(FileLayoutCache::new(dir.path()).unwrap());
        let orchestrator = orchestrator_with_cache(provider, cache);
        orchestrator.generate(&items).await.unwrap();
        orchestrator.graph_snapshot().await
    };

    // A fresh orchestrator over the same cache directory: the layout must be
    // served from disk without a discovery call.
    let provider = Arc::new(CountingProvider::new(vec![]));
    let cache = Arc::new(FileLayoutCache::new(dir.path()).unwrap());
    let orchestrator = orchestrator_with_cache(provider.clone(), cache);

    let outcome = orchestrator.generate(&items).await.unwrap();
    assert!(outcome.report().unwrap().cache_hit);
    assert_eq!(provider.calls(), 0);

    let restored = orchestrator.graph_snapshot().await;
    assert_eq!(restored.node_count(), first_graph.node_count());
    for node in first_graph.nodes() {
        assert_eq!(restored.node(&node.id).unwrap().position, node.position);
    }
}

#[tokio::test]
async fn empty_collection_yields_an_empty_converged_graph() {
    let provider = Arc::new(CountingProvider::new(vec![]));
    let orchestrator = orchestrator_with(provider, Arc::new(InMemoryLayoutCache::new()));

    let outcome = orchestrator.generate(&[]).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.node_count, 0);
    assert_eq!(report.connection_count, 0);
    assert_eq!(orchestrator.progress().fraction, 1.0);
    assert!(orchestrator.graph_snapshot().await.is_empty());
}
