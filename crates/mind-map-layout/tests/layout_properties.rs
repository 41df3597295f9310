//! Property tests for the layout engine run end to end.

use std::collections::HashMap;

use mind_map_core::geometry::{Bounds, Vec2};
use mind_map_core::types::{Connection, MindMapNode, NodeId, RelationshipType};
use mind_map_layout::{ForceDirectedLayout, LayoutParams, RingLayout};
use std::sync::atomic::AtomicBool;
use uuid::Uuid;

fn node_at(x: f32, y: f32) -> MindMapNode {
    MindMapNode::new(Uuid::new_v4(), Vec2::new(x, y), 0.5)
}

fn table(nodes: Vec<MindMapNode>) -> HashMap<NodeId, MindMapNode> {
    nodes.into_iter().map(|n| (n.id, n)).collect()
}

/// A 5-node path graph (4 connections) near its rest configuration must
/// reach mean velocity below the threshold at or before the iteration cap.
#[tokio::test]
async fn path_graph_converges_within_cap() {
    let nodes: Vec<MindMapNode> = (0..5)
        .map(|i| node_at(200.0 + 90.0 * i as f32, 400.0))
        .collect();
    let connections: Vec<Connection> = nodes
        .windows(2)
        .map(|pair| {
            Connection::new(
                pair[0].id,
                pair[1].id,
                RelationshipType::Semantic,
                0.4,
                0.8,
            )
        })
        .collect();
    assert_eq!(connections.len(), 4);

    let engine = ForceDirectedLayout::new(LayoutParams::default(), Bounds::default());
    let cap = engine.params().iteration_cap(5);
    let cancel = AtomicBool::new(false);

    let outcome = engine.run(table(nodes), connections, &cancel).await;

    assert!(outcome.converged, "path graph must settle below the threshold");
    assert!(
        outcome.iterations <= cap,
        "must stop at or before the cap: {} > {}",
        outcome.iterations,
        cap
    );
}

/// After every full run, every position and velocity component is finite.
#[tokio::test]
async fn full_run_preserves_numeric_safety() {
    let rings = RingLayout::default();
    let bounds = Bounds::default();
    let positions = rings.place(20, &bounds, 99);

    let nodes: Vec<MindMapNode> = positions
        .into_iter()
        .enumerate()
        .map(|(i, p)| MindMapNode::new(Uuid::new_v4(), p, (i as f32) / 20.0))
        .collect();
    let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
    let connections: Vec<Connection> = (0..15)
        .map(|i| {
            Connection::new(
                ids[i],
                ids[(i + 3) % 20],
                RelationshipType::Tag,
                0.2 + 0.05 * i as f32,
                0.5,
            )
        })
        .collect();

    let engine = ForceDirectedLayout::new(LayoutParams::default(), bounds);
    let cancel = AtomicBool::new(false);
    let outcome = engine.run(table(nodes), connections, &cancel).await;

    assert!(outcome.iterations > 0);
    for node in outcome.nodes.values() {
        assert!(
            node.position.is_finite() && node.velocity.is_finite(),
            "node {} left with non-finite state",
            node.id
        );
        assert!(bounds.contains(node.position));
    }
}

/// The engine retains no cross-call state: running the same input twice
/// yields the same output.
#[tokio::test]
async fn engine_is_stateless_between_calls() {
    let nodes: Vec<MindMapNode> = (0..6)
        .map(|i| node_at(300.0 + 40.0 * i as f32, 300.0))
        .collect();
    let connections = vec![Connection::new(
        nodes[0].id,
        nodes[5].id,
        RelationshipType::Temporal,
        0.9,
        0.9,
    )];

    let engine = ForceDirectedLayout::new(LayoutParams::default(), Bounds::default());
    let cancel = AtomicBool::new(false);

    let first = engine
        .run(table(nodes.clone()), connections.clone(), &cancel)
        .await;
    let second = engine.run(table(nodes), connections, &cancel).await;

    assert_eq!(first.iterations, second.iterations);
    for (id, node) in &first.nodes {
        assert_eq!(node.position, second.nodes[id].position);
    }
}
