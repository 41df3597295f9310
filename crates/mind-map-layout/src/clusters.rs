//! Cluster derivation from connected components.

use tracing::debug;

use mind_map_core::geometry::Vec2;
use mind_map_core::types::cluster::MIN_CLUSTER_SIZE;
use mind_map_core::types::Cluster;
use mind_map_core::MindMapGraph;

use crate::components::connected_components;

/// Fixed margin added to the farthest-member distance for the cluster
/// bounding radius.
pub const CLUSTER_RADIUS_MARGIN: f32 = 30.0;

/// Derive clusters from a graph's current nodes and connections.
///
/// Each retained cluster is one connected component of size >=
/// [`MIN_CLUSTER_SIZE`] with:
/// - centroid: mean member position,
/// - radius: max member distance from the centroid + [`CLUSTER_RADIUS_MARGIN`],
/// - importance: member count / total node count.
///
/// Singleton components are excluded. Clusters are recomputed wholesale on
/// every pipeline run.
pub fn derive_clusters(graph: &MindMapGraph) -> Vec<Cluster> {
    let node_ids: Vec<_> = graph.nodes().map(|n| n.id).collect();
    let total = node_ids.len();
    if total == 0 {
        return Vec::new();
    }

    let clusters: Vec<Cluster> = connected_components(&node_ids, graph.connections())
        .into_iter()
        .filter(|members| members.len() >= MIN_CLUSTER_SIZE)
        .map(|members| {
            let positions: Vec<Vec2> = members
                .iter()
                .filter_map(|id| graph.node(id))
                .map(|n| n.position)
                .collect();

            let mut centroid = Vec2::ZERO;
            for p in &positions {
                centroid += *p;
            }
            centroid = centroid / positions.len() as f32;

            let max_distance = positions
                .iter()
                .map(|p| p.distance(centroid))
                .fold(0.0_f32, f32::max);

            Cluster {
                importance: members.len() as f32 / total as f32,
                node_ids: members,
                centroid,
                radius: max_distance + CLUSTER_RADIUS_MARGIN,
            }
        })
        .collect();

    debug!(
        clusters = clusters.len(),
        nodes = total,
        "derived clusters from connected components"
    );
    clusters
}
