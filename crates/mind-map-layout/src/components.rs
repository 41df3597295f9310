//! Connected-component search over the connection graph.
//!
//! ITERATIVE depth-first search with an explicit `Vec` stack — no recursion,
//! so component depth can never overflow the call stack.

use std::collections::{HashMap, HashSet};

use mind_map_core::types::{Connection, NodeId};

/// Find all connected components among `node_ids` under `connections`.
///
/// Connections are treated as undirected; endpoints outside `node_ids` are
/// ignored. Output is deterministic: components are discovered in sorted
/// node-id order and each component's members are sorted. Singletons are
/// included; callers that only want clusters filter by size.
pub fn connected_components(
    node_ids: &[NodeId],
    connections: &[Connection],
) -> Vec<Vec<NodeId>> {
    let in_graph: HashSet<NodeId> = node_ids.iter().copied().collect();

    let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::with_capacity(node_ids.len());
    for c in connections {
        if in_graph.contains(&c.source_id) && in_graph.contains(&c.target_id) {
            adjacency.entry(c.source_id).or_default().push(c.target_id);
            adjacency.entry(c.target_id).or_default().push(c.source_id);
        }
    }

    let mut ordered: Vec<NodeId> = node_ids.to_vec();
    ordered.sort();
    ordered.dedup();

    let mut visited: HashSet<NodeId> = HashSet::with_capacity(ordered.len());
    let mut components = Vec::new();

    for &start in &ordered {
        if visited.contains(&start) {
            continue;
        }

        // Explicit stack, not recursion.
        let mut stack: Vec<NodeId> = vec![start];
        let mut members: Vec<NodeId> = Vec::new();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            members.push(current);

            if let Some(neighbors) = adjacency.get(&current) {
                for &neighbor in neighbors {
                    if !visited.contains(&neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
        }

        members.sort();
        components.push(members);
    }

    components
}
