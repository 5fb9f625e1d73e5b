//! Shortest path over the unblocked part of the road graph

mod state;

use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::{Meters, RoadGraph};
use state::State;

/// Path found by [`shortest_path`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodePath {
    /// Visited nodes, `start` first and `target` last
    pub nodes: Vec<NodeIndex>,
    /// Sum of `length_m` over traversed edges
    pub length_m: Meters,
}

/// Dijkstra's algorithm from `start` to `target` weighted by edge length.
/// Blocked edges are not traversed. Returns `None` if `target` is unreachable.
pub(crate) fn shortest_path(
    graph: &RoadGraph,
    start: NodeIndex,
    target: NodeIndex,
) -> Option<NodePath> {
    let node_count = graph.node_count();
    if start.index() >= node_count || target.index() >= node_count {
        return None;
    }

    let estimated_nodes = node_count.min(1000);
    let mut distances: HashMap<NodeIndex, Meters> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut settled = FixedBitSet::with_capacity(node_count);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            break;
        }

        // Stale heap entry
        if settled.put(node.index()) {
            continue;
        }

        for edge in graph.edges(node) {
            if edge.weight().blocked {
                continue;
            }

            let next = edge.target();
            if settled.contains(next.index()) {
                continue;
            }
            let next_cost = cost + edge.weight().length_m;

            match distances.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    predecessors.insert(next, node);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        predecessors.insert(next, node);
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    let length_m = *distances.get(&target)?;

    // Follow predecessors backward from target to start
    let mut nodes = vec![target];
    let mut current = target;
    while current != start {
        current = *predecessors.get(&current)?;
        nodes.push(current);
    }
    nodes.reverse();

    Some(NodePath { nodes, length_m })
}
