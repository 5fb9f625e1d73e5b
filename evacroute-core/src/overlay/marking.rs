use geo::Rect;
use log::{debug, info};
use petgraph::graph::EdgeIndex;
use rayon::prelude::*;

use super::{FloodIndex, overlap_fraction};
use crate::{FloodPolygon, RoadEdge, RoadGraph};

/// Absorbs rounding in computed crossing points, so an edge whose overlap
/// equals the threshold on paper is blocked
const RATIO_TOLERANCE: f64 = 1e-9;

/// Recomputes the `blocked` flag of every edge in `graph`.
///
/// An edge is blocked when the share of it lying inside a single flood
/// polygon is at least `ratio`. Flags left by a previous pass are cleared
/// first, so the result depends only on `floods`. Returns the number of
/// blocked edges.
pub fn mark_blocked(graph: &mut RoadGraph, floods: &[FloodPolygon], ratio: f64) -> usize {
    for edge in graph.edge_weights_mut() {
        edge.blocked = false;
    }

    if floods.is_empty() {
        debug!("No flood polygons, all {} edges open", graph.edge_count());
        return 0;
    }

    let index = FloodIndex::new(floods);
    let edges: Vec<EdgeIndex> = graph.edge_indices().collect();

    // Evaluate against the unchanged graph, apply afterwards
    let flooded: Vec<EdgeIndex> = edges
        .into_par_iter()
        .filter(|&idx| {
            graph
                .edge(idx)
                .is_some_and(|edge| reaches_ratio(edge, &index, ratio))
        })
        .collect();

    for &idx in &flooded {
        graph.set_blocked(idx, true);
    }

    info!(
        "Flood overlay: {} of {} edges blocked by {} polygons (ratio {ratio})",
        flooded.len(),
        graph.edge_count(),
        index.len()
    );

    flooded.len()
}

fn reaches_ratio(edge: &RoadEdge, index: &FloodIndex<'_>, ratio: f64) -> bool {
    if !edge.has_extent() {
        return false;
    }
    let (Some(&from), Some(&to)) = (edge.geometry.0.first(), edge.geometry.0.last()) else {
        return false;
    };

    let mut max_fraction: f64 = 0.0;
    for flood in index.candidates(Rect::new(from, to)) {
        max_fraction = max_fraction.max(overlap_fraction(from, to, &flood.geometry));
        if max_fraction + RATIO_TOLERANCE >= ratio {
            return true;
        }
    }

    false
}
