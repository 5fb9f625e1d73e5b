use geo::Coord;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use crate::geodesy::haversine_distance_m;
use crate::{Meters, RoadGraph};

/// Closest node to `coord` by great-circle distance, with its distance.
///
/// Every node is scanned. Equal distances resolve to the lower node index,
/// so the parallel scan agrees with a sequential one.
pub fn nearest_node(graph: &RoadGraph, coord: Coord<f64>) -> Option<(NodeIndex, Meters)> {
    (0..graph.node_count())
        .into_par_iter()
        .map(NodeIndex::new)
        .map(|idx| (idx, haversine_distance_m(coord, graph.graph[idx].geometry.into())))
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
}
