use std::time::Instant;

use geo::Coord;
use log::debug;

use super::dijkstra::shortest_path;
use super::nearest_node;
use crate::{RoadGraph, Route};

/// Shortest route between two `(lon, lat)` coordinates over unblocked edges.
///
/// Both coordinates snap to their nearest node. Returns `None` when no edge
/// is walkable or the two nodes are not connected by unblocked edges.
pub fn find_route(graph: &RoadGraph, start: Coord<f64>, end: Coord<f64>) -> Option<Route> {
    let blocked_edges_count = graph.blocked_count();
    if blocked_edges_count == graph.edge_count() {
        debug!(
            "No walkable edges ({} of {} blocked)",
            blocked_edges_count,
            graph.edge_count()
        );
        return None;
    }

    let started = Instant::now();

    let (start_node, start_offset) = nearest_node(graph, start)?;
    let (end_node, end_offset) = nearest_node(graph, end)?;
    debug!(
        "Snapped start to node {} ({start_offset:.1} m), end to node {} ({end_offset:.1} m)",
        start_node.index(),
        end_node.index()
    );

    let path = shortest_path(graph, start_node, end_node)?;
    let calc_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    let coordinates: Vec<Coord<f64>> = path
        .nodes
        .iter()
        .filter_map(|&idx| graph.node_coord(idx))
        .collect();

    Some(Route {
        segments: path.nodes.len() - 1,
        coordinates,
        length_m: path.length_m,
        blocked_edges_count,
        calc_time_ms,
    })
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use super::*;
    use crate::{EvacConfig, RoadLine, build_road_graph};

    fn c(x: f64, y: f64) -> Coord<f64> {
        coord! { x: x, y: y }
    }

    fn corridor() -> RoadGraph {
        let line = RoadLine::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.001, y: 0.0 },
            coord! { x: 0.002, y: 0.0 },
        ]);
        build_road_graph(&[line], &EvacConfig::default())
    }

    #[test]
    fn route_follows_corridor() {
        let graph = corridor();
        let route = find_route(&graph, c(-0.0001, 0.0), c(0.0021, 0.0)).unwrap();

        assert_eq!(route.segments, 2);
        assert_eq!(route.coordinates.len(), 3);
        assert_eq!(route.coordinates[0], coord! { x: 0.0, y: 0.0 });
        assert_eq!(route.blocked_edges_count, 0);
        let total: f64 = graph.edge_weights().map(|e| e.length_m).sum();
        assert!((route.length_m - total).abs() < 1e-9);
        assert!(route.calc_time_ms >= 0.0);
    }

    #[test]
    fn same_node_gives_trivial_route() {
        let graph = corridor();
        let route = find_route(&graph, c(0.001, 0.0), c(0.001, 0.000_01)).unwrap();

        assert!(route.is_trivial());
        assert_eq!(route.coordinates.len(), 1);
        assert_eq!(route.length_m, 0.0);
    }

    #[test]
    fn fully_blocked_network_has_no_route() {
        let mut graph = corridor();
        for idx in graph.edge_indices().collect::<Vec<_>>() {
            graph.set_blocked(idx, true);
        }
        assert!(find_route(&graph, c(0.0, 0.0), c(0.002, 0.0)).is_none());
    }

    #[test]
    fn empty_graph_has_no_route() {
        assert!(find_route(&RoadGraph::default(), c(0.0, 0.0), c(1.0, 1.0)).is_none());
    }
}
