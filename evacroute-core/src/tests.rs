//! End-to-end behaviour of graph building, flood overlay and routing

use std::sync::Arc;
use std::thread;

use geo::{Coord, coord};
use petgraph::graph::NodeIndex;

use crate::prelude::*;
use crate::RoadEdge;

fn c(x: f64, y: f64) -> Coord<f64> {
    coord! { x: x, y: y }
}

fn rect(min: (f64, f64), max: (f64, f64)) -> FloodPolygon {
    FloodPolygon::rectangle(c(min.0, min.1), c(max.0, max.1))
}

/// Two nodes joined by one edge along the equator, `~111 m` long
fn single_edge_graph() -> RoadGraph {
    build_road_graph(
        &[RoadLine::new(vec![c(0.0, 0.0), c(0.001, 0.0)])],
        &EvacConfig::default(),
    )
}

/// Road lines of a `cols x rows` lattice with `step` degrees between neighbours
fn grid_lines(cols: usize, rows: usize, step: f64) -> Vec<RoadLine> {
    let mut lines = Vec::new();
    for row in 0..rows {
        let y = row as f64 * step;
        lines.push(RoadLine::new(
            (0..cols).map(|col| c(col as f64 * step, y)).collect(),
        ));
    }
    for col in 0..cols {
        let x = col as f64 * step;
        lines.push(RoadLine::new(
            (0..rows).map(|row| c(x, row as f64 * step)).collect(),
        ));
    }
    lines
}

fn grid(cols: usize, rows: usize, step: f64) -> RoadGraph {
    build_road_graph(&grid_lines(cols, rows, step), &EvacConfig::default())
}

fn edge_length_sum(graph: &RoadGraph, route: &Route) -> f64 {
    route
        .coordinates
        .windows(2)
        .map(|pair| {
            let a = graph.node_at(pair[0]).unwrap();
            let b = graph.node_at(pair[1]).unwrap();
            let idx = graph.find_edge(a, b).unwrap();
            graph.edge(idx).unwrap().length_m
        })
        .sum()
}

#[test]
fn scenario_a_flooded_edge_blocks_the_only_route() {
    let mut graph = single_edge_graph();
    // Covers the eastern 60% of the edge
    let floods = vec![rect((0.0004, -0.0005), (0.0015, 0.0005))];

    assert_eq!(mark_blocked(&mut graph, &floods, 0.2), 1);
    assert!(find_route(&graph, c(0.0, 0.0), c(0.001, 0.0)).is_none());
}

#[test]
fn scenario_b_shallow_flood_leaves_edge_open() {
    let mut graph = single_edge_graph();
    let length = graph.edge_weights().next().unwrap().length_m;
    // Covers the eastern 5% of the edge
    let floods = vec![rect((0.000_95, -0.0005), (0.0015, 0.0005))];

    assert_eq!(mark_blocked(&mut graph, &floods, 0.2), 0);
    let route = find_route(&graph, c(0.0, 0.0), c(0.001, 0.0)).unwrap();
    assert_eq!(route.segments, 1);
    assert!((route.length_m - length).abs() < 1e-9);
}

#[test]
fn scenario_c_route_avoids_forced_block() {
    let a = c(0.0, 0.0);
    let b = c(0.002, 0.0);
    let north = c(0.001, 0.0005);
    let south = c(0.001, -0.0008);
    let mut graph = build_road_graph(
        &[RoadLine::new(vec![a, north, b]), RoadLine::new(vec![a, south, b])],
        &EvacConfig::default(),
    );

    // The northern branch is shorter; block its first half
    let start = graph.node_at(a).unwrap();
    let north_node = graph.node_at(north).unwrap();
    let edge = graph.find_edge(start, north_node).unwrap();
    graph.set_blocked(edge, true);

    let route = find_route(&graph, a, b).unwrap();
    assert_eq!(route.blocked_edges_count, 1);
    assert_eq!(route.coordinates, vec![a, south, b]);
}

#[test]
fn scenario_d_graph_without_edges_has_no_routes() {
    let mut graph = RoadGraph::default();
    graph.get_or_insert_node(c(0.0, 0.0));
    graph.get_or_insert_node(c(0.01, 0.01));

    assert!(find_route(&graph, c(0.0, 0.0), c(0.01, 0.01)).is_none());
    assert!(find_route(&graph, c(0.0, 0.0), c(0.0, 0.0)).is_none());
}

#[test]
fn route_length_is_sum_of_traversed_edges() {
    let graph = grid(6, 6, 0.001);
    let route = find_route(&graph, c(0.0, 0.0), c(0.005, 0.004)).unwrap();

    assert_eq!(route.segments, 9);
    assert!((route.length_m - edge_length_sum(&graph, &route)).abs() < 1e-6);
}

#[test]
fn explicit_edge_lengths_are_summed() {
    let mut graph = RoadGraph::default();
    let a = graph.get_or_insert_node(c(0.0, 0.0));
    let b = graph.get_or_insert_node(c(0.0, 1.0));
    graph.upsert_edge(a, b, RoadEdge::new(c(0.0, 0.0), c(0.0, 1.0), 123.0));

    let route = find_route(&graph, c(0.0, 0.0), c(0.0, 1.0)).unwrap();
    assert_eq!(route.length_m, 123.0);
    assert_eq!(route.segments, 1);
}

#[test]
fn marking_is_idempotent() {
    let mut graph = grid(8, 8, 0.001);
    let floods = vec![rect((0.0015, 0.0015), (0.0045, 0.0035))];

    let first = mark_blocked(&mut graph, &floods, 0.2);
    let second = mark_blocked(&mut graph, &floods, 0.2);
    assert!(first > 0);
    assert_eq!(first, second);
}

#[test]
fn higher_threshold_never_blocks_more() {
    let floods = vec![
        rect((0.0012, 0.0012), (0.0041, 0.0033)),
        rect((0.0055, 0.0001), (0.0067, 0.0062)),
    ];

    let mut previous = usize::MAX;
    for ratio in [0.05, 0.1, 0.2, 0.4, 0.6, 0.8, 1.0] {
        let mut graph = grid(8, 8, 0.001);
        let blocked = mark_blocked(&mut graph, &floods, ratio);
        assert!(blocked <= previous, "ratio {ratio} blocked {blocked} > {previous}");
        previous = blocked;
    }
}

#[test]
fn overlap_equal_to_threshold_blocks() {
    let mut graph = RoadGraph::default();
    let a = graph.get_or_insert_node(c(0.0, 0.0));
    let b = graph.get_or_insert_node(c(10.0, 0.0));
    graph.upsert_edge(a, b, RoadEdge::new(c(0.0, 0.0), c(10.0, 0.0), 1_000.0));

    // x in [-1, 2] covers exactly 20% of the edge
    let floods = vec![rect((-1.0, -1.0), (2.0, 1.0))];
    assert_eq!(mark_blocked(&mut graph, &floods, 0.2), 1);
}

#[test]
fn empty_flood_set_unblocks_everything() {
    let mut graph = grid(4, 4, 0.001);
    for idx in graph.edge_indices().collect::<Vec<_>>() {
        graph.set_blocked(idx, true);
    }

    assert_eq!(mark_blocked(&mut graph, &[], 0.2), 0);
    assert_eq!(graph.blocked_count(), 0);
}

#[test]
fn flood_wall_forces_detour() {
    let service = EvacuationService::initialize(
        &grid_lines(5, 5, 0.001),
        Arc::new(StaticFloodSource::new(vec![rect((0.0018, -0.0001), (0.0022, 0.0031))])),
        EvacConfig::default(),
    )
    .unwrap();

    let RouteOutcome::Found(route) = service.compute_route(c(0.0, 0.0), c(0.004, 0.0)).unwrap()
    else {
        panic!("expected a detour");
    };
    // Straight path is 4 segments, the wall forces going around through y = 0.004
    assert!(route.segments > 4);
    assert!(route.blocked_edges_count > 0);
    assert!(route.coordinates.iter().all(|p| p.x != 0.002 || p.y == 0.004));
    assert_eq!(service.snapshot().blocked_count(), 0);
}

#[test]
fn reload_during_routing_sees_whole_snapshots() {
    let small = vec![RoadLine::new(vec![c(0.0, 0.0), c(0.001, 0.0)])];
    let large = grid_lines(5, 5, 0.001);
    let small_nodes = 2;
    let large_nodes = 25;

    let service = Arc::new(
        EvacuationService::initialize(
            &small,
            Arc::new(StaticFloodSource::default()),
            EvacConfig::default(),
        )
        .unwrap(),
    );

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..50 {
                    let snapshot = service.snapshot();
                    let nodes = snapshot.node_count();
                    assert!(nodes == small_nodes || nodes == large_nodes);
                    let outcome = service.compute_route(c(0.0, 0.0), c(0.001, 0.0)).unwrap();
                    assert!(matches!(outcome, RouteOutcome::Found(_)));
                }
            })
        })
        .collect();

    for round in 0..20 {
        let lines = if round % 2 == 0 { &large } else { &small };
        service.reload(lines);
    }

    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn near_duplicate_coordinates_join_lines() {
    let lines = vec![
        RoadLine::new(vec![c(0.0, 0.0), c(0.001, 0.0)]),
        RoadLine::new(vec![c(0.001_000_000_02, 0.0), c(0.002, 0.0)]),
    ];
    let graph = build_road_graph(&lines, &EvacConfig::default());

    assert_eq!(graph.node_count(), 3);
    let route = find_route(&graph, c(0.0, 0.0), c(0.002, 0.0)).unwrap();
    assert_eq!(route.segments, 2);
}

#[test]
fn nearest_node_breaks_ties_by_index() {
    let graph = build_road_graph(
        &[RoadLine::new(vec![c(0.001, 0.0), c(-0.001, 0.0)])],
        &EvacConfig::default(),
    );
    let (idx, _) = crate::nearest_node(&graph, c(0.0, 0.0)).unwrap();
    assert_eq!(idx, NodeIndex::new(0));
}
