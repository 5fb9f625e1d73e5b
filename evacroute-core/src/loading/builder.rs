use geo::Coord;
use itertools::Itertools;
use log::{debug, info};

use crate::geodesy::haversine_distance_m;
use crate::{DuplicateSegmentPolicy, Error, EvacConfig, RoadEdge, RoadGraph, RoadLine};

/// Summary of what a graph build did with its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub lines_used: usize,
    /// Lines with fewer than two points or invalid coordinates
    pub lines_skipped: usize,
    /// Segments that hit an already connected node pair
    pub segments_merged: usize,
    /// Segments whose end points fall on the same node
    pub segments_collapsed: usize,
}

/// Creates a road graph from line geometries
pub fn build_road_graph(lines: &[RoadLine], config: &EvacConfig) -> RoadGraph {
    build_road_graph_with_report(lines, config).0
}

/// Creates a road graph from line geometries and reports skipped input.
///
/// Each pair of consecutive coordinates becomes one undirected edge.
/// Malformed lines are logged and skipped, the rest of the batch is used.
pub fn build_road_graph_with_report(
    lines: &[RoadLine],
    config: &EvacConfig,
) -> (RoadGraph, BuildReport) {
    let segment_estimate: usize = lines
        .iter()
        .map(|line| line.coordinates.len().saturating_sub(1))
        .sum();
    let mut graph = RoadGraph::with_capacity(
        config.coordinate_precision,
        segment_estimate + lines.len(),
        segment_estimate,
    );
    let mut report = BuildReport::default();

    for (line_idx, line) in lines.iter().enumerate() {
        if let Err(e) = validate_line(line) {
            debug!("Skipping road line {line_idx}: {e}");
            report.lines_skipped += 1;
            continue;
        }

        add_line(&mut graph, line, config.duplicate_segments, &mut report);
        report.lines_used += 1;
    }

    info!(
        "Road graph built: {} nodes, {} edges from {} lines ({} skipped, {} merged segments)",
        graph.node_count(),
        graph.edge_count(),
        report.lines_used,
        report.lines_skipped,
        report.segments_merged
    );

    (graph, report)
}

fn validate_line(line: &RoadLine) -> Result<(), Error> {
    if line.coordinates.len() < 2 {
        return Err(Error::Geometry(format!(
            "line has {} point(s), at least 2 required",
            line.coordinates.len()
        )));
    }

    if let Some(bad) = line.coordinates.iter().find(|c| !is_valid_position(**c)) {
        return Err(Error::Geometry(format!(
            "invalid coordinate ({}, {})",
            bad.x, bad.y
        )));
    }

    Ok(())
}

pub(crate) fn is_valid_position(coord: Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}

fn add_line(
    graph: &mut RoadGraph,
    line: &RoadLine,
    policy: DuplicateSegmentPolicy,
    report: &mut BuildReport,
) {
    for (&from, &to) in line.coordinates.iter().tuple_windows() {
        let a = graph.get_or_insert_node(from);
        let b = graph.get_or_insert_node(to);
        if a == b {
            report.segments_collapsed += 1;
            continue;
        }

        // Node positions, not raw input, so edges end exactly on their nodes
        let (Some(from), Some(to)) = (graph.node_coord(a), graph.node_coord(b)) else {
            continue;
        };
        let length_m = haversine_distance_m(from, to);

        if graph.find_edge(a, b).is_some() {
            report.segments_merged += 1;
            if policy == DuplicateSegmentPolicy::KeepFirst {
                continue;
            }
        }

        let edge = RoadEdge::new(from, to, length_m).with_highway(line.highway.clone());
        graph.upsert_edge(a, b, edge);
    }
}
