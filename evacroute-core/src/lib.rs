//! Flood-aware evacuation routing over a road network.
//!
//! The crate turns road line geometry into an undirected weighted graph,
//! blocks the edges that run through flood extents and searches the
//! remaining network for the shortest path between two coordinates.
//!
//! The [`EvacuationService`] ties the pieces together and is the entry
//! point for applications.

pub mod config;
pub mod error;
pub mod geodesy;
pub mod loading;
pub mod model;
pub mod overlay;
pub mod prelude;
pub mod routing;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::{DuplicateSegmentPolicy, EvacConfig};
pub use error::Error;
pub use loading::{
    BuildReport, FloodSource, GeoJsonFloodFile, StaticFloodSource, build_road_graph,
    build_road_graph_with_report, read_flood_polygons, read_road_lines,
};
pub use model::{FloodPolygon, RepairOutcome, RoadEdge, RoadGraph, RoadLine, RoadNode, Route};
pub use overlay::{FloodIndex, mark_blocked, overlap_fraction};
pub use routing::{find_route, nearest_node};
pub use service::{EvacuationService, NetworkStats, RouteOutcome};

/// Distance in meters
pub type Meters = f64;

/// Default fraction of an edge that must lie inside a flood polygon
/// for the edge to be blocked
pub const DEFAULT_OVERLAP_RATIO: f64 = 0.2;

/// Default number of decimal places kept in node identity keys (~1 cm)
pub const DEFAULT_COORDINATE_PRECISION: u32 = 7;
