//! This module is responsible for loading road lines and flood polygons
//! (`GeoJSON`) and building the routable road graph.

mod builder;
mod flood_source;
pub mod reader;

pub use builder::{BuildReport, build_road_graph, build_road_graph_with_report};
pub(crate) use builder::is_valid_position;
pub use flood_source::{FloodSource, GeoJsonFloodFile, StaticFloodSource};
pub use reader::{
    flood_polygons_from_geojson, read_flood_polygons, read_road_lines, repair_flood_features,
    road_lines_from_geojson,
};
