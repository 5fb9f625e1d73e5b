pub use crate::{DEFAULT_COORDINATE_PRECISION, DEFAULT_OVERLAP_RATIO};

// Re-export key components
pub use crate::config::{DuplicateSegmentPolicy, EvacConfig};
pub use crate::loading::{
    FloodSource, GeoJsonFloodFile, StaticFloodSource, build_road_graph, read_flood_polygons,
    read_road_lines,
};
pub use crate::model::{FloodPolygon, RoadGraph, RoadLine, Route};
pub use crate::overlay::mark_blocked;
pub use crate::routing::find_route;
pub use crate::service::{EvacuationService, NetworkStats, RouteOutcome};

// Core types for the road network
pub use crate::Error;
pub use crate::Meters;
pub use crate::model::NodeKey;
