//! Data model for flood-aware evacuation routing
//!
//! Contains the road network graph, flood polygons and route results.

pub mod flood;
pub mod roads;
pub mod route;

pub use flood::{FloodPolygon, RepairOutcome};
pub use roads::{NodeKey, RoadEdge, RoadGraph, RoadLine, RoadNode};
pub use route::Route;
