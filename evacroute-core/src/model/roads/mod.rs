//! Road network model

pub mod components;
pub mod network;

pub use components::{NodeKey, RoadEdge, RoadLine, RoadNode};
pub use network::RoadGraph;
