//! Route search over the walkable part of the road graph

mod dijkstra;
mod nearest;
mod router;

pub use nearest::nearest_node;
pub use router::find_route;
