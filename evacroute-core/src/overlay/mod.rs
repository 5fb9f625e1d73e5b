//! Flood overlay: decides which road edges are cut off by flood extents

mod index;
mod intersection;
mod marking;

pub use index::FloodIndex;
pub use intersection::overlap_fraction;
pub use marking::mark_blocked;
