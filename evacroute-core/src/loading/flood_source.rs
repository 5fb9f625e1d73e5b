//! Providers of the current flood extents

use std::path::PathBuf;

use crate::{Error, FloodPolygon};

use super::reader::read_flood_polygons;

/// Source of flood polygons, asked once per route computation.
///
/// Implementations decide how fresh the data is. Returning
/// [`Error::DataUnavailable`] means "no flood data right now" and
/// routing continues over an unblocked network.
pub trait FloodSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<FloodPolygon>, Error>;
}

/// Flood polygons read from a `GeoJSON` file on every fetch, so edits to
/// the file show up on the next request
#[derive(Debug, Clone)]
pub struct GeoJsonFloodFile {
    path: PathBuf,
}

impl GeoJsonFloodFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl FloodSource for GeoJsonFloodFile {
    fn fetch(&self) -> Result<Vec<FloodPolygon>, Error> {
        read_flood_polygons(&self.path)
    }
}

/// Fixed set of flood polygons
#[derive(Debug, Clone, Default)]
pub struct StaticFloodSource {
    polygons: Vec<FloodPolygon>,
}

impl StaticFloodSource {
    pub fn new(polygons: Vec<FloodPolygon>) -> Self {
        Self { polygons }
    }
}

impl FloodSource for StaticFloodSource {
    fn fetch(&self) -> Result<Vec<FloodPolygon>, Error> {
        Ok(self.polygons.clone())
    }
}
