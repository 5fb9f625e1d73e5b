//! Route result and its `GeoJSON` form

use geo::{Coord, LineString, Point};
use geojson::{Feature, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::{Error, Meters};

/// Shortest evacuation path between two points
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Path vertices as `(lon, lat)` coordinates, start first
    pub coordinates: Vec<Coord<f64>>,
    /// Sum of traversed edge lengths
    pub length_m: Meters,
    /// Number of traversed edges
    pub segments: usize,
    /// Edges left out of the search because they were blocked
    pub blocked_edges_count: usize,
    /// Wall time of node resolution and path search
    pub calc_time_ms: f64,
}

impl Route {
    /// Start and end resolved to the same node
    pub fn is_trivial(&self) -> bool {
        self.segments == 0
    }

    pub fn line_string(&self) -> LineString<f64> {
        LineString::new(self.coordinates.clone())
    }

    /// Route geometry with `length_m` and `segments` properties.
    /// A trivial route is written as a point.
    pub fn to_geojson_feature(&self) -> Result<Feature, Error> {
        let geometry = match self.coordinates.as_slice() {
            [] => None,
            [single] => Some(Geometry::new(GeoJsonValue::from(&Point::from(*single)))),
            _ => Some(Geometry::new(GeoJsonValue::from(&self.line_string()))),
        };

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "length_m": self.length_m,
                "segments": self.segments,
            }
        });

        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}
