//! Road network components - nodes, edges and input lines

use geo::{Coord, LineString, Point};

use crate::Meters;

/// Node identity: latitude and longitude scaled by `10^precision`
/// and rounded to integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub lat: i64,
    pub lon: i64,
}

impl NodeKey {
    /// Quantize a `(lon, lat)` coordinate to `precision` decimal places
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_coord(coord: Coord<f64>, precision: u32) -> Self {
        let scale = 10f64.powi(precision as i32);
        Self {
            lat: (coord.y * scale).round() as i64,
            lon: (coord.x * scale).round() as i64,
        }
    }
}

/// Road graph node
#[derive(Debug, Clone)]
pub struct RoadNode {
    pub key: NodeKey,
    /// First coordinate seen for this key
    pub geometry: Point<f64>,
}

/// Road graph edge (single road segment)
#[derive(Debug, Clone)]
pub struct RoadEdge {
    /// Geodesic length of the segment
    pub length_m: Meters,
    /// Two-point segment between the end nodes, in insertion direction
    pub geometry: LineString<f64>,
    /// Set by the flood overlay, never by construction
    pub blocked: bool,
    /// Classification of the road line the segment came from
    pub highway: Option<String>,
}

impl RoadEdge {
    pub fn new(from: Coord<f64>, to: Coord<f64>, length_m: Meters) -> Self {
        Self {
            length_m,
            geometry: LineString::new(vec![from, to]),
            blocked: false,
            highway: None,
        }
    }

    #[must_use]
    pub fn with_highway(mut self, highway: Option<String>) -> Self {
        self.highway = highway;
        self
    }

    /// Edge has something to measure overlap against
    pub fn has_extent(&self) -> bool {
        self.geometry.0.len() >= 2 && self.length_m > 0.0
    }
}

/// One road line from the input data set
#[derive(Debug, Clone, Default)]
pub struct RoadLine {
    /// Ordered `(lon, lat)` coordinates
    pub coordinates: Vec<Coord<f64>>,
    /// Value of the `highway` tag, if the source carried one
    pub highway: Option<String>,
}

impl RoadLine {
    pub fn new(coordinates: Vec<Coord<f64>>) -> Self {
        Self {
            coordinates,
            highway: None,
        }
    }

    #[must_use]
    pub fn with_highway(mut self, highway: impl Into<String>) -> Self {
        self.highway = Some(highway.into());
        self
    }
}

impl From<LineString<f64>> for RoadLine {
    fn from(line: LineString<f64>) -> Self {
        Self::new(line.0)
    }
}
