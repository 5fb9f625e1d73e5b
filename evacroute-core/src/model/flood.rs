//! Flood extents and their geometric repair

use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Area, BoundingRect, Coord, Line, LineString, MultiPolygon, Polygon, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

/// Upper bound on ring splits performed while repairing one polygon
const MAX_REPAIR_SPLITS: usize = 256;

/// Flood extent used by the overlay
#[derive(Debug, Clone)]
pub struct FloodPolygon {
    /// One or more simple polygons, `(lon, lat)` degrees
    pub geometry: MultiPolygon<f64>,
    /// Envelope of the geometry, used for candidate filtering
    pub bbox: Rect<f64>,
}

/// Result of preparing raw polygon geometry for the overlay
#[derive(Debug, Clone)]
pub enum RepairOutcome {
    /// Geometry was changed to become usable
    Repaired(FloodPolygon),
    /// Geometry is used unchanged, either because it was fine or because
    /// the repair could not be completed
    AsIs(FloodPolygon),
    /// Geometry has no usable area
    Rejected(String),
}

impl RepairOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, RepairOutcome::Rejected(_))
    }
}

impl FloodPolygon {
    /// Wraps geometry without repairing it. Returns `None` for empty geometry.
    pub fn new(geometry: impl Into<MultiPolygon<f64>>) -> Option<Self> {
        let geometry = geometry.into();
        let bbox = geometry.bounding_rect()?;
        Some(Self { geometry, bbox })
    }

    /// Axis-aligned rectangle between two `(lon, lat)` corners
    pub fn rectangle(a: Coord<f64>, b: Coord<f64>) -> Self {
        let rect = Rect::new(a, b);
        Self {
            geometry: MultiPolygon::new(vec![rect.to_polygon()]),
            bbox: rect,
        }
    }

    /// Prepares a raw polygon for the overlay.
    ///
    /// Repeated vertices are dropped and a self-intersecting exterior ring is
    /// split at its crossings into simple rings. Holes are kept with the part
    /// that contains them. When splitting cannot finish, the polygon is used
    /// as it came.
    pub fn repair(polygon: Polygon<f64>) -> RepairOutcome {
        let all_finite = polygon
            .exterior()
            .coords()
            .chain(polygon.interiors().iter().flat_map(LineString::coords))
            .all(|c| c.x.is_finite() && c.y.is_finite());
        if !all_finite {
            return RepairOutcome::Rejected("non-finite coordinate".to_string());
        }

        let raw_exterior = open_ring(polygon.exterior());
        let exterior = dedup_ring(raw_exterior.clone());
        if exterior.len() < 3 {
            return RepairOutcome::Rejected(format!(
                "exterior ring has {} distinct vertices",
                exterior.len()
            ));
        }
        let mut changed = exterior.len() != raw_exterior.len();

        let mut holes = Vec::with_capacity(polygon.interiors().len());
        for interior in polygon.interiors() {
            let raw = open_ring(interior);
            let ring = dedup_ring(raw.clone());
            if ring.len() < 3 || ring_area(&ring) == 0.0 {
                changed = true;
                continue;
            }
            changed |= ring.len() != raw.len();
            holes.push(ring);
        }

        let parts = match split_self_intersections(exterior.clone()) {
            Some(parts) => {
                changed |= parts.len() != 1;
                let parts: Vec<Vec<Coord<f64>>> = parts
                    .into_iter()
                    .filter(|ring| ring_area(ring) > 0.0)
                    .collect();
                if parts.is_empty() {
                    return as_is(polygon);
                }
                parts
            }
            None => {
                log::debug!("Could not split self-intersecting flood ring, using it unrepaired");
                return as_is(polygon);
            }
        };

        if !changed {
            return as_is(polygon);
        }

        let shells: Vec<Polygon<f64>> = parts
            .into_iter()
            .map(|ring| Polygon::new(LineString::new(ring), Vec::new()))
            .collect();

        let mut shell_holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];
        for hole in holes {
            let anchor = hole[0];
            if let Some(owner) = shells
                .iter()
                .position(|shell| shell.coordinate_position(&anchor) == CoordPos::Inside)
            {
                shell_holes[owner].push(LineString::new(hole));
            }
        }

        let polygons: Vec<Polygon<f64>> = shells
            .into_iter()
            .zip(shell_holes)
            .map(|(shell, holes)| Polygon::new(shell.into_inner().0, holes))
            .collect();

        match FloodPolygon::new(MultiPolygon::new(polygons)) {
            Some(repaired) => RepairOutcome::Repaired(repaired),
            None => RepairOutcome::Rejected("repair produced empty geometry".to_string()),
        }
    }
}

fn as_is(polygon: Polygon<f64>) -> RepairOutcome {
    if polygon.unsigned_area() == 0.0 {
        return RepairOutcome::Rejected("polygon has zero area".to_string());
    }
    match FloodPolygon::new(polygon) {
        Some(flood) => RepairOutcome::AsIs(flood),
        None => RepairOutcome::Rejected("empty polygon".to_string()),
    }
}

/// Ring coordinates without the closing duplicate
fn open_ring(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut coords = ring.0.clone();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}

/// Drops consecutive repeated vertices, including a repeat of the first
/// vertex at the end
fn dedup_ring(mut ring: Vec<Coord<f64>>) -> Vec<Coord<f64>> {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn ring_area(ring: &[Coord<f64>]) -> f64 {
    Polygon::new(LineString::new(ring.to_vec()), Vec::new()).unsigned_area()
}

/// Splits an open ring into simple rings at every place where two
/// non-adjacent edges meet. Returns `None` when the ring has collinear
/// overlapping edges or the split budget runs out.
fn split_self_intersections(ring: Vec<Coord<f64>>) -> Option<Vec<Vec<Coord<f64>>>> {
    let mut pending = vec![ring];
    let mut simple = Vec::new();
    let mut splits = 0;

    while let Some(ring) = pending.pop() {
        let Some((i, j, at)) = first_self_intersection(&ring)? else {
            simple.push(ring);
            continue;
        };

        splits += 1;
        if splits > MAX_REPAIR_SPLITS {
            return None;
        }

        // Loop through edges i+1..j closes at the crossing point,
        // the rest of the ring closes through it from the other side
        let mut inner = Vec::with_capacity(j - i + 1);
        inner.push(at);
        inner.extend_from_slice(&ring[i + 1..=j]);

        let mut outer = Vec::with_capacity(ring.len() - (j - i) + 1);
        outer.extend_from_slice(&ring[..=i]);
        outer.push(at);
        outer.extend_from_slice(&ring[j + 1..]);

        for part in [inner, outer] {
            let part = dedup_ring(part);
            if part.len() >= 3 {
                pending.push(part);
            }
        }
    }

    Some(simple)
}

/// Envelope of one ring edge, data is the edge number
type RingEdgeItem = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// First pair of non-adjacent ring edges `(i, j)` with `i < j` that meet,
/// and their meeting point. Edge `k` runs from vertex `k` to vertex `k + 1`
/// (wrapping). The outer `None` signals collinear overlap.
///
/// Only edges with touching envelopes are compared. Pairs are visited in
/// `(i, j)` order, so the answer does not depend on the tree layout.
fn first_self_intersection(ring: &[Coord<f64>]) -> Option<Option<(usize, usize, Coord<f64>)>> {
    let n = ring.len();
    let edge = |k: usize| Line::new(ring[k], ring[(k + 1) % n]);

    let items = (0..n)
        .map(|k| {
            let line = edge(k);
            let (a, b) = (line.start, line.end);
            GeomWithData::new(Rectangle::from_corners([a.x, a.y], [b.x, b.y]), k)
        })
        .collect();
    let tree: RTree<RingEdgeItem> = RTree::bulk_load(items);

    let mut nearby = Vec::new();
    for i in 0..n {
        let line = edge(i);
        let (a, b) = (line.start, line.end);
        let envelope = AABB::from_corners([a.x, a.y], [b.x, b.y]);

        nearby.clear();
        nearby.extend(
            tree.locate_in_envelope_intersecting(&envelope)
                .map(|item| item.data)
                .filter(|&j| j >= i + 2 && !(i == 0 && j == n - 1)),
        );
        nearby.sort_unstable();

        for &j in &nearby {
            match line_intersection(line, edge(j)) {
                None => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    return Some(Some((i, j, intersection)));
                }
                Some(LineIntersection::Collinear { .. }) => return None,
            }
        }
    }

    Some(None)
}
