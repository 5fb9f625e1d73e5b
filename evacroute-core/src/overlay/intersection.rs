use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line, MultiPolygon};

/// Share of the segment `from -> to` that lies inside `polygon`.
///
/// The segment is cut wherever it meets a ring edge, including both ends of
/// a collinear overlap. Every piece whose midpoint is not outside the polygon
/// counts, so a stretch along the boundary is inside. Planar in `(lon, lat)`.
/// Returns a value in `[0, 1]`; a zero-length segment yields `0`.
pub fn overlap_fraction(from: Coord<f64>, to: Coord<f64>, polygon: &MultiPolygon<f64>) -> f64 {
    let direction = to - from;
    let length_sq = direction.x * direction.x + direction.y * direction.y;
    if length_sq == 0.0 || !length_sq.is_finite() {
        return 0.0;
    }

    let segment = Line::new(from, to);
    let param = |c: Coord<f64>| {
        let offset = c - from;
        ((offset.x * direction.x + offset.y * direction.y) / length_sq).clamp(0.0, 1.0)
    };

    let mut cuts = vec![0.0, 1.0];
    let rings = polygon
        .iter()
        .flat_map(|part| std::iter::once(part.exterior()).chain(part.interiors()));
    for ring in rings {
        for ring_edge in ring.lines() {
            match line_intersection(segment, ring_edge) {
                None => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    cuts.push(param(intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    cuts.push(param(intersection.start));
                    cuts.push(param(intersection.end));
                }
            }
        }
    }

    cuts.sort_unstable_by(f64::total_cmp);
    cuts.dedup();

    let inside: f64 = cuts
        .windows(2)
        .filter(|pair| pair[1] > pair[0])
        .filter(|pair| {
            let mid = (pair[0] + pair[1]) / 2.0;
            let probe = from + direction * mid;
            polygon.coordinate_position(&probe) != CoordPos::Outside
        })
        .map(|pair| pair[1] - pair[0])
        .sum();

    inside.clamp(0.0, 1.0)
}
