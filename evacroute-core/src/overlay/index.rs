use geo::Rect;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

use crate::FloodPolygon;

/// Envelope of one flood polygon, data is the polygon's position in the input
type FloodRtreeItem = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Bounding-box index over a set of flood polygons
pub struct FloodIndex<'a> {
    polygons: &'a [FloodPolygon],
    tree: RTree<FloodRtreeItem>,
}

impl<'a> FloodIndex<'a> {
    pub fn new(polygons: &'a [FloodPolygon]) -> Self {
        let items = polygons
            .iter()
            .enumerate()
            .map(|(idx, polygon)| {
                let (min, max) = (polygon.bbox.min(), polygon.bbox.max());
                GeomWithData::new(Rectangle::from_corners([min.x, min.y], [max.x, max.y]), idx)
            })
            .collect();

        Self {
            polygons,
            tree: RTree::bulk_load(items),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Polygons whose envelope touches `envelope`, in input order
    pub fn candidates(&self, envelope: Rect<f64>) -> Vec<&'a FloodPolygon> {
        let aabb = AABB::from_corners(
            [envelope.min().x, envelope.min().y],
            [envelope.max().x, envelope.max().y],
        );
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|item| item.data)
            .collect();
        hits.sort_unstable();

        hits.into_iter().map(|idx| &self.polygons[idx]).collect()
    }
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use super::*;

    #[test]
    fn candidates_are_filtered_by_envelope() {
        let floods = vec![
            FloodPolygon::rectangle(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }),
            FloodPolygon::rectangle(coord! { x: 5.0, y: 5.0 }, coord! { x: 6.0, y: 6.0 }),
            FloodPolygon::rectangle(coord! { x: 0.5, y: 0.5 }, coord! { x: 2.0, y: 2.0 }),
        ];
        let index = FloodIndex::new(&floods);

        let envelope = |min: (f64, f64), max: (f64, f64)| {
            Rect::new(coord! { x: min.0, y: min.1 }, coord! { x: max.0, y: max.1 })
        };

        let near = index.candidates(envelope((0.8, 0.8), (1.5, 0.9)));
        assert_eq!(near.len(), 2);
        assert_eq!(near[0].bbox, floods[0].bbox);
        assert_eq!(near[1].bbox, floods[2].bbox);

        // Touching envelopes count
        let touching = index.candidates(envelope((6.0, 6.0), (7.0, 7.0)));
        assert_eq!(touching.len(), 1);

        let far = index.candidates(envelope((10.0, 10.0), (11.0, 11.0)));
        assert!(far.is_empty());
    }
}
