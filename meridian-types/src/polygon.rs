//! Polygon with an outer ring and holes.

use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, NewCartesianPoint2d, Rect};
use crate::error::MeridianTypesError;
use crate::segment::Segment;

/// Polygon consisting of an outer ring and zero or more holes.
///
/// Rings are closed implicitly: the last point connects to the first one and is not stored twice.
/// Every ring has at least 3 points.
///
/// Area, centroid, containment and boundary distance are computed from the outer ring only. Holes
/// are carried along for rendering but do not affect these operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon<P> {
    outer: Vec<P>,
    holes: Vec<Vec<P>>,
}

impl<P: CartesianPoint2d> Polygon<P> {
    /// Creates a polygon.
    ///
    /// If a ring repeats its first point at the end (as GeoJSON rings do), the repeated point is
    /// dropped. Returns an error if any ring has fewer than 3 points after that.
    pub fn new(outer: Vec<P>, holes: Vec<Vec<P>>) -> Result<Self, MeridianTypesError> {
        let outer = normalize_ring(outer)?;
        let holes = holes
            .into_iter()
            .map(normalize_ring)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { outer, holes })
    }

    /// Iterates over segments of the outer ring including the closing one.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, P>> {
        ring_segments(&self.outer)
    }

    /// Even-odd ray casting test against the outer ring.
    ///
    /// Holes are ignored. For points exactly on the boundary the result follows the half-open
    /// crossing rule: a point on an edge facing negative `x` or negative `y` is inside, a point on
    /// an edge facing positive `x` or positive `y` is outside.
    pub fn contains_point(&self, point: &impl CartesianPoint2d) -> bool {
        let x = point.x();
        let y = point.y();
        let mut inside = false;

        for Segment(a, b) in self.iter_segments() {
            if (a.y() > y) != (b.y() > y) {
                let x_cross = (b.x() - a.x()) * (y - a.y()) / (b.y() - a.y()) + a.x();
                if x < x_cross {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// Signed shoelace area of the outer ring. Positive for counter-clockwise rings in a
    /// y-up coordinate system.
    pub fn signed_area(&self) -> f64 {
        self.iter_segments()
            .map(|Segment(a, b)| a.x() * b.y() - b.x() * a.y())
            .sum::<f64>()
            / 2.0
    }

    /// Area of the outer ring regardless of its orientation.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Minimum distance from the point to the outer ring.
    ///
    /// If `early_exit_threshold` is set and some edge is closer to the point than the threshold,
    /// the scan stops and `None` is returned instead of a distance.
    pub fn distance_to_boundary(
        &self,
        point: &impl CartesianPoint2d,
        early_exit_threshold: Option<f64>,
    ) -> Option<f64> {
        let threshold_sq = early_exit_threshold.map(|t| t * t);
        let mut min_sq = f64::INFINITY;

        for segment in self.iter_segments() {
            let distance_sq = segment.distance_to_point_sq(point);
            if let Some(threshold_sq) = threshold_sq {
                if distance_sq < threshold_sq {
                    return None;
                }
            }

            min_sq = min_sq.min(distance_sq);
        }

        Some(min_sq.sqrt())
    }

    /// Bounding rectangle of the outer ring.
    pub fn bounding_rect(&self) -> Rect {
        // Rings always have points, the fallback is never used.
        Rect::from_points(self.outer.iter()).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0))
    }
}

impl<P: NewCartesianPoint2d + Clone> Polygon<P> {
    /// Center of mass of the outer ring. For rings with zero area returns the first vertex.
    pub fn centroid(&self) -> P {
        let area = self.signed_area();
        if area == 0.0 {
            return self.outer[0].clone();
        }

        let (mut cx, mut cy) = (0.0, 0.0);
        for Segment(a, b) in self.iter_segments() {
            let cross = a.x() * b.y() - b.x() * a.y();
            cx += (a.x() + b.x()) * cross;
            cy += (a.y() + b.y()) * cross;
        }

        P::new(cx / (6.0 * area), cy / (6.0 * area))
    }
}

impl<P> Polygon<P> {
    /// Points of the outer ring.
    pub fn outer(&self) -> &[P] {
        &self.outer
    }

    /// Holes of the polygon.
    pub fn holes(&self) -> &[Vec<P>] {
        &self.holes
    }

    /// Iterates over all rings, the outer one first.
    pub fn iter_rings(&self) -> impl Iterator<Item = &[P]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(|h| h.as_slice()))
    }

    /// Converts every point of the polygon with the given function. The function must preserve
    /// the number of points, so ring invariants still hold.
    pub fn map_points<Q>(&self, mut f: impl FnMut(&P) -> Q) -> Polygon<Q> {
        Polygon {
            outer: self.outer.iter().map(&mut f).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(&mut f).collect())
                .collect(),
        }
    }
}

fn normalize_ring<P: CartesianPoint2d>(mut ring: Vec<P>) -> Result<Vec<P>, MeridianTypesError> {
    if ring.len() > 1 && ring[0].equal(&ring[ring.len() - 1]) {
        ring.pop();
    }

    if ring.len() < 3 {
        return Err(MeridianTypesError::InvalidGeometry(format!(
            "polygon ring must have at least 3 distinct points, got {}",
            ring.len()
        )));
    }

    Ok(ring)
}

fn ring_segments<P>(ring: &[P]) -> impl Iterator<Item = Segment<'_, P>> {
    let closing = match (ring.last(), ring.first()) {
        (Some(last), Some(first)) if ring.len() > 1 => Some(Segment(last, first)),
        _ => None,
    };

    ring.windows(2)
        .map(|w| Segment(&w[0], &w[1]))
        .chain(closing)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use nalgebra::Point2;

    use super::*;

    fn square() -> Polygon<Point2<f64>> {
        Polygon::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 10.0),
                Point2::new(10.0, 10.0),
                Point2::new(10.0, 0.0),
            ],
            vec![],
        )
        .unwrap()
    }

    fn pentagon(points: &[(f64, f64)]) -> Polygon<Point2<f64>> {
        Polygon::new(
            points.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn closing_point_is_dropped() {
        let polygon = Polygon::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 0.0),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(polygon.outer().len(), 3);
        assert_eq!(polygon.iter_segments().count(), 3);
    }

    #[test]
    fn too_short_ring() {
        let result = Polygon::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 0.0),
            ],
            vec![],
        );
        assert_matches!(result, Err(MeridianTypesError::InvalidGeometry(_)));

        let result = Polygon::new(
            square().outer().to_vec(),
            vec![vec![Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)]],
        );
        assert_matches!(result, Err(MeridianTypesError::InvalidGeometry(_)));
    }

    #[test]
    fn contains_point() {
        let square = square();
        assert!(square.contains_point(&Point2::new(5.0, 5.0)));
        assert!(!square.contains_point(&Point2::new(15.0, 5.0)));
        assert!(!square.contains_point(&Point2::new(-0.1, 5.0)));
        assert!(!square.contains_point(&Point2::new(5.0, 10.1)));
    }

    #[test]
    fn contains_point_on_boundary() {
        let square = square();
        assert!(square.contains_point(&Point2::new(0.0, 5.0)));
        assert!(square.contains_point(&Point2::new(5.0, 0.0)));
        assert!(!square.contains_point(&Point2::new(10.0, 5.0)));
        assert!(!square.contains_point(&Point2::new(5.0, 10.0)));
    }

    #[test]
    fn contains_point_ignores_holes() {
        let polygon = Polygon::new(
            square().outer().to_vec(),
            vec![vec![
                Point2::new(4.0, 4.0),
                Point2::new(4.0, 6.0),
                Point2::new(6.0, 6.0),
                Point2::new(6.0, 4.0),
            ]],
        )
        .unwrap();
        assert!(polygon.contains_point(&Point2::new(5.0, 5.0)));
        assert_eq!(polygon.iter_rings().count(), 2);
    }

    #[test]
    fn area_is_orientation_independent() {
        let points = [(0.0, 0.0), (4.0, 0.0), (5.0, 3.0), (2.0, 5.0), (-1.0, 3.0)];
        let base = pentagon(&points);
        let expected = base.area();
        assert!(expected > 0.0);

        for shift in 1..points.len() {
            let mut rotated = points.to_vec();
            rotated.rotate_left(shift);
            assert_relative_eq!(pentagon(&rotated).area(), expected);
        }

        let mut reversed = points.to_vec();
        reversed.reverse();
        let reversed = pentagon(&reversed);
        assert_relative_eq!(reversed.area(), expected);
        assert_relative_eq!(reversed.signed_area(), -base.signed_area());
    }

    #[test]
    fn area_of_square() {
        assert_eq!(square().area(), 100.0);
        assert_eq!(square().signed_area(), -100.0);
    }

    #[test]
    fn centroid() {
        let c = square().centroid();
        assert_relative_eq!(c.x, 5.0);
        assert_relative_eq!(c.y, 5.0);

        let triangle = pentagon(&[(0.0, 0.0), (6.0, 0.0), (0.0, 3.0)]);
        let c = triangle.centroid();
        assert_relative_eq!(c.x, 2.0);
        assert_relative_eq!(c.y, 1.0);
    }

    #[test]
    fn centroid_of_degenerate_polygon() {
        let flat = pentagon(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(flat.area(), 0.0);
        assert_eq!(flat.centroid(), Point2::new(1.0, 1.0));
    }

    #[test]
    fn distance_to_boundary() {
        let square = square();
        assert_eq!(
            square.distance_to_boundary(&Point2::new(5.0, 5.0), None),
            Some(5.0)
        );
        assert_eq!(
            square.distance_to_boundary(&Point2::new(2.0, 5.0), None),
            Some(2.0)
        );
        assert_eq!(
            square.distance_to_boundary(&Point2::new(13.0, 14.0), None),
            Some(5.0)
        );
    }

    #[test]
    fn distance_uses_closing_edge() {
        // The closing edge (10,0)->(0,0) is the nearest one.
        assert_eq!(
            square().distance_to_boundary(&Point2::new(5.0, 1.0), None),
            Some(1.0)
        );
    }

    #[test]
    fn distance_early_exit() {
        let square = square();
        assert_eq!(
            square.distance_to_boundary(&Point2::new(2.0, 5.0), Some(3.0)),
            None
        );
        assert_eq!(
            square.distance_to_boundary(&Point2::new(5.0, 5.0), Some(3.0)),
            Some(5.0)
        );
    }

    #[test]
    fn bounding_rect() {
        let rect = pentagon(&[(0.0, 0.0), (4.0, 0.0), (5.0, 3.0), (2.0, 5.0), (-1.0, 3.0)])
            .bounding_rect();
        assert_eq!(rect, Rect::new(-1.0, 0.0, 5.0, 5.0));
    }
}
