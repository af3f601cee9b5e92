//! Open sequence of points.

use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::segment::Segment;
use crate::simplify::simplify;

/// Ordered sequence of points. The first and the last points are not connected.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString<P> {
    points: Vec<P>,
}

impl<P> LineString<P> {
    /// Creates a new line.
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }

    /// Points of the line.
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Consumes the line returning its points.
    pub fn into_points(self) -> Vec<P> {
        self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the line has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over segments between consecutive points.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, P>> {
        self.points.windows(2).map(|w| Segment(&w[0], &w[1]))
    }

    /// Converts every point of the line with the given function.
    pub fn map_points<Q>(&self, f: impl FnMut(&P) -> Q) -> LineString<Q> {
        LineString::new(self.points.iter().map(f).collect())
    }
}

impl<P: CartesianPoint2d> LineString<P> {
    /// Total length of the line.
    pub fn length(&self) -> f64 {
        self.iter_segments().map(|s| s.length()).sum()
    }

    /// Bounding rectangle of the line. `None` for an empty line.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.points.iter())
    }
}

impl<P: CartesianPoint2d + Clone> LineString<P> {
    /// Douglas-Peucker simplification of the line. See [`simplify`].
    pub fn simplify(&self, tolerance: f64) -> Self {
        Self::new(simplify(&self.points, tolerance))
    }
}

impl<P> From<Vec<P>> for LineString<P> {
    fn from(points: Vec<P>) -> Self {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use super::*;

    #[test]
    fn length() {
        let line = LineString::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 4.0),
            Point2::new(3.0, 10.0),
        ]);
        assert_eq!(line.length(), 11.0);
        assert_eq!(line.iter_segments().count(), 2);

        let single = LineString::new(vec![Point2::new(1.0, 1.0)]);
        assert_eq!(single.length(), 0.0);
        assert_eq!(single.iter_segments().count(), 0);
        assert_eq!(LineString::<Point2<f64>>::new(vec![]).bounding_rect(), None);
    }
}
