use crate::cartesian::CartesianPoint2d;

/// A straight line segment between two points.
#[derive(Debug, PartialEq)]
pub struct Segment<'a, Point>(pub &'a Point, pub &'a Point);

impl<P: CartesianPoint2d> Segment<'_, P> {
    /// Shortest euclidean distance (squared) between a point and the segment:
    ///
    /// * if the normal from the point to the segment ends inside the segment, the returned value is
    ///   the squared length of the normal
    /// * if the normal from the point to the segment ends outside of the segment, the returned value
    ///   is the squared distance to the nearest endpoint
    pub fn distance_to_point_sq(&self, point: &impl CartesianPoint2d) -> f64 {
        if self.0.equal(self.1) {
            return self.0.distance_sq(point);
        }

        let ds = self.1.sub(self.0);
        let dp = point.sub(self.0);
        let ds_len = ds.x * ds.x + ds.y * ds.y;

        let r = (dp.x * ds.x + dp.y * ds.y) / ds_len;
        if r <= 0.0 {
            self.0.distance_sq(point)
        } else if r >= 1.0 {
            self.1.distance_sq(point)
        } else {
            let s = (dp.y * ds.x - dp.x * ds.y) / ds_len;
            (s * s) * ds_len
        }
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.0.distance(self.1)
    }

    /// Middle point of the segment as `(x, y)`.
    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.0.x() + self.1.x()) / 2.0,
            (self.0.y() + self.1.y()) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use super::*;

    #[test]
    fn distance_to_point() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        let segment = Segment(&a, &b);

        assert_eq!(segment.distance_to_point_sq(&Point2::new(5.0, 3.0)), 9.0);
        assert_eq!(segment.distance_to_point_sq(&Point2::new(-3.0, 4.0)), 25.0);
        assert_eq!(segment.distance_to_point_sq(&Point2::new(13.0, 4.0)), 25.0);
        assert_eq!(segment.distance_to_point_sq(&Point2::new(7.0, 0.0)), 0.0);
    }

    #[test]
    fn degenerate_segment() {
        let a = Point2::new(1.0, 1.0);
        let segment = Segment(&a, &a);
        assert_eq!(segment.distance_to_point_sq(&Point2::new(4.0, 5.0)), 25.0);
        assert_eq!(segment.length(), 0.0);
    }
}
