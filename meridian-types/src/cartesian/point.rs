use nalgebra::{Point2, Vector2};

/// A point with two cartesian coordinates.
///
/// Geometry algorithms of this crate are written against this trait, so they can be used both
/// with tile-pixel points ([`Point2`]) and with geographic points ([`GeoPoint`](crate::GeoPoint)),
/// where longitude plays the role of `x` and latitude of `y`.
pub trait CartesianPoint2d {
    /// X coordinate.
    fn x(&self) -> f64;
    /// Y coordinate.
    fn y(&self) -> f64;

    /// Returns true if both coordinates of the points are exactly equal.
    fn equal(&self, other: &impl CartesianPoint2d) -> bool {
        self.x() == other.x() && self.y() == other.y()
    }

    /// Vector from `other` to `self`.
    fn sub(&self, other: &impl CartesianPoint2d) -> Vector2<f64> {
        Vector2::new(self.x() - other.x(), self.y() - other.y())
    }

    /// Squared euclidean distance between the points.
    fn distance_sq(&self, other: &impl CartesianPoint2d) -> f64 {
        let v = self.sub(other);
        v.x * v.x + v.y * v.y
    }

    /// Euclidean distance between the points.
    fn distance(&self, other: &impl CartesianPoint2d) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

/// Cartesian point that can be constructed from its coordinates.
pub trait NewCartesianPoint2d: CartesianPoint2d + Sized {
    /// Creates a new point.
    fn new(x: f64, y: f64) -> Self;
}

impl CartesianPoint2d for Point2<f64> {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl NewCartesianPoint2d for Point2<f64> {
    fn new(x: f64, y: f64) -> Self {
        Point2::new(x, y)
    }
}

impl<T: CartesianPoint2d> CartesianPoint2d for &T {
    fn x(&self) -> f64 {
        (*self).x()
    }

    fn y(&self) -> f64 {
        (*self).y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance_sq(&b), 25.0);
        assert_eq!(b.distance(&a), 5.0);
        assert_eq!(b.sub(&a), Vector2::new(3.0, 4.0));
        assert!(a.equal(&Point2::new(0.0, 0.0)));
        assert!(!a.equal(&b));
    }
}
