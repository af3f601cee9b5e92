//! Geographic bounding box accumulator.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::polygon::Polygon;

/// Minimum and maximum latitude and longitude of a set of points.
///
/// A new box is empty (invalid) and grows with every added point or box. An invalid box contains
/// nothing and overlaps nothing.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
    valid: bool,
}

impl BoundingBox {
    /// Creates an empty box.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a box with the given limits. Returns `None` if minimums are greater than maximums.
    pub fn from_limits(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Option<Self> {
        if min_lat > max_lat || min_lon > max_lon {
            return None;
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            valid: true,
        })
    }

    /// Creates a box containing all the given points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Self {
        let mut bbox = Self::new();
        for p in points {
            bbox.add_point(p);
        }

        bbox
    }

    /// Whether at least one point was added to the box.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Minimum latitude.
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    /// Maximum latitude.
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// Minimum longitude.
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    /// Maximum longitude.
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// Longitude span.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Latitude span.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Grows the box to include the point.
    pub fn add_point(&mut self, point: &GeoPoint) {
        if !self.valid {
            self.min_lat = point.lat();
            self.max_lat = point.lat();
            self.min_lon = point.lon();
            self.max_lon = point.lon();
            self.valid = true;
            return;
        }

        self.min_lat = self.min_lat.min(point.lat());
        self.max_lat = self.max_lat.max(point.lat());
        self.min_lon = self.min_lon.min(point.lon());
        self.max_lon = self.max_lon.max(point.lon());
    }

    /// Grows the box to include the other box. Invalid boxes are ignored.
    pub fn add_bbox(&mut self, other: &BoundingBox) {
        if !other.valid {
            return;
        }

        self.add_point(&GeoPoint::latlon(other.min_lat, other.min_lon));
        self.add_point(&GeoPoint::latlon(other.max_lat, other.max_lon));
    }

    /// Returns true if the point is inside the box or on its border.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.valid
            && self.min_lat <= point.lat()
            && point.lat() <= self.max_lat
            && self.min_lon <= point.lon()
            && point.lon() <= self.max_lon
    }

    /// Returns true if the boxes have at least one common point.
    ///
    /// The boxes overlap when on both axes the distance between their centers is not larger than
    /// the sum of their half-sizes, so boxes touching by an edge overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        if !self.valid || !other.valid {
            return false;
        }

        let d_lat = (self.min_lat + self.max_lat) - (other.min_lat + other.max_lat);
        let d_lon = (self.min_lon + self.max_lon) - (other.min_lon + other.max_lon);

        d_lat.abs() <= self.height() + other.height() && d_lon.abs() <= self.width() + other.width()
    }

    /// Center of the box. `None` for an invalid box.
    pub fn center(&self) -> Option<GeoPoint> {
        if !self.valid {
            return None;
        }

        Some(GeoPoint::latlon(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        ))
    }

    /// Returns a box with the same center and sizes multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        if !self.valid {
            return *self;
        }

        let half_height = self.height() / 2.0 * factor;
        let half_width = self.width() / 2.0 * factor;
        let c_lat = (self.min_lat + self.max_lat) / 2.0;
        let c_lon = (self.min_lon + self.max_lon) / 2.0;

        Self {
            min_lat: c_lat - half_height,
            max_lat: c_lat + half_height,
            min_lon: c_lon - half_width,
            max_lon: c_lon + half_width,
            valid: true,
        }
    }

    /// Converts the box into a rectangular polygon. `None` for an invalid box.
    pub fn to_polygon(&self) -> Option<Polygon<GeoPoint>> {
        if !self.valid {
            return None;
        }

        Polygon::new(
            vec![
                GeoPoint::latlon(self.min_lat, self.min_lon),
                GeoPoint::latlon(self.max_lat, self.min_lon),
                GeoPoint::latlon(self.max_lat, self.max_lon),
                GeoPoint::latlon(self.min_lat, self.max_lon),
            ],
            vec![],
        )
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::latlon;

    fn bbox(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> BoundingBox {
        BoundingBox::from_limits(min_lat, min_lon, max_lat, max_lon).unwrap()
    }

    #[test]
    fn empty_box_is_invalid() {
        let bbox = BoundingBox::new();
        assert!(!bbox.is_valid());
        assert!(!bbox.contains(&latlon!(0.0, 0.0)));
        assert!(!bbox.overlaps(&bbox));
        assert!(bbox.center().is_none());
    }

    #[test]
    fn grows_with_points() {
        let mut bbox = BoundingBox::new();
        bbox.add_point(&latlon!(10.0, 20.0));
        assert!(bbox.is_valid());
        assert_eq!(bbox.min_lat(), 10.0);
        assert_eq!(bbox.max_lon(), 20.0);

        bbox.add_point(&latlon!(-5.0, 30.0));
        bbox.add_point(&latlon!(3.0, 25.0));
        assert_eq!(bbox, self::bbox(-5.0, 20.0, 10.0, 30.0));

        let mut other = self::bbox(0.0, 0.0, 1.0, 1.0);
        other.add_bbox(&bbox);
        assert_eq!(other, self::bbox(-5.0, 0.0, 10.0, 30.0));

        other.add_bbox(&BoundingBox::new());
        assert_eq!(other, self::bbox(-5.0, 0.0, 10.0, 30.0));
    }

    #[test]
    fn overlaps_is_symmetric() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let cases = [
            (bbox(5.0, 5.0, 15.0, 15.0), true),
            (bbox(2.0, 2.0, 3.0, 3.0), true),
            (bbox(10.0, 0.0, 20.0, 10.0), true),
            (bbox(10.0, 10.0, 11.0, 11.0), true),
            (bbox(10.1, 0.0, 20.0, 10.0), false),
            (bbox(-5.0, 11.0, 5.0, 12.0), false),
        ];

        assert!(a.overlaps(&a));
        for (b, expected) in cases {
            assert_eq!(a.overlaps(&b), expected, "{b:?}");
            assert_eq!(b.overlaps(&a), expected, "{b:?}");
        }
    }

    #[test]
    fn scale_about_center() {
        let bbox = bbox(0.0, 0.0, 10.0, 20.0);
        let scaled = bbox.scale(2.0);
        assert_relative_eq!(scaled.min_lat(), -5.0);
        assert_relative_eq!(scaled.max_lat(), 15.0);
        assert_relative_eq!(scaled.min_lon(), -10.0);
        assert_relative_eq!(scaled.max_lon(), 30.0);
        assert_eq!(scaled.center(), bbox.center());
    }

    #[test]
    fn to_polygon() {
        let polygon = bbox(0.0, 0.0, 2.0, 3.0).to_polygon().unwrap();
        assert_eq!(polygon.outer().len(), 4);
        assert_relative_eq!(polygon.area(), 6.0);
        assert_eq!(bbox(0.0, 0.0, 0.0, 3.0).to_polygon().unwrap().area(), 0.0);
        assert!(BoundingBox::new().to_polygon().is_none());
    }
}
