//! Geographic point.

use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, NewCartesianPoint2d};

/// Point on the WGS84 ellipsoid given by latitude and longitude in degrees.
///
/// Points are plain immutable values compared by exact coordinate equality.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude.
    pub const fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Creates a point from longitude and latitude, in the order used by GeoJSON positions.
    pub const fn lonlat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in radians.
    pub fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    /// Longitude in radians.
    pub fn lon_rad(&self) -> f64 {
        self.lon.to_radians()
    }
}

impl CartesianPoint2d for GeoPoint {
    fn x(&self) -> f64 {
        self.lon
    }

    fn y(&self) -> f64 {
        self.lat
    }
}

impl NewCartesianPoint2d for GeoPoint {
    fn new(x: f64, y: f64) -> Self {
        Self::lonlat(x, y)
    }
}

/// Creates a [`GeoPoint`] from latitude and longitude.
///
/// ```
/// use meridian_types::latlon;
///
/// let point = latlon!(52.52, 13.405);
/// assert_eq!(point.lon(), 13.405);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        $crate::geo::GeoPoint::latlon($lat, $lon)
    };
}
