//! Geometry primitives and tile-space projection used by the `meridian` rendering core.
//!
//! The crate contains pure value types and algorithms:
//!
//! * [`GeoPoint`] and [`BoundingBox`] for geographic coordinates,
//! * [`LineString`] and [`Polygon`] generic over any [`CartesianPoint2d`], so the same algorithms
//!   work both for geographic points and for projected tile-pixel points,
//! * [`projection`] functions converting between latitude/longitude and the Web Mercator tile
//!   space,
//! * [`simplify`](simplify::simplify) - Douglas-Peucker line simplification.

pub mod bounding_box;
pub mod cartesian;
pub mod error;
pub mod geo;
pub mod line_string;
pub mod polygon;
pub mod projection;
pub mod segment;
pub mod simplify;

pub use bounding_box::BoundingBox;
pub use cartesian::{CartesianPoint2d, NewCartesianPoint2d, Point2, Rect, Vector2};
pub use error::MeridianTypesError;
pub use geo::GeoPoint;
pub use line_string::LineString;
pub use polygon::Polygon;
pub use segment::Segment;
