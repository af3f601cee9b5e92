//! Types and functions on geometries in cartesian coordinates.

mod point;
mod rect;

pub use point::{CartesianPoint2d, NewCartesianPoint2d};
pub use rect::Rect;

pub use nalgebra::{Point2, Vector2};
