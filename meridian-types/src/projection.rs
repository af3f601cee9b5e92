//! Web Mercator projection into the slippy-map tile space.
//!
//! At zoom `z` the world is split into `2^z x 2^z` tiles of [`TILE_SIZE`] pixels. Tile space
//! coordinates are fractional tile indices: integer parts select a tile, fractional parts give the
//! position inside it. Tile-pixel coordinates are local to one tile with `(0, 0)` at its top-left
//! corner.

use std::f64::consts::PI;

use nalgebra::Point2;

use crate::error::MeridianTypesError;

/// Maximum latitude representable in the Web Mercator tile space.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Size of a tile side in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Returns the number of tiles along one axis at the given zoom level.
pub fn tiles_count(zoom: u32) -> f64 {
    2f64.powi(zoom as i32)
}

/// Clamps latitude into the projection domain.
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

fn check_latitude(lat: f64) -> Result<(), MeridianTypesError> {
    if lat.is_finite() && lat.abs() <= MAX_LATITUDE {
        Ok(())
    } else {
        Err(MeridianTypesError::OutOfRange(lat))
    }
}

/// Projects geographic coordinates into fractional tile indices at the given zoom.
pub fn project(lat: f64, lon: f64, zoom: u32) -> Result<(f64, f64), MeridianTypesError> {
    check_latitude(lat)?;

    let n = tiles_count(zoom);
    let lat_rad = lat.to_radians();
    let x = (lon + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;

    Ok((x, y))
}

/// Inverse of [`project`]: converts fractional tile indices into `(lat, lon)`.
pub fn unproject(x: f64, y: f64, zoom: u32) -> (f64, f64) {
    let n = tiles_count(zoom);
    let lon = x / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();

    (lat, lon)
}

/// Projects geographic coordinates into pixel coordinates local to the tile `(tile_x, tile_y)`.
///
/// This is the reference implementation. Rendering code projecting many vertices of one tile
/// should use [`TilePixelProjector`] instead.
pub fn project_to_tile_pixel(
    lat: f64,
    lon: f64,
    zoom: u32,
    tile_x: u32,
    tile_y: u32,
) -> Result<(f64, f64), MeridianTypesError> {
    let (x, y) = project(lat, lon, zoom)?;
    Ok((
        (x - tile_x as f64) * TILE_SIZE,
        (y - tile_y as f64) * TILE_SIZE,
    ))
}

/// Projector into the pixel space of one tile.
///
/// All zoom and tile dependent factors are computed once on construction, so projecting a vertex
/// costs one multiply-add for `x` and one logarithm for `y`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TilePixelProjector {
    x_scale: f64,
    x_offset: f64,
    y_scale: f64,
    y_offset: f64,
}

impl TilePixelProjector {
    /// Creates a projector for the tile `(tile_x, tile_y)` at the given zoom.
    pub fn new(zoom: u32, tile_x: u32, tile_y: u32) -> Self {
        let world_size = tiles_count(zoom) * TILE_SIZE;
        let x_scale = world_size / 360.0;
        let half_world = world_size / 2.0;

        Self {
            x_scale,
            x_offset: 180.0 * x_scale - tile_x as f64 * TILE_SIZE,
            y_scale: half_world / PI,
            y_offset: half_world - tile_y as f64 * TILE_SIZE,
        }
    }

    /// Projects a point into tile pixels. Fails if the latitude is outside of the projection
    /// domain.
    pub fn project(&self, lat: f64, lon: f64) -> Result<Point2<f64>, MeridianTypesError> {
        check_latitude(lat)?;
        Ok(self.project_unchecked(lat, lon))
    }

    /// Projects a point into tile pixels, clamping the latitude into the projection domain first.
    pub fn project_clamped(&self, lat: f64, lon: f64) -> Point2<f64> {
        self.project_unchecked(clamp_latitude(lat), lon)
    }

    fn project_unchecked(&self, lat: f64, lon: f64) -> Point2<f64> {
        let lat_rad = lat.to_radians();
        let merc = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();

        Point2::new(
            lon * self.x_scale + self.x_offset,
            self.y_offset - merc * self.y_scale,
        )
    }

    /// Converts tile pixel coordinates back into `(lat, lon)`.
    pub fn unproject(&self, px: f64, py: f64) -> (f64, f64) {
        let lon = (px - self.x_offset) / self.x_scale;
        let merc = (self.y_offset - py) / self.y_scale;
        let lat = merc.sinh().atan().to_degrees();

        (lat, lon)
    }
}
