//! Slippy-map tile addressing: [`TileIndex`], quadkeys and tile URL templates.

use std::collections::HashMap;

use meridian_types::projection::{self, TilePixelProjector};
use meridian_types::{BoundingBox, GeoPoint};
use serde::{Deserialize, Serialize};

use crate::error::MeridianError;

/// Index of a 256x256 tile in the slippy-map scheme.
///
/// Tile `(0, 0)` is in the top-left (north-west) corner of the map. At zoom level `z` both indices
/// are in range `0..2^z`.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    /// X index.
    pub x: u32,
    /// Y index.
    pub y: u32,
    /// Z index.
    pub z: u32,
}

impl TileIndex {
    /// Deepest zoom level addressable by quadkeys and `u32` indices.
    pub const MAX_ZOOM: u32 = 32;

    /// Create a new index instance.
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Returns true if both `x` and `y` are in range `0..2^z`.
    pub fn is_valid(&self) -> bool {
        match 1u64.checked_shl(self.z) {
            Some(count) => u64::from(self.x) < count && u64::from(self.y) < count,
            None => false,
        }
    }

    /// Bing-style quadkey of the tile.
    ///
    /// Every zoom level adds one base-4 digit `2 * y_bit + x_bit`, starting from the most
    /// significant level. The quadkey of the zoom 0 tile is an empty string.
    ///
    /// Levels above the 32 bits of the coordinates produce `0` digits.
    ///
    /// ```
    /// use meridian::tile_schema::TileIndex;
    ///
    /// assert_eq!(TileIndex::new(5, 2, 3).quadkey(), "121");
    /// ```
    pub fn quadkey(&self) -> String {
        (1..=self.z)
            .rev()
            .map(|level| {
                let bit = |v: u32| v.checked_shr(level - 1).is_some_and(|v| v & 1 == 1);
                let x_bit = bit(self.x);
                let y_bit = bit(self.y);
                match (y_bit, x_bit) {
                    (false, false) => '0',
                    (false, true) => '1',
                    (true, false) => '2',
                    (true, true) => '3',
                }
            })
            .collect()
    }

    /// Parses a quadkey into a tile index. The zoom level is the length of the quadkey.
    pub fn from_quadkey(quadkey: &str) -> Result<Self, MeridianError> {
        if quadkey.len() > Self::MAX_ZOOM as usize {
            return Err(MeridianError::InvalidQuadkey(quadkey.to_string()));
        }

        let mut x = 0u32;
        let mut y = 0u32;
        for digit in quadkey.chars() {
            let value = match digit {
                '0'..='3' => digit as u32 - '0' as u32,
                _ => return Err(MeridianError::InvalidQuadkey(quadkey.to_string())),
            };

            x = (x << 1) | (value & 1);
            y = (y << 1) | (value >> 1);
        }

        Ok(Self::new(x, y, quadkey.len() as u32))
    }

    /// Geographic bounds of the tile.
    pub fn bounding_box(&self) -> BoundingBox {
        let (max_lat, min_lon) = projection::unproject(self.x as f64, self.y as f64, self.z);
        let (min_lat, max_lon) =
            projection::unproject(self.x as f64 + 1.0, self.y as f64 + 1.0, self.z);

        let mut bbox = BoundingBox::new();
        bbox.add_point(&GeoPoint::latlon(max_lat, min_lon));
        bbox.add_point(&GeoPoint::latlon(min_lat, max_lon));
        bbox
    }

    /// Projector converting geographic coordinates into the pixel space of this tile.
    pub fn projector(&self) -> TilePixelProjector {
        TilePixelProjector::new(self.z, self.x, self.y)
    }
}

/// Inclusive tile ranges `(x_min, y_min, x_max, y_max)` covering the box.
fn tile_bounds(bbox: &BoundingBox, zoom: u32) -> Option<(u32, u32, u32, u32)> {
    if !bbox.is_valid() {
        return None;
    }

    let tile_range = |lat: f64, lon: f64| {
        let lat = projection::clamp_latitude(lat);
        let max_index = projection::tiles_count(zoom) - 1.0;
        let (x, y) = projection::project(lat, lon.clamp(-180.0, 180.0), zoom).unwrap_or_default();
        (
            x.floor().clamp(0.0, max_index) as u32,
            y.floor().clamp(0.0, max_index) as u32,
        )
    };

    let (x_min, y_min) = tile_range(bbox.max_lat(), bbox.min_lon());
    let (x_max, y_max) = tile_range(bbox.min_lat(), bbox.max_lon());
    Some((x_min, y_min, x_max, y_max))
}

/// Number of tiles [`tiles_for_bbox`] returns for the box, saturating at `u64::MAX`. Useful to
/// check the size of a request before listing the tiles.
pub fn tiles_count_for_bbox(bbox: &BoundingBox, zoom: u32) -> u64 {
    match tile_bounds(bbox, zoom) {
        Some((x_min, y_min, x_max, y_max)) => (u64::from(x_max - x_min) + 1)
            .saturating_mul(u64::from(y_max - y_min) + 1),
        None => 0,
    }
}

/// Returns the indices of all tiles at the given zoom level that cover the bounding box, row by
/// row. Latitudes outside the projection domain are clamped. An invalid box is covered by no tiles.
pub fn tiles_for_bbox(bbox: &BoundingBox, zoom: u32) -> Vec<TileIndex> {
    const MAX_PREALLOCATED: u64 = 1 << 16;

    let Some((x_min, y_min, x_max, y_max)) = tile_bounds(bbox, zoom) else {
        return vec![];
    };

    let count = tiles_count_for_bbox(bbox, zoom).min(MAX_PREALLOCATED);
    let mut tiles = Vec::with_capacity(count as usize);
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            tiles.push(TileIndex::new(x, y, zoom));
        }
    }

    log::trace!("{} tiles at zoom {zoom} cover the box", tiles.len());
    tiles
}

/// Template of tile URLs.
///
/// Supported placeholders are `{z}`, `{x}`, `{y}`, `{quadkey}` and `{s}`. The subdomain `{s}` is
/// selected deterministically from the tile index, so the same tile is always requested from the
/// same server.
///
/// ```
/// use meridian::tile_schema::{TileIndex, TileUrlTemplate};
///
/// let template = TileUrlTemplate::new("https://{s}.tile.example.org/{z}/{x}/{y}.json")
///     .with_subdomains(["a", "b", "c"]);
/// let url = template.url(TileIndex::new(3, 5, 4))?;
/// assert_eq!(url, "https://c.tile.example.org/4/3/5.json");
/// # Ok::<(), meridian::error::MeridianError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileUrlTemplate {
    template: String,
    #[serde(default)]
    subdomains: Vec<String>,
}

impl TileUrlTemplate {
    /// Creates a template without subdomains.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: vec![],
        }
    }

    /// Sets the subdomains substituted for the `{s}` placeholder.
    pub fn with_subdomains<S: Into<String>>(mut self, subdomains: impl IntoIterator<Item = S>) -> Self {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Expands the template for the given tile.
    pub fn url(&self, index: TileIndex) -> Result<String, MeridianError> {
        let mut vars = HashMap::with_capacity(5);
        vars.insert("z".to_string(), index.z.to_string());
        vars.insert("x".to_string(), index.x.to_string());
        vars.insert("y".to_string(), index.y.to_string());
        vars.insert("quadkey".to_string(), index.quadkey());

        if !self.subdomains.is_empty() {
            let selector = (u64::from(index.x) + u64::from(index.y)) % self.subdomains.len() as u64;
            vars.insert("s".to_string(), self.subdomains[selector as usize].clone());
        }

        strfmt::strfmt(&self.template, &vars).map_err(|err| MeridianError::Template(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn quadkeys() {
        assert_eq!(TileIndex::new(0, 0, 0).quadkey(), "");
        assert_eq!(TileIndex::new(1, 1, 1).quadkey(), "3");
        assert_eq!(TileIndex::new(0, 0, 2).quadkey(), "00");
        assert_eq!(TileIndex::new(5, 2, 3).quadkey(), "121");
        assert_eq!(TileIndex::new(3, 5, 3).quadkey(), "213");
    }

    #[test]
    fn quadkey_beyond_coordinate_bits() {
        let quadkey = TileIndex::new(1, 1, 70).quadkey();
        assert_eq!(quadkey.len(), 70);
        assert!(quadkey[..69].chars().all(|c| c == '0'));
        assert!(quadkey.ends_with('3'));

        let quadkey = TileIndex::new(u32::MAX, 0, 40).quadkey();
        assert!(quadkey[..8].chars().all(|c| c == '0'));
        assert!(quadkey[8..].chars().all(|c| c == '1'));
    }

    #[test]
    fn quadkey_parsing() {
        assert_eq!(TileIndex::from_quadkey("121").unwrap(), TileIndex::new(5, 2, 3));
        assert_eq!(TileIndex::from_quadkey("").unwrap(), TileIndex::new(0, 0, 0));

        for index in [
            TileIndex::new(19295, 24640, 16),
            TileIndex::new(0, 1, 1),
            TileIndex::new(1023, 0, 10),
        ] {
            assert_eq!(TileIndex::from_quadkey(&index.quadkey()).unwrap(), index);
        }

        assert_matches!(
            TileIndex::from_quadkey("1241"),
            Err(MeridianError::InvalidQuadkey(_))
        );
    }

    #[test]
    fn index_validity() {
        assert!(TileIndex::new(0, 0, 0).is_valid());
        assert!(!TileIndex::new(1, 0, 0).is_valid());
        assert!(TileIndex::new(3, 3, 2).is_valid());
        assert!(!TileIndex::new(3, 4, 2).is_valid());
    }

    #[test]
    fn tile_bounds() {
        let bbox = TileIndex::new(0, 0, 0).bounding_box();
        assert_abs_diff_eq!(bbox.min_lon(), -180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.max_lon(), 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.max_lat(), projection::MAX_LATITUDE, epsilon = 1e-6);
        assert_abs_diff_eq!(bbox.min_lat(), -projection::MAX_LATITUDE, epsilon = 1e-6);

        let bbox = TileIndex::new(1, 0, 1).bounding_box();
        assert_abs_diff_eq!(bbox.min_lon(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.min_lat(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn tiles_covering_bbox() {
        let bbox = BoundingBox::from_limits(-10.0, -10.0, 10.0, 10.0).unwrap();
        let tiles = tiles_for_bbox(&bbox, 1);
        assert_eq!(
            tiles,
            vec![
                TileIndex::new(0, 0, 1),
                TileIndex::new(1, 0, 1),
                TileIndex::new(0, 1, 1),
                TileIndex::new(1, 1, 1),
            ]
        );

        let index = TileIndex::new(19295, 24640, 16);
        let tile_bbox = index.bounding_box().scale(0.5);
        assert_eq!(tiles_for_bbox(&tile_bbox, 16), vec![index]);

        assert!(tiles_for_bbox(&BoundingBox::new(), 3).is_empty());
    }

    #[test]
    fn tile_count_of_large_boxes() {
        let world = BoundingBox::from_limits(-90.0, -180.0, 90.0, 180.0).unwrap();
        assert_eq!(tiles_count_for_bbox(&world, 0), 1);
        assert_eq!(tiles_count_for_bbox(&world, 16), 1 << 32);
        assert_eq!(tiles_count_for_bbox(&world, 32), u64::MAX);
        assert_eq!(tiles_count_for_bbox(&BoundingBox::new(), 16), 0);

        let strip = BoundingBox::from_limits(10.0, -180.0, 10.0, 180.0).unwrap();
        assert_eq!(tiles_count_for_bbox(&strip, 32), 1 << 32);

        let bbox = BoundingBox::from_limits(-10.0, -10.0, 10.0, 10.0).unwrap();
        assert_eq!(tiles_count_for_bbox(&bbox, 5), tiles_for_bbox(&bbox, 5).len() as u64);
    }

    #[test]
    fn polar_bbox_is_clamped() {
        let bbox = BoundingBox::from_limits(80.0, -180.0, 90.0, 180.0).unwrap();
        let tiles = tiles_for_bbox(&bbox, 2);
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| t.y == 0 && t.is_valid()));
    }

    #[test]
    fn url_template() {
        let template = TileUrlTemplate::new("https://tiles.example.org/{z}/{x}/{y}.geojson");
        assert_eq!(
            template.url(TileIndex::new(8802, 5373, 14)).unwrap(),
            "https://tiles.example.org/14/8802/5373.geojson"
        );

        let template = TileUrlTemplate::new("https://t{s}.example.org/tiles/{quadkey}.json")
            .with_subdomains(["0", "1", "2", "3"]);
        assert_eq!(
            template.url(TileIndex::new(5, 2, 3)).unwrap(),
            "https://t3.example.org/tiles/121.json"
        );
    }

    #[test]
    fn subdomain_without_list_fails() {
        let template = TileUrlTemplate::new("https://{s}.example.org/{z}/{x}/{y}");
        assert_matches!(
            template.url(TileIndex::new(0, 0, 0)),
            Err(MeridianError::Template(_))
        );
    }

    #[test]
    fn template_from_config() {
        let template: TileUrlTemplate = serde_json::from_str(
            r#"{"template": "https://{s}.example.org/{z}/{x}/{y}", "subdomains": ["a", "b"]}"#,
        )
        .unwrap();
        assert_eq!(
            template.url(TileIndex::new(1, 0, 1)).unwrap(),
            "https://b.example.org/1/1/0"
        );
    }
}
