//! Error types used by the crate.

use meridian_types::MeridianTypesError;
use thiserror::Error;

/// Meridian error type.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// Tile data does not have the structure of a GeoJSON feature collection.
    #[error("malformed tile data: {0}")]
    MalformedInput(String),
    /// Geometry or projection error.
    #[error(transparent)]
    Types(#[from] MeridianTypesError),
    /// Quadkey string contains characters other than `0..=3`.
    #[error("invalid quadkey: {0:?}")]
    InvalidQuadkey(String),
    /// Color string is not a `#RRGGBB` or `#RRGGBBAA` hex value.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
    /// Tile URL template cannot be expanded.
    #[error("invalid tile url template: {0}")]
    Template(String),
    /// Tileset configuration is inconsistent.
    #[error("invalid tileset {key:?}: {reason}")]
    InvalidTileset {
        /// Key of the tileset.
        key: String,
        /// Description of the problem.
        reason: String,
    },
    /// Configuration cannot be parsed.
    #[error("failed to parse configuration")]
    Config(#[from] serde_json::Error),
    /// Item not found.
    #[error("item not found: {0}")]
    NotFound(String),
}
