//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeridianTypesError {
    /// Latitude is outside of the Web Mercator projection domain.
    #[error("latitude {0} is outside of the projection domain (-85.0511..85.0511)")]
    OutOfRange(f64),
    /// Geometry does not satisfy structural requirements.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}
