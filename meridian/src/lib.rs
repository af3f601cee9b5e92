//! Meridian is the rendering core of a desktop mapping toolkit. It turns decoded per-tile GeoJSON
//! into styled draw commands for any 2D drawing surface.
//!
//! # Pipeline
//!
//! * A [`Tileset`](tileset::Tileset) from the [`TilesetRegistry`](tileset::TilesetRegistry)
//!   describes the layers of a tile source. Every [`TileLayer`](tileset::TileLayer) has its own
//!   [`Classifier`](classify::Classifier) deciding which features it renders and with which
//!   [`Style`](style::Style).
//! * The [`loader`] reads a GeoJSON `FeatureCollection`, flattens multi-geometries, projects
//!   vertices into tile pixels and sorts the classified geometry into points, lines and polygons.
//! * The [`label`] module places text labels and route shields.
//! * The [`render`] module resolves zoom-dependent styles and emits the draw commands of all
//!   tiles pass by pass into a [`Surface`](render::Surface).
//!
//! ```
//! use meridian::diagnostics::LogDiagnostics;
//! use meridian::meridian_types::Vector2;
//! use meridian::render::{CommandList, TileRenderer};
//! use meridian::tile_schema::TileIndex;
//! use meridian::tileset::TilesetRegistry;
//! use serde_json::json;
//!
//! let registry = TilesetRegistry::with_builtin();
//! let tileset = registry.get("osm_vector").expect("builtin tileset");
//!
//! let geojson = json!({
//!     "type": "FeatureCollection",
//!     "features": [{
//!         "type": "Feature",
//!         "properties": { "highway": "primary", "name": "Main Street" },
//!         "geometry": { "type": "LineString", "coordinates": [[13.40, 52.52], [13.41, 52.521]] }
//!     }]
//! });
//!
//! let mut diagnostics = LogDiagnostics;
//! let index = TileIndex::new(8802, 5373, 14);
//! let tile = tileset.load_tile(&geojson, index, Vector2::zeros(), &mut diagnostics)?;
//!
//! let mut commands = CommandList::new();
//! TileRenderer::new().render_tiles(&[tile], &mut commands, &mut diagnostics);
//! assert!(commands.strokes().count() > 0);
//! # Ok::<(), meridian::error::MeridianError>(())
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod classify;
mod color;
pub mod diagnostics;
pub mod error;
pub mod label;
pub mod loader;
pub mod render;
pub mod style;
pub mod tile_schema;
pub mod tileset;

pub use color::Color;

// Reexport meridian_types
pub use meridian_types;
