//! Tilesets: ordered layers of a tile source together with the way they are classified and drawn.

use std::fmt::{Debug, Formatter};

use meridian_types::Vector2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::osm::{
    AdminBorderClassifier, BuildingClassifier, LanduseClassifier, PlaceClassifier, RoadClassifier,
    WaterClassifier,
};
use crate::classify::{Classifier, RuleClassifier};
use crate::diagnostics::Diagnostics;
use crate::error::MeridianError;
use crate::loader::{self, FeatureCollection, LoadOptions, SortKey, TileGeometry};
use crate::render::{DrawPass, PassComponent};
use crate::tile_schema::{TileIndex, TileUrlTemplate};

/// Credit for the data of a tileset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    text: String,
    #[serde(default)]
    url: Option<String>,
}

impl Attribution {
    /// Creates a new `Attribution` with the given text and optional URL.
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url,
        }
    }

    /// Text of the attribution.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// URL with more information about the source, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Layer of a tileset.
pub struct TileLayer {
    name: String,
    classifier: Box<dyn Classifier>,
    options: LoadOptions,
    passes: Vec<DrawPass>,
    clip_inset: Option<f64>,
}

impl Debug for TileLayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileLayer")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("passes", &self.passes)
            .field("clip_inset", &self.clip_inset)
            .finish_non_exhaustive()
    }
}

impl TileLayer {
    /// Creates a layer with default load options and no passes.
    pub fn new(name: impl Into<String>, classifier: impl Classifier + 'static) -> Self {
        Self {
            name: name.into(),
            classifier: Box::new(classifier),
            options: LoadOptions::default(),
            passes: vec![],
            clip_inset: None,
        }
    }

    /// Sets the options of loading the layer features.
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the sort key of the layer features.
    pub fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.options.sort_key = Some(sort_key);
        self
    }

    /// Sets the simplification tolerance in pixels.
    pub fn with_simplify_tolerance(mut self, tolerance: f64) -> Self {
        self.options.simplify_tolerance = Some(tolerance);
        self
    }

    /// Adds a drawing pass after the already added ones.
    pub fn with_pass(mut self, components: impl IntoIterator<Item = PassComponent>) -> Self {
        self.passes.push(DrawPass::new(components));
        self
    }

    /// Clips everything but labels of the layer to the tile rectangle shrunk by `inset` pixels.
    /// Negative inset extends the clip area past the tile border.
    pub fn with_clip_inset(mut self, inset: f64) -> Self {
        self.clip_inset = Some(inset);
        self
    }

    /// Name of the layer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classifier of the layer features.
    pub fn classifier(&self) -> &dyn Classifier {
        &*self.classifier
    }

    /// Options of loading the layer features.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Drawing passes of the layer.
    pub fn passes(&self) -> &[DrawPass] {
        &self.passes
    }

    /// Clip inset of the layer.
    pub fn clip_inset(&self) -> Option<f64> {
        self.clip_inset
    }

    fn prepare(&self, geometry: TileGeometry) -> PreparedLayer {
        PreparedLayer {
            name: self.name.clone(),
            passes: self.passes.clone(),
            clip_inset: self.clip_inset,
            geometry,
        }
    }
}

/// Configuration of a layer classified with a [`RuleClassifier`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct TileLayerConfig {
    name: String,
    classifier: RuleClassifier,
    #[serde(default)]
    options: LoadOptions,
    passes: Vec<DrawPass>,
    #[serde(default)]
    clip_inset: Option<f64>,
}

impl From<TileLayerConfig> for TileLayer {
    fn from(value: TileLayerConfig) -> Self {
        Self {
            name: value.name,
            classifier: Box::new(value.classifier),
            options: value.options,
            passes: value.passes,
            clip_inset: value.clip_inset,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct TilesetConfig {
    key: String,
    #[serde(default)]
    name: Option<String>,
    url: TileUrlTemplate,
    #[serde(default)]
    min_zoom: Option<u32>,
    #[serde(default)]
    max_zoom: Option<u32>,
    #[serde(default)]
    attribution: Option<Attribution>,
    layers: Vec<TileLayerConfig>,
}

/// Source of vector tiles with the ordered layers drawn from it.
///
/// Layers are drawn in the order they were added: passes of the tileset are the passes of the
/// first layer, then of the second one and so on.
#[derive(Debug)]
pub struct Tileset {
    key: String,
    name: String,
    url_template: TileUrlTemplate,
    min_zoom: u32,
    max_zoom: u32,
    attribution: Option<Attribution>,
    layers: Vec<TileLayer>,
}

impl Tileset {
    /// Starts building a tileset.
    ///
    /// ```
    /// use meridian::classify::osm::RoadClassifier;
    /// use meridian::render::PassComponent;
    /// use meridian::tile_schema::TileUrlTemplate;
    /// use meridian::tileset::{TileLayer, Tileset};
    ///
    /// let tileset = Tileset::builder("roads", TileUrlTemplate::new("https://tiles/{z}/{x}/{y}.json"))
    ///     .with_zoom_range(5, 16)
    ///     .with_layer(
    ///         TileLayer::new("roads", RoadClassifier::new())
    ///             .with_pass([PassComponent::Underline])
    ///             .with_pass([PassComponent::Line, PassComponent::Overline]),
    ///     )
    ///     .build()?;
    ///
    /// assert_eq!(tileset.name(), "roads");
    /// assert_eq!(tileset.passes().count(), 2);
    /// # Ok::<(), meridian::error::MeridianError>(())
    /// ```
    pub fn builder(key: impl Into<String>, url_template: TileUrlTemplate) -> TilesetBuilder {
        TilesetBuilder::new(key, url_template)
    }

    /// Parses a tileset whose layers are classified by [`RuleClassifier`]s from its JSON
    /// configuration.
    pub fn from_json(json: &str) -> Result<Self, MeridianError> {
        let config: TilesetConfig = serde_json::from_str(json)?;
        let mut builder = Self::builder(config.key, config.url);
        if let Some(name) = config.name {
            builder = builder.with_name(name);
        }
        if let Some(attribution) = config.attribution {
            builder = builder.with_attribution(attribution);
        }
        builder.min_zoom = config.min_zoom.unwrap_or(builder.min_zoom);
        builder.max_zoom = config.max_zoom.unwrap_or(builder.max_zoom);
        for layer in config.layers {
            builder = builder.with_layer(layer.into());
        }

        builder.build()
    }

    /// Key of the tileset in a registry.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template of the tile URLs.
    pub fn url_template(&self) -> &TileUrlTemplate {
        &self.url_template
    }

    /// Minimum zoom level with data.
    pub fn min_zoom(&self) -> u32 {
        self.min_zoom
    }

    /// Maximum zoom level with data.
    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// Data attribution.
    pub fn attribution(&self) -> Option<&Attribution> {
        self.attribution.as_ref()
    }

    /// Layers in drawing order.
    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    /// Returns the layer with the given name.
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// All passes of the tileset in drawing order.
    pub fn passes(&self) -> impl Iterator<Item = &DrawPass> {
        self.layers.iter().flat_map(|layer| layer.passes.iter())
    }

    /// Returns true if the tileset has data for the tile.
    pub fn has_tile(&self, index: TileIndex) -> bool {
        index.is_valid() && (self.min_zoom..=self.max_zoom).contains(&index.z)
    }

    /// URL of the tile. Tiles the tileset has no data for are reported as
    /// [`MeridianError::NotFound`].
    pub fn tile_url(&self, index: TileIndex) -> Result<String, MeridianError> {
        if !self.has_tile(index) {
            return Err(MeridianError::NotFound(format!(
                "tile {}/{}/{} in tileset {}",
                index.z, index.x, index.y, self.key
            )));
        }

        self.url_template.url(index)
    }

    /// Loads a decoded GeoJSON tile for drawing at `origin` of the target surface.
    ///
    /// The tile is either one `FeatureCollection` shared by all layers, or a non-empty object whose
    /// every member is a `FeatureCollection` named after a layer. Layers missing from such an
    /// object are empty in the tile. Anything else must be a valid `FeatureCollection`, otherwise
    /// [`MeridianError::MalformedInput`] is returned. A shared collection is parsed once, so its
    /// malformed features are reported once.
    pub fn load_tile(
        &self,
        geojson: &Value,
        index: TileIndex,
        origin: Vector2<f64>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<PreparedTile, MeridianError> {
        if !index.is_valid() {
            return Err(MeridianError::MalformedInput(format!(
                "tile index {}/{}/{} is outside of the tile grid",
                index.z, index.x, index.y
            )));
        }

        let source = match layered_collections(geojson) {
            Some(object) => TileSource::Layered(object),
            None => TileSource::Shared(FeatureCollection::parse(geojson, diagnostics)?),
        };

        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let geometry = match &source {
                TileSource::Shared(collection) => loader::load_collection(
                    collection,
                    index,
                    layer.classifier(),
                    &layer.options,
                    diagnostics,
                ),
                TileSource::Layered(object) => match object.get(&layer.name) {
                    Some(collection) => loader::load_tile(
                        collection,
                        index,
                        layer.classifier(),
                        &layer.options,
                        diagnostics,
                    )?,
                    None => {
                        log::trace!("Layer {} is absent from tile {index:?}", layer.name);
                        TileGeometry::empty(index)
                    }
                },
            };

            layers.push(layer.prepare(geometry));
        }

        log::debug!(
            "Loaded tile {index:?} of tileset {} with {} layers",
            self.key,
            layers.len()
        );

        Ok(PreparedTile {
            index,
            origin,
            layers,
        })
    }
}

/// Builder of a [`Tileset`].
#[derive(Debug)]
pub struct TilesetBuilder {
    key: String,
    name: Option<String>,
    url_template: TileUrlTemplate,
    min_zoom: u32,
    max_zoom: u32,
    attribution: Option<Attribution>,
    layers: Vec<TileLayer>,
}

impl TilesetBuilder {
    fn new(key: impl Into<String>, url_template: TileUrlTemplate) -> Self {
        Self {
            key: key.into(),
            name: None,
            url_template,
            min_zoom: 0,
            max_zoom: 18,
            attribution: None,
            layers: vec![],
        }
    }

    /// Sets the human-readable name. Defaults to the key.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the zoom levels the tileset has data for.
    pub fn with_zoom_range(mut self, min_zoom: u32, max_zoom: u32) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Sets the data attribution.
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Adds a layer drawn above the already added ones.
    pub fn with_layer(mut self, layer: TileLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Consumes the builder and constructs the tileset.
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::InvalidTileset`] if the zoom range is empty or exceeds the tile
    /// grid, if there are no layers, or if two layers share a name.
    pub fn build(self) -> Result<Tileset, MeridianError> {
        let invalid = |reason: String| MeridianError::InvalidTileset {
            key: self.key.clone(),
            reason,
        };

        if self.min_zoom > self.max_zoom || self.max_zoom > TileIndex::MAX_ZOOM {
            return Err(invalid(format!(
                "invalid zoom range {}..={}",
                self.min_zoom, self.max_zoom
            )));
        }

        if self.layers.is_empty() {
            return Err(invalid("tileset has no layers".into()));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if self.layers[..i].iter().any(|other| other.name == layer.name) {
                return Err(invalid(format!("duplicate layer {}", layer.name)));
            }
        }

        Ok(Tileset {
            name: self.name.unwrap_or_else(|| self.key.clone()),
            key: self.key,
            url_template: self.url_template,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            attribution: self.attribution,
            layers: self.layers,
        })
    }
}

/// Layer of a loaded tile.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLayer {
    /// Name of the layer.
    pub name: String,
    /// Drawing passes of the layer.
    pub passes: Vec<DrawPass>,
    /// Clip inset of the layer, see [`TileLayer::with_clip_inset`].
    pub clip_inset: Option<f64>,
    /// Classified and projected features.
    pub geometry: TileGeometry,
}

enum TileSource<'a> {
    Shared(FeatureCollection),
    Layered(&'a Map<String, Value>),
}

/// Returns the object if it maps layer names to feature collections. Any other input is read as
/// one shared collection.
fn layered_collections(geojson: &Value) -> Option<&Map<String, Value>> {
    let object = geojson.as_object()?;
    let is_collection =
        |value: &Value| value.get("type").and_then(Value::as_str) == Some("FeatureCollection");

    (!object.is_empty() && !object.contains_key("type") && object.values().all(is_collection))
        .then_some(object)
}

/// Tile loaded by [`Tileset::load_tile`] and ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTile {
    /// Index of the tile.
    pub index: TileIndex,
    /// Position of the top left corner of the tile on the target surface.
    pub origin: Vector2<f64>,
    /// Layers in drawing order.
    pub layers: Vec<PreparedLayer>,
}

impl PreparedTile {
    /// Passes of the tile in drawing order together with the layers they draw.
    pub fn passes(&self) -> impl Iterator<Item = (&PreparedLayer, &DrawPass)> {
        self.layers
            .iter()
            .flat_map(|layer| layer.passes.iter().map(move |pass| (layer, pass)))
    }

    /// Returns the layer with the given name.
    pub fn layer(&self, name: &str) -> Option<&PreparedLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }
}

/// Tilesets available to the application, built once at startup.
#[derive(Debug, Default)]
pub struct TilesetRegistry {
    tilesets: Vec<Tileset>,
}

impl TilesetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in tilesets.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(osm_vector());
        registry
    }

    /// Adds a tileset. A tileset with the same key is replaced and returned.
    pub fn insert(&mut self, tileset: Tileset) -> Option<Tileset> {
        match self.tilesets.iter_mut().find(|t| t.key == tileset.key) {
            Some(existing) => Some(std::mem::replace(existing, tileset)),
            None => {
                self.tilesets.push(tileset);
                None
            }
        }
    }

    /// Returns the tileset with the given key.
    pub fn get(&self, key: &str) -> Option<&Tileset> {
        self.tilesets.iter().find(|tileset| tileset.key == key)
    }

    /// Returns the tileset with the given key or [`MeridianError::NotFound`].
    pub fn tileset(&self, key: &str) -> Result<&Tileset, MeridianError> {
        self.get(key)
            .ok_or_else(|| MeridianError::NotFound(format!("tileset {key}")))
    }

    /// Keys of the registered tilesets in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tilesets.iter().map(|tileset| tileset.key.as_str())
    }

    /// Number of registered tilesets.
    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    /// Returns true if no tileset is registered.
    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }
}

/// Default URL of the built-in OSM vector tileset. Points to a locally running tile server.
pub const OSM_VECTOR_URL: &str = "http://localhost:8080/osm/{z}/{x}/{y}.geojson";

/// Built-in tileset of OpenStreetMap data with the layers `landuse`, `water`, `buildings`,
/// `admin`, `roads` and `places`.
pub fn osm_vector() -> Tileset {
    use PassComponent::*;

    let landuse = TileLayer::new("landuse", LanduseClassifier::new())
        .with_options(LoadOptions {
            polygon_labels: true,
            simplify_tolerance: Some(1.0),
            ..Default::default()
        })
        .with_pass([Fill, Labels])
        .with_clip_inset(0.0);

    let water = TileLayer::new("water", WaterClassifier::new())
        .with_options(LoadOptions {
            polygon_labels: true,
            line_labels: true,
            simplify_tolerance: Some(0.5),
            ..Default::default()
        })
        .with_pass([Fill, Line, Labels])
        .with_clip_inset(0.0);

    let buildings = TileLayer::new("buildings", BuildingClassifier::new())
        .with_pass([Fill, Line])
        .with_clip_inset(0.0);

    let admin = TileLayer::new("admin", AdminBorderClassifier::new())
        .with_sort_key(SortKey {
            property: "admin_level".into(),
            descending: true,
        })
        .with_simplify_tolerance(1.0)
        .with_pass([Underline, Line])
        .with_clip_inset(0.0);

    let roads = TileLayer::new("roads", RoadClassifier::new())
        .with_options(LoadOptions {
            sort_key: Some(SortKey::ascending("layer")),
            simplify_tolerance: Some(0.5),
            line_labels: true,
            line_shields: true,
            ..Default::default()
        })
        .with_pass([Underline])
        .with_pass([Line, Overline])
        .with_pass([Labels])
        .with_clip_inset(0.0);

    let places = TileLayer::new("places", PlaceClassifier::new())
        .with_options(LoadOptions {
            point_labels: true,
            ..Default::default()
        })
        .with_pass([Points, Labels]);

    // All parts are static and valid.
    Tileset {
        key: "osm_vector".into(),
        name: "OpenStreetMap vector".into(),
        url_template: TileUrlTemplate::new(OSM_VECTOR_URL),
        min_zoom: 0,
        max_zoom: 18,
        attribution: Some(Attribution::new(
            "© OpenStreetMap contributors",
            Some("https://www.openstreetmap.org/copyright".into()),
        )),
        layers: vec![landuse, water, buildings, admin, roads, places],
    }
}
