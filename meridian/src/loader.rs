//! Loading of one GeoJSON tile into classified geometry in tile-pixel space.
//!
//! [`FeatureCollection::parse`] validates the feature collection and flattens multi-geometries and
//! geometry collections. [`load_collection`] then asks the layer [`Classifier`] for the style of
//! every geometry, projects vertices into the pixel space of the tile and places labels. Problems
//! with single features are reported to [`Diagnostics`] and the feature is skipped, the rest of
//! the tile is still loaded.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use meridian_types::projection::TilePixelProjector;
use meridian_types::{GeoPoint, LineString, Point2, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::{property_str, Classifier, GeometryKind};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::MeridianError;
use crate::label::{self, LabelPlacement};
use crate::style::Style;
use crate::tile_schema::TileIndex;

/// Attributes of a feature.
pub type Properties = Map<String, Value>;

/// Pixel point inside a tile.
pub type PixelPoint = Point2<f64>;

/// `id` member of a GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    /// Numeric id.
    Number(f64),
    /// String id.
    String(String),
}

impl FeatureId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(FeatureId::Number),
            Value::String(s) => Some(FeatureId::String(s.clone())),
            _ => None,
        }
    }
}

impl Display for FeatureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{n}"),
            FeatureId::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Geometry of a feature with the style assigned by the classifier.
///
/// All geometries flattened from one feature share its id and properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<G> {
    /// Id of the source feature.
    pub id: Option<FeatureId>,
    /// Geometry in tile pixels.
    pub geometry: G,
    /// Properties of the source feature.
    pub properties: Arc<Properties>,
    /// Style of the geometry.
    pub style: Style,
}

/// Property used to order features before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Name of the property.
    pub property: String,
    /// Sort in descending order. Features without the property stay first.
    #[serde(default)]
    pub descending: bool,
}

impl SortKey {
    /// Ascending sort by the given property.
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            descending: false,
        }
    }
}

/// Options of loading features of a tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoadOptions {
    /// Features are stably sorted by this property before classification, so later features are
    /// drawn on top of earlier ones.
    pub sort_key: Option<SortKey>,
    /// Tolerance in pixels of line and ring simplification. No simplification if not set.
    pub simplify_tolerance: Option<f64>,
    /// Place `name` labels along lines.
    pub line_labels: bool,
    /// Place shields with the values of the `ref` property on lines.
    pub line_shields: bool,
    /// Place `name` labels inside polygons.
    pub polygon_labels: bool,
    /// Place `name` labels at points.
    pub point_labels: bool,
    /// Zoom level from which polygon labels are placed by the grid search instead of the bounding
    /// box center.
    pub polygon_label_grid_zoom: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sort_key: None,
            simplify_tolerance: None,
            line_labels: false,
            line_shields: false,
            polygon_labels: false,
            point_labels: false,
            polygon_label_grid_zoom: 14,
        }
    }
}

/// Classified and projected content of one tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGeometry {
    /// Index of the tile.
    pub index: TileIndex,
    /// Points.
    pub points: Vec<Classified<PixelPoint>>,
    /// Lines.
    pub lines: Vec<Classified<LineString<PixelPoint>>>,
    /// Polygons.
    pub polygons: Vec<Classified<Polygon<PixelPoint>>>,
    /// Labels of points.
    pub point_labels: Vec<Classified<LabelPlacement>>,
    /// Labels along lines.
    pub line_labels: Vec<Classified<LabelPlacement>>,
    /// Route shields of lines.
    pub line_shields: Vec<Classified<LabelPlacement>>,
    /// Labels of polygons.
    pub polygon_labels: Vec<Classified<LabelPlacement>>,
}

impl TileGeometry {
    /// Geometry of a tile layer without features.
    pub fn empty(index: TileIndex) -> Self {
        Self {
            index,
            points: vec![],
            lines: vec![],
            polygons: vec![],
            point_labels: vec![],
            line_labels: vec![],
            line_shields: vec![],
            polygon_labels: vec![],
        }
    }

    /// Returns true if the layer has nothing to draw in this tile.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty() && self.polygons.is_empty()
    }
}

/// Shield texts already placed in one tile. Every route number gets at most one shield per tile.
#[derive(Debug, Default)]
pub struct ShieldRegistry {
    placed: HashSet<String>,
}

impl ShieldRegistry {
    /// Returns true if a shield with this text was already placed.
    pub fn contains(&self, text: &str) -> bool {
        self.placed.contains(text)
    }

    /// Registers a placed shield.
    pub fn register(&mut self, text: &str) {
        self.placed.insert(text.to_string());
    }
}

/// Single geometry produced by flattening a GeoJSON geometry.
#[derive(Debug, Clone, PartialEq)]
enum FlatGeometry {
    Point(GeoPoint),
    Line(Vec<GeoPoint>),
    Polygon(Polygon<GeoPoint>),
}

impl FlatGeometry {
    fn kind(&self) -> GeometryKind {
        match self {
            FlatGeometry::Point(_) => GeometryKind::Point,
            FlatGeometry::Line(_) => GeometryKind::Line,
            FlatGeometry::Polygon(_) => GeometryKind::Polygon,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum GeometryIssue {
    Malformed(String),
    Unsupported(String),
}

impl GeometryIssue {
    fn into_warning(self, id: Option<FeatureId>) -> Warning {
        match self {
            GeometryIssue::Malformed(reason) => Warning::MalformedFeature { id, reason },
            GeometryIssue::Unsupported(geometry_type) => {
                Warning::UnsupportedGeometry { id, geometry_type }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SourceFeature {
    id: Option<FeatureId>,
    properties: Arc<Properties>,
    geometries: Vec<FlatGeometry>,
}

/// Validated GeoJSON `FeatureCollection` with flattened geometries.
///
/// Malformed features are reported once while parsing, so one collection can be loaded by any
/// number of layers with [`load_collection`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<SourceFeature>,
}

impl FeatureCollection {
    /// Parses a decoded GeoJSON `FeatureCollection`.
    ///
    /// The structure of the collection is validated before any feature is processed: if it is not
    /// a `FeatureCollection` of `Feature` objects, [`MeridianError::MalformedInput`] is returned.
    /// Features with malformed or unsupported geometry are reported and skipped.
    pub fn parse(geojson: &Value, diagnostics: &mut dyn Diagnostics) -> Result<Self, MeridianError> {
        let features = validate_collection(geojson)?
            .into_iter()
            .filter_map(|feature| parse_feature(feature, diagnostics))
            .collect();

        Ok(Self { features })
    }

    /// Number of features with valid geometry.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the collection has no valid features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn parse_feature(
    feature: &Map<String, Value>,
    diagnostics: &mut dyn Diagnostics,
) -> Option<SourceFeature> {
    let id = feature.get("id").and_then(FeatureId::from_value);

    let geometry = match feature.get("geometry") {
        None | Some(Value::Null) => {
            diagnostics.warn(Warning::MalformedFeature {
                id,
                reason: "missing geometry".into(),
            });
            return None;
        }
        Some(geometry) => geometry,
    };

    let mut geometries = vec![];
    if let Err(issue) = normalize_geometry(geometry, &mut geometries) {
        diagnostics.warn(issue.into_warning(id));
        return None;
    }

    let properties = Arc::new(
        feature
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    );

    Some(SourceFeature {
        id,
        properties,
        geometries,
    })
}

/// Loads features of a GeoJSON `FeatureCollection` into the classified geometry of the tile.
///
/// Equivalent to [`FeatureCollection::parse`] followed by [`load_collection`].
pub fn load_tile(
    geojson: &Value,
    index: TileIndex,
    classifier: &dyn Classifier,
    options: &LoadOptions,
    diagnostics: &mut dyn Diagnostics,
) -> Result<TileGeometry, MeridianError> {
    let collection = FeatureCollection::parse(geojson, diagnostics)?;
    Ok(load_collection(
        &collection,
        index,
        classifier,
        options,
        diagnostics,
    ))
}

/// Classifies and projects the features of a parsed collection into the geometry of the tile.
pub fn load_collection(
    collection: &FeatureCollection,
    index: TileIndex,
    classifier: &dyn Classifier,
    options: &LoadOptions,
    diagnostics: &mut dyn Diagnostics,
) -> TileGeometry {
    let mut features: Vec<&SourceFeature> = collection.features.iter().collect();
    if let Some(sort_key) = &options.sort_key {
        sort_features(&mut features, sort_key);
    }

    let mut loader = TileLoader {
        index,
        projector: index.projector(),
        classifier,
        options,
        diagnostics,
        shields: ShieldRegistry::default(),
        tile: TileGeometry::empty(index),
    };

    for feature in features {
        loader.load_feature(feature);
    }

    let tile = loader.tile;
    log::debug!(
        "Loaded tile {}/{}/{}: {} points, {} lines, {} polygons",
        index.z,
        index.x,
        index.y,
        tile.points.len(),
        tile.lines.len(),
        tile.polygons.len()
    );

    tile
}

fn validate_collection(geojson: &Value) -> Result<Vec<&Map<String, Value>>, MeridianError> {
    let collection = geojson
        .as_object()
        .ok_or_else(|| MeridianError::MalformedInput("tile is not a JSON object".into()))?;

    match collection.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(MeridianError::MalformedInput(format!(
                "expected FeatureCollection, got {other}"
            )))
        }
        None => return Err(MeridianError::MalformedInput("missing type".into())),
    }

    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| MeridianError::MalformedInput("missing features array".into()))?;

    features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            feature
                .as_object()
                .filter(|f| f.get("type").and_then(Value::as_str) == Some("Feature"))
                .ok_or_else(|| MeridianError::MalformedInput(format!("features[{i}] is not a Feature")))
        })
        .collect()
}

fn sort_features(features: &mut [&SourceFeature], sort_key: &SortKey) {
    let mut keyed: Vec<_> = features
        .iter()
        .map(|&feature| (sort_value(feature.properties.get(&sort_key.property)), feature))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_sort_values(a, b, sort_key.descending));

    for (slot, (_, feature)) in features.iter_mut().zip(keyed) {
        *slot = feature;
    }
}

/// Value of the sort key. Strings holding numbers, like OSM `admin_level` or `layer` tags, are
/// compared as numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SortValue<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

impl SortValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Number(_) => 1,
            SortValue::Text(_) => 2,
        }
    }
}

fn sort_value(value: Option<&Value>) -> SortValue<'_> {
    match value {
        Some(Value::Number(n)) => n.as_f64().map_or(SortValue::Missing, SortValue::Number),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => SortValue::Number(n),
            _ => SortValue::Text(s),
        },
        _ => SortValue::Missing,
    }
}

/// Orders sort key values: missing values first, then numbers, then strings. Other JSON values are
/// treated as missing. Descending order reverses the order within numbers and within strings only.
fn compare_sort_values(a: &SortValue, b: &SortValue, descending: bool) -> Ordering {
    let ordering = match (a, b) {
        (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
        (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
        _ => return a.rank().cmp(&b.rank()),
    };

    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

struct TileLoader<'a> {
    index: TileIndex,
    projector: TilePixelProjector,
    classifier: &'a dyn Classifier,
    options: &'a LoadOptions,
    diagnostics: &'a mut dyn Diagnostics,
    shields: ShieldRegistry,
    tile: TileGeometry,
}

impl TileLoader<'_> {
    fn load_feature(&mut self, feature: &SourceFeature) {
        // Classifier is asked at most once per geometry kind of the feature.
        let mut styles: [Option<Option<Style>>; 3] = [None, None, None];
        for geometry in &feature.geometries {
            let kind = geometry.kind();
            let slot = match kind {
                GeometryKind::Point => 0,
                GeometryKind::Line => 1,
                GeometryKind::Polygon => 2,
            };
            let style = styles[slot]
                .get_or_insert_with(|| self.classify(kind, &feature.properties))
                .clone();

            let Some(style) = style else {
                continue;
            };

            let classified = Classified {
                id: feature.id.clone(),
                geometry: (),
                properties: feature.properties.clone(),
                style,
            };

            match geometry {
                FlatGeometry::Point(point) => self.add_point(classified, point),
                FlatGeometry::Line(points) => self.add_line(classified, points),
                FlatGeometry::Polygon(polygon) => self.add_polygon(classified, polygon),
            }
        }
    }

    fn classify(&mut self, kind: GeometryKind, properties: &Properties) -> Option<Style> {
        let style = self.classifier.classify(kind, properties, self.index.z)?;
        if style.is_missing() {
            self.diagnostics.warn(Warning::MissingStyle {
                class: style.class().clone(),
            });
        }

        Some(style)
    }

    fn project(&self, point: &GeoPoint) -> PixelPoint {
        self.projector.project_clamped(point.lat(), point.lon())
    }

    fn font_size(&self, style: &Style) -> Option<f64> {
        style
            .record()
            .font_size
            .map(|size| size.resolve(self.index.z as f64))
            .filter(|size| *size > 0.0)
    }

    fn add_point(&mut self, classified: Classified<()>, point: &GeoPoint) {
        let point = self.project(point);

        if self.options.point_labels {
            if let Some(label) = self.label_text(&classified, "name").and_then(|(text, size)| {
                label::point_label(&point, &text, size)
            }) {
                self.tile.point_labels.push(classified.with_geometry(label));
            }
        }

        self.tile.points.push(classified.with_geometry(point));
    }

    fn add_line(&mut self, classified: Classified<()>, points: &[GeoPoint]) {
        let mut line = LineString::new(points.iter().map(|p| self.project(p)).collect());
        if let Some(tolerance) = self.options.simplify_tolerance {
            line = line.simplify(tolerance);
        }

        if self.options.line_labels {
            if let Some(label) = self
                .label_text(&classified, "name")
                .and_then(|(text, size)| label::line_label(&line, &text, size))
            {
                self.tile.line_labels.push(classified.with_geometry(label));
            }
        }

        if self.options.line_shields {
            if let Some((refs, size)) = self.label_text(&classified, "ref") {
                for route in refs.split(';').map(str::trim).filter(|r| !r.is_empty()) {
                    if self.shields.contains(route) {
                        continue;
                    }

                    if let Some(shield) = label::line_shield(&line, route, size) {
                        self.shields.register(route);
                        self.tile.line_shields.push(classified.with_geometry(shield));
                    }
                }
            }
        }

        self.tile.lines.push(classified.with_geometry(line));
    }

    fn add_polygon(&mut self, classified: Classified<()>, polygon: &Polygon<GeoPoint>) {
        let projected: Vec<Vec<PixelPoint>> = polygon
            .iter_rings()
            .map(|ring| ring.iter().map(|p| self.project(p)).collect())
            .collect();

        let polygon = match self.build_polygon(projected) {
            Ok(polygon) => polygon,
            Err(err) => {
                self.diagnostics.warn(Warning::MalformedFeature {
                    id: classified.id.clone(),
                    reason: err.to_string(),
                });
                return;
            }
        };

        if self.options.polygon_labels {
            let zoom = self.index.z;
            let grid_zoom = self.options.polygon_label_grid_zoom;
            if let Some(label) = self.label_text(&classified, "name").and_then(|(text, size)| {
                label::polygon_label(&polygon, &text, size, zoom, grid_zoom)
            }) {
                self.tile.polygon_labels.push(classified.with_geometry(label));
            }
        }

        self.tile.polygons.push(classified.with_geometry(polygon));
    }

    /// Builds the polygon from projected rings, simplifying them if configured. If simplification
    /// degenerates a ring, the original rings are used.
    fn build_polygon(
        &self,
        mut rings: Vec<Vec<PixelPoint>>,
    ) -> Result<Polygon<PixelPoint>, MeridianError> {
        if let Some(tolerance) = self.options.simplify_tolerance {
            let simplified: Vec<Vec<PixelPoint>> = rings
                .iter()
                .map(|ring| meridian_types::simplify::simplify(ring, tolerance))
                .collect();
            if let Ok(polygon) = split_rings(simplified) {
                return Ok(polygon);
            }
        }

        let outer = if rings.is_empty() {
            vec![]
        } else {
            rings.remove(0)
        };
        Ok(Polygon::new(outer, rings)?)
    }

    fn label_text(&self, classified: &Classified<()>, property: &str) -> Option<(String, f64)> {
        let font_size = self.font_size(&classified.style)?;
        let text = property_str(&classified.properties, property)?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some((text.to_string(), font_size))
    }
}

fn split_rings(mut rings: Vec<Vec<PixelPoint>>) -> Result<Polygon<PixelPoint>, MeridianError> {
    if rings.is_empty() {
        return Err(MeridianError::MalformedInput("polygon without rings".into()));
    }

    let outer = rings.remove(0);
    Ok(Polygon::new(outer, rings)?)
}

impl Classified<()> {
    fn with_geometry<G>(&self, geometry: G) -> Classified<G> {
        Classified {
            id: self.id.clone(),
            geometry,
            properties: self.properties.clone(),
            style: self.style.clone(),
        }
    }
}

/// Flattens a GeoJSON geometry into single geometries. Multi-geometries and geometry collections
/// are expanded recursively.
fn normalize_geometry(geometry: &Value, output: &mut Vec<FlatGeometry>) -> Result<(), GeometryIssue> {
    let object = geometry
        .as_object()
        .ok_or_else(|| GeometryIssue::Malformed("geometry is not an object".into()))?;
    let geometry_type = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryIssue::Malformed("geometry without type".into()))?;

    if geometry_type == "GeometryCollection" {
        let geometries = object
            .get("geometries")
            .and_then(Value::as_array)
            .ok_or_else(|| GeometryIssue::Malformed("missing geometries".into()))?;
        for geometry in geometries {
            normalize_geometry(geometry, output)?;
        }

        return Ok(());
    }

    if !matches!(
        geometry_type,
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon" | "MultiPolygon"
    ) {
        return Err(GeometryIssue::Unsupported(geometry_type.to_string()));
    }

    let coordinates = object
        .get("coordinates")
        .ok_or_else(|| GeometryIssue::Malformed(format!("{geometry_type} without coordinates")))?;

    match geometry_type {
        "Point" => output.push(FlatGeometry::Point(parse_position(coordinates)?)),
        "MultiPoint" => {
            for position in parse_array(coordinates)? {
                output.push(FlatGeometry::Point(parse_position(position)?));
            }
        }
        "LineString" => output.push(FlatGeometry::Line(parse_line(coordinates)?)),
        "MultiLineString" => {
            for line in parse_array(coordinates)? {
                output.push(FlatGeometry::Line(parse_line(line)?));
            }
        }
        "Polygon" => output.push(FlatGeometry::Polygon(parse_polygon(coordinates)?)),
        _ => {
            for polygon in parse_array(coordinates)? {
                output.push(FlatGeometry::Polygon(parse_polygon(polygon)?));
            }
        }
    }

    Ok(())
}

fn parse_array(value: &Value) -> Result<&Vec<Value>, GeometryIssue> {
    value
        .as_array()
        .ok_or_else(|| GeometryIssue::Malformed("coordinates are not an array".into()))
}

/// Parses a `[lon, lat]` position. Elevation and other extra members are ignored.
fn parse_position(value: &Value) -> Result<GeoPoint, GeometryIssue> {
    let position = parse_array(value)?;
    match (
        position.first().and_then(Value::as_f64),
        position.get(1).and_then(Value::as_f64),
    ) {
        (Some(lon), Some(lat)) => Ok(GeoPoint::lonlat(lon, lat)),
        _ => Err(GeometryIssue::Malformed("invalid position".into())),
    }
}

fn parse_positions(value: &Value) -> Result<Vec<GeoPoint>, GeometryIssue> {
    parse_array(value)?.iter().map(parse_position).collect()
}

fn parse_line(value: &Value) -> Result<Vec<GeoPoint>, GeometryIssue> {
    let points = parse_positions(value)?;
    if points.len() < 2 {
        return Err(GeometryIssue::Malformed(
            "line string with fewer than 2 positions".into(),
        ));
    }

    Ok(points)
}

fn parse_polygon(value: &Value) -> Result<Polygon<GeoPoint>, GeometryIssue> {
    let mut rings = parse_array(value)?
        .iter()
        .map(parse_positions)
        .collect::<Result<Vec<_>, _>>()?;
    if rings.is_empty() {
        return Err(GeometryIssue::Malformed("polygon without rings".into()));
    }

    let outer = rings.remove(0);
    Polygon::new(outer, rings).map_err(|err| GeometryIssue::Malformed(err.to_string()))
}
