//! Classifiers of the built-in OpenStreetMap vector tileset.
//!
//! Features carry raw OSM tags as properties (`highway`, `admin_level`, `building`, ...). Each
//! classifier maps the tags of its layer into a small closed set of classes and prepares the
//! styles of all classes on construction.

use std::sync::Arc;

use super::{property_str, Classifier};
use crate::loader::Properties;
use crate::style::{FontWeight, LineCap, Style, StyleRecord, ZoomValue};
use crate::Color;

const LABEL_COLOR: Color = Color::from_hex("#333333");
const WATER_COLOR: Color = Color::from_hex("#AAD3DF");
const WATER_LABEL_COLOR: Color = Color::from_hex("#4A6FA5");
const BORDER_COLOR: Color = Color::from_hex("#7E5A8E");

/// Class of a road, derived from the `highway` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadClass {
    /// `motorway`, `motorway_link`
    Motorway,
    /// `trunk`, `trunk_link`
    Trunk,
    /// `primary`, `primary_link`
    Primary,
    /// `secondary`, `secondary_link`
    Secondary,
    /// `tertiary`, `tertiary_link`
    Tertiary,
    /// `residential`, `unclassified`, `living_street`, `road`
    Residential,
    /// `service`
    Service,
    /// `track`
    Track,
    /// Footways, cycleways and other non-motorized paths.
    Path,
}

impl RoadClass {
    /// All road classes from the most to the least important.
    pub const ALL: [RoadClass; 9] = [
        RoadClass::Motorway,
        RoadClass::Trunk,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Residential,
        RoadClass::Service,
        RoadClass::Track,
        RoadClass::Path,
    ];

    /// Returns the class of a `highway` tag value, or `None` for unknown values.
    pub fn from_tag(highway: &str) -> Option<Self> {
        let class = match highway {
            "motorway" | "motorway_link" => RoadClass::Motorway,
            "trunk" | "trunk_link" => RoadClass::Trunk,
            "primary" | "primary_link" => RoadClass::Primary,
            "secondary" | "secondary_link" => RoadClass::Secondary,
            "tertiary" | "tertiary_link" => RoadClass::Tertiary,
            "residential" | "unclassified" | "living_street" | "road" => RoadClass::Residential,
            "service" => RoadClass::Service,
            "track" => RoadClass::Track,
            "path" | "footway" | "cycleway" | "bridleway" | "pedestrian" | "steps" => {
                RoadClass::Path
            }
            _ => return None,
        };

        Some(class)
    }

    /// Name used in style class names.
    pub fn name(&self) -> &'static str {
        match self {
            RoadClass::Motorway => "motorway",
            RoadClass::Trunk => "trunk",
            RoadClass::Primary => "primary",
            RoadClass::Secondary => "secondary",
            RoadClass::Tertiary => "tertiary",
            RoadClass::Residential => "residential",
            RoadClass::Service => "service",
            RoadClass::Track => "track",
            RoadClass::Path => "path",
        }
    }

    /// Lowest zoom level roads of this class are drawn at.
    pub fn min_zoom(&self) -> u32 {
        match self {
            RoadClass::Motorway | RoadClass::Trunk => 5,
            RoadClass::Primary => 8,
            RoadClass::Secondary => 9,
            RoadClass::Tertiary => 10,
            RoadClass::Residential => 12,
            RoadClass::Track => 13,
            RoadClass::Service | RoadClass::Path => 14,
        }
    }

    fn style(&self) -> StyleRecord {
        match self {
            RoadClass::Motorway => cased_road(
                (12.0, 6.0, 16.0, 10.0),
                "#C24E6B",
                (12.0, 4.0, 16.0, 8.0),
                "#E892A2",
            ),
            RoadClass::Trunk => cased_road(
                (12.0, 5.5, 16.0, 9.5),
                "#C84E2F",
                (12.0, 3.5, 16.0, 7.5),
                "#F9B29C",
            ),
            RoadClass::Primary => cased_road(
                (12.0, 5.0, 16.0, 9.0),
                "#A06B00",
                (12.0, 3.0, 16.0, 7.0),
                "#FCD6A4",
            ),
            RoadClass::Secondary => cased_road(
                (12.0, 4.5, 16.0, 8.0),
                "#707D05",
                (12.0, 2.5, 16.0, 6.0),
                "#F7FABF",
            ),
            RoadClass::Tertiary => cased_road(
                (12.0, 4.0, 16.0, 7.5),
                "#8F8F8F",
                (12.0, 2.0, 16.0, 5.5),
                "#FFFFFF",
            ),
            RoadClass::Residential => StyleRecord {
                font_size: Some(ZoomValue::Interpolated(14.0, 9.0, 18.0, 12.0)),
                ..cased_road(
                    (13.0, 3.0, 17.0, 7.0),
                    "#BBBBBB",
                    (13.0, 2.0, 17.0, 5.5),
                    "#FFFFFF",
                )
            },
            RoadClass::Service => StyleRecord {
                font_size: Some(ZoomValue::Interpolated(15.0, 8.0, 18.0, 10.0)),
                ..cased_road(
                    (14.0, 2.0, 18.0, 5.0),
                    "#BBBBBB",
                    (14.0, 1.2, 18.0, 3.5),
                    "#FFFFFF",
                )
            },
            RoadClass::Track => StyleRecord {
                line_width: Some(ZoomValue::Interpolated(13.0, 1.0, 17.0, 2.0)),
                line_color: Some(Color::from_hex("#996600")),
                line_dasharray: Some(vec![4.0, 2.0]),
                ..Default::default()
            },
            RoadClass::Path => StyleRecord {
                line_width: Some(ZoomValue::Interpolated(14.0, 1.0, 18.0, 2.0)),
                line_color: Some(Color::from_hex("#FA8072")),
                line_dasharray: Some(vec![2.0, 2.0]),
                line_cap: Some(LineCap::Butt),
                ..Default::default()
            },
        }
    }
}

fn cased_road(
    casing: (f64, f64, f64, f64),
    casing_color: &'static str,
    fill: (f64, f64, f64, f64),
    fill_color: &'static str,
) -> StyleRecord {
    StyleRecord {
        underline_width: Some(ZoomValue::Interpolated(casing.0, casing.1, casing.2, casing.3)),
        underline_color: Some(Color::from_hex(casing_color)),
        overline_width: Some(ZoomValue::Interpolated(fill.0, fill.1, fill.2, fill.3)),
        overline_color: Some(Color::from_hex(fill_color)),
        font_size: Some(ZoomValue::Interpolated(12.0, 9.0, 18.0, 13.0)),
        color: Some(LABEL_COLOR),
        halo: Some(Color::WHITE),
        ..Default::default()
    }
}

/// Construction variant of a road segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoadVariant {
    Ground,
    Bridge,
    Tunnel,
}

impl RoadVariant {
    fn of(properties: &Properties) -> Self {
        let is_set = |key| property_str(properties, key).is_some_and(|v| v != "no");
        if is_set("bridge") {
            RoadVariant::Bridge
        } else if is_set("tunnel") {
            RoadVariant::Tunnel
        } else {
            RoadVariant::Ground
        }
    }

    fn apply(&self, mut record: StyleRecord) -> StyleRecord {
        match self {
            RoadVariant::Ground => {}
            RoadVariant::Bridge => {
                record.underline_color = Some(Color::BLACK);
            }
            RoadVariant::Tunnel => {
                record.underline_dasharray = Some(vec![4.0, 2.0]);
                record.overline_color = record.overline_color.map(|c| c.with_alpha(160));
            }
        }

        record
    }

    fn suffix(&self) -> &'static str {
        match self {
            RoadVariant::Ground => "",
            RoadVariant::Bridge => ":bridge",
            RoadVariant::Tunnel => ":tunnel",
        }
    }
}

const IGNORED_HIGHWAYS: &[&str] = &[
    "proposed",
    "construction",
    "abandoned",
    "razed",
    "platform",
    "bus_stop",
    "elevator",
];

/// Classifier of the `roads` layer.
///
/// Roads with an unknown `highway` value are drawn with the missing style fallback.
#[derive(Debug, Clone)]
pub struct RoadClassifier {
    styles: Vec<[Style; 3]>,
}

impl RoadClassifier {
    /// Creates the classifier, preparing the styles of all road classes.
    pub fn new() -> Self {
        let styles = RoadClass::ALL
            .iter()
            .map(|class| {
                let record = class.style();
                [RoadVariant::Ground, RoadVariant::Bridge, RoadVariant::Tunnel].map(|variant| {
                    Style::new(
                        format!("road:{}{}", class.name(), variant.suffix()),
                        Arc::new(variant.apply(record.clone())),
                    )
                })
            })
            .collect();

        Self { styles }
    }

    fn style(&self, class: RoadClass, variant: RoadVariant) -> Option<Style> {
        let index = RoadClass::ALL.iter().position(|c| *c == class)?;
        let styles = self.styles.get(index)?;
        let style = match variant {
            RoadVariant::Ground => &styles[0],
            RoadVariant::Bridge => &styles[1],
            RoadVariant::Tunnel => &styles[2],
        };

        Some(style.clone())
    }
}

impl Default for RoadClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for RoadClassifier {
    fn classify_line(&self, properties: &Properties, zoom: u32) -> Option<Style> {
        let highway = property_str(properties, "highway")?;
        if IGNORED_HIGHWAYS.iter().any(|ignored| highway == *ignored) {
            return None;
        }

        let Some(class) = RoadClass::from_tag(&highway) else {
            return Some(Style::missing(format!("road:{highway}")));
        };

        if zoom < class.min_zoom() {
            return None;
        }

        self.style(class, RoadVariant::of(properties))
    }
}

/// Administrative border class, derived from the `admin_level` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminLevel {
    /// Level 2.
    Country,
    /// Levels 3 and 4.
    Region,
    /// Levels 5 and 6.
    District,
    /// Levels 7 and 8.
    Municipality,
    /// Levels 9 and 10.
    Suburb,
}

impl AdminLevel {
    const ALL: [AdminLevel; 5] = [
        AdminLevel::Country,
        AdminLevel::Region,
        AdminLevel::District,
        AdminLevel::Municipality,
        AdminLevel::Suburb,
    ];

    /// Returns the class of an `admin_level` value, or `None` for levels without a style.
    pub fn from_level(level: u32) -> Option<Self> {
        match level {
            2 => Some(AdminLevel::Country),
            3 | 4 => Some(AdminLevel::Region),
            5 | 6 => Some(AdminLevel::District),
            7 | 8 => Some(AdminLevel::Municipality),
            9 | 10 => Some(AdminLevel::Suburb),
            _ => None,
        }
    }

    /// Lowest zoom level borders of this class are drawn at.
    pub fn min_zoom(&self) -> u32 {
        match self {
            AdminLevel::Country => 0,
            AdminLevel::Region => 4,
            AdminLevel::District => 8,
            AdminLevel::Municipality => 10,
            AdminLevel::Suburb => 12,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AdminLevel::Country => "country",
            AdminLevel::Region => "region",
            AdminLevel::District => "district",
            AdminLevel::Municipality => "municipality",
            AdminLevel::Suburb => "suburb",
        }
    }

    fn style(&self) -> StyleRecord {
        let dashed = |width: ZoomValue, dash: [f64; 2]| StyleRecord {
            line_width: Some(width),
            line_color: Some(BORDER_COLOR),
            line_dasharray: Some(dash.to_vec()),
            line_cap: Some(LineCap::Butt),
            ..Default::default()
        };

        match self {
            AdminLevel::Country => StyleRecord {
                underline_width: Some(ZoomValue::Interpolated(2.0, 3.0, 10.0, 8.0)),
                underline_color: Some(BORDER_COLOR.with_alpha(64)),
                line_width: Some(ZoomValue::Interpolated(2.0, 1.0, 10.0, 2.5)),
                line_color: Some(BORDER_COLOR),
                ..Default::default()
            },
            AdminLevel::Region => dashed(ZoomValue::Interpolated(4.0, 0.8, 10.0, 2.0), [6.0, 3.0]),
            AdminLevel::District => dashed(ZoomValue::Constant(1.0), [4.0, 2.0]),
            AdminLevel::Municipality => dashed(ZoomValue::Constant(0.8), [3.0, 2.0]),
            AdminLevel::Suburb => dashed(ZoomValue::Constant(0.6), [2.0, 2.0]),
        }
    }
}

/// Classifier of the `admin` layer. Lines without `admin_level` are excluded. Levels without a
/// configured style get the missing style fallback.
#[derive(Debug, Clone)]
pub struct AdminBorderClassifier {
    styles: Vec<(AdminLevel, Style)>,
}

impl AdminBorderClassifier {
    /// Creates the classifier.
    pub fn new() -> Self {
        let styles = AdminLevel::ALL
            .iter()
            .map(|level| {
                (
                    *level,
                    Style::new(format!("admin:{}", level.name()), Arc::new(level.style())),
                )
            })
            .collect();

        Self { styles }
    }
}

impl Default for AdminBorderClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for AdminBorderClassifier {
    fn classify_line(&self, properties: &Properties, zoom: u32) -> Option<Style> {
        let raw = property_str(properties, "admin_level")?;
        let Some(level) = raw.trim().parse().ok().and_then(AdminLevel::from_level) else {
            return Some(Style::missing(format!("admin:{raw}")));
        };

        if zoom < level.min_zoom() {
            return None;
        }

        self.styles
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, style)| style.clone())
    }
}

/// Classifier of the `water` layer: water areas, rivers and streams.
#[derive(Debug, Clone)]
pub struct WaterClassifier {
    area: Style,
    river: Style,
    stream: Style,
}

impl WaterClassifier {
    /// Creates the classifier.
    pub fn new() -> Self {
        Self {
            area: Style::new(
                "water:area",
                Arc::new(StyleRecord {
                    fill_color: Some(WATER_COLOR),
                    font_size: Some(ZoomValue::Constant(11.0)),
                    color: Some(WATER_LABEL_COLOR),
                    halo: Some(Color::WHITE.with_alpha(160)),
                    ..Default::default()
                }),
            ),
            river: Style::new(
                "water:river",
                Arc::new(StyleRecord {
                    line_width: Some(ZoomValue::Interpolated(8.0, 1.0, 16.0, 6.0)),
                    line_color: Some(WATER_COLOR),
                    font_size: Some(ZoomValue::Interpolated(12.0, 9.0, 18.0, 12.0)),
                    color: Some(WATER_LABEL_COLOR),
                    halo: Some(Color::WHITE.with_alpha(160)),
                    ..Default::default()
                }),
            ),
            stream: Style::new(
                "water:stream",
                Arc::new(StyleRecord {
                    line_width: Some(ZoomValue::Interpolated(13.0, 0.5, 17.0, 2.0)),
                    line_color: Some(WATER_COLOR),
                    ..Default::default()
                }),
            ),
        }
    }
}

impl Default for WaterClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for WaterClassifier {
    fn classify_line(&self, properties: &Properties, zoom: u32) -> Option<Style> {
        match &*property_str(properties, "waterway")? {
            "river" | "canal" => Some(self.river.clone()),
            "stream" | "ditch" | "drain" if zoom >= 13 => Some(self.stream.clone()),
            _ => None,
        }
    }

    fn classify_polygon(&self, properties: &Properties, _zoom: u32) -> Option<Style> {
        let tagged = |key, values: &[&str]| {
            property_str(properties, key).is_some_and(|v| values.iter().any(|value| v == *value))
        };

        (tagged("natural", &["water", "bay"])
            || tagged("waterway", &["riverbank", "dock"])
            || tagged("landuse", &["reservoir", "basin"]))
        .then(|| self.area.clone())
    }
}

/// Tag values of the `landuse` layer and the class and fill color they are drawn with.
const LANDUSE_TABLE: &[(&str, &str, &str, &str)] = &[
    ("landuse", "forest", "landuse:forest", "#ADD19E"),
    ("natural", "wood", "landuse:forest", "#ADD19E"),
    ("leisure", "park", "landuse:park", "#C8FACC"),
    ("landuse", "grass", "landuse:grass", "#CDEBB0"),
    ("landuse", "meadow", "landuse:grass", "#CDEBB0"),
    ("landuse", "recreation_ground", "landuse:park", "#C8FACC"),
    ("landuse", "residential", "landuse:residential", "#E0DFDF"),
    ("landuse", "industrial", "landuse:industrial", "#EBDBE8"),
    ("landuse", "commercial", "landuse:commercial", "#F2DAD9"),
    ("landuse", "retail", "landuse:commercial", "#F2DAD9"),
    ("landuse", "farmland", "landuse:farmland", "#EEF0D5"),
    ("landuse", "cemetery", "landuse:cemetery", "#AACBAF"),
];

/// Classifier of the `landuse` layer. Only the land uses listed in its table are drawn.
#[derive(Debug, Clone)]
pub struct LanduseClassifier {
    styles: Vec<(&'static str, &'static str, Style)>,
}

impl LanduseClassifier {
    /// Creates the classifier.
    pub fn new() -> Self {
        let mut styles: Vec<(&'static str, &'static str, Style)> = vec![];
        for (key, value, class, color) in LANDUSE_TABLE {
            // Tags of the same class share one style.
            let existing = styles
                .iter()
                .find(|(_, _, style)| &**style.class() == *class)
                .map(|(_, _, style)| style.clone());
            let style = existing.unwrap_or_else(|| {
                let labelled = *class == "landuse:park";
                Style::new(
                    *class,
                    Arc::new(StyleRecord {
                        fill_color: Color::try_from_hex(color),
                        font_size: labelled.then_some(ZoomValue::Constant(10.0)),
                        color: labelled.then_some(Color::from_hex("#2F6B2F")),
                        halo: labelled.then_some(Color::WHITE.with_alpha(160)),
                        ..Default::default()
                    }),
                )
            });
            styles.push((*key, *value, style));
        }

        Self { styles }
    }
}

impl Default for LanduseClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for LanduseClassifier {
    fn classify_polygon(&self, properties: &Properties, _zoom: u32) -> Option<Style> {
        self.styles
            .iter()
            .find(|(key, value, _)| property_str(properties, key).is_some_and(|v| v == *value))
            .map(|(_, _, style)| style.clone())
    }
}

/// Classifier of the `buildings` layer. Buildings are drawn from zoom 13, with an outline from
/// zoom 14.
#[derive(Debug, Clone)]
pub struct BuildingClassifier {
    plain: Style,
    outlined: Style,
}

impl BuildingClassifier {
    /// Lowest zoom buildings are drawn at.
    pub const MIN_ZOOM: u32 = 13;
    /// Lowest zoom building outlines are drawn at.
    pub const OUTLINE_ZOOM: u32 = 14;

    /// Creates the classifier.
    pub fn new() -> Self {
        let plain = StyleRecord {
            fill_color: Some(Color::from_hex("#D9D0C9")),
            ..Default::default()
        };
        let outlined = StyleRecord {
            line_width: Some(ZoomValue::Interpolated(14.0, 0.5, 18.0, 1.0)),
            line_color: Some(Color::from_hex("#C4B6AB")),
            ..plain.clone()
        };

        Self {
            plain: Style::new("building", Arc::new(plain)),
            outlined: Style::new("building:outlined", Arc::new(outlined)),
        }
    }
}

impl Default for BuildingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for BuildingClassifier {
    fn classify_polygon(&self, properties: &Properties, zoom: u32) -> Option<Style> {
        if zoom < Self::MIN_ZOOM || property_str(properties, "building")? == "no" {
            return None;
        }

        if zoom >= Self::OUTLINE_ZOOM {
            Some(self.outlined.clone())
        } else {
            Some(self.plain.clone())
        }
    }
}

/// Class of a populated place, derived from the `place` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceClass {
    /// `city`
    City,
    /// `town`
    Town,
    /// `village`
    Village,
    /// `suburb`
    Suburb,
    /// `hamlet`
    Hamlet,
    /// `neighbourhood`
    Neighbourhood,
}

impl PlaceClass {
    const ALL: [PlaceClass; 6] = [
        PlaceClass::City,
        PlaceClass::Town,
        PlaceClass::Village,
        PlaceClass::Suburb,
        PlaceClass::Hamlet,
        PlaceClass::Neighbourhood,
    ];

    /// Returns the class of a `place` tag value.
    pub fn from_tag(place: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.name() == place)
    }

    fn name(&self) -> &'static str {
        match self {
            PlaceClass::City => "city",
            PlaceClass::Town => "town",
            PlaceClass::Village => "village",
            PlaceClass::Suburb => "suburb",
            PlaceClass::Hamlet => "hamlet",
            PlaceClass::Neighbourhood => "neighbourhood",
        }
    }

    /// Lowest zoom level places of this class are drawn at.
    pub fn min_zoom(&self) -> u32 {
        match self {
            PlaceClass::City => 4,
            PlaceClass::Town => 8,
            PlaceClass::Village => 11,
            PlaceClass::Suburb => 12,
            PlaceClass::Hamlet => 13,
            PlaceClass::Neighbourhood => 14,
        }
    }

    fn style(&self) -> StyleRecord {
        let label = |font_size: ZoomValue, weight: FontWeight, point_size: Option<f64>| StyleRecord {
            font_size: Some(font_size),
            font_weight: Some(weight),
            color: Some(LABEL_COLOR),
            halo: Some(Color::WHITE),
            point_size: point_size.map(ZoomValue::Constant),
            ..Default::default()
        };

        match self {
            PlaceClass::City => label(
                ZoomValue::Interpolated(4.0, 10.0, 12.0, 18.0),
                FontWeight::Bold,
                Some(5.0),
            ),
            PlaceClass::Town => label(
                ZoomValue::Interpolated(8.0, 9.0, 14.0, 14.0),
                FontWeight::Normal,
                Some(4.0),
            ),
            PlaceClass::Village => label(
                ZoomValue::Interpolated(11.0, 9.0, 16.0, 12.0),
                FontWeight::Normal,
                None,
            ),
            PlaceClass::Suburb => StyleRecord {
                color: Some(Color::from_hex("#555555")),
                ..label(
                    ZoomValue::Interpolated(12.0, 10.0, 16.0, 13.0),
                    FontWeight::Normal,
                    None,
                )
            },
            PlaceClass::Hamlet | PlaceClass::Neighbourhood => label(
                ZoomValue::Interpolated(13.0, 8.0, 17.0, 11.0),
                FontWeight::Normal,
                None,
            ),
        }
    }
}

/// Classifier of the `places` layer: named populated places drawn as points with labels.
#[derive(Debug, Clone)]
pub struct PlaceClassifier {
    styles: Vec<(PlaceClass, Style)>,
}

impl PlaceClassifier {
    /// Creates the classifier.
    pub fn new() -> Self {
        let styles = PlaceClass::ALL
            .iter()
            .map(|class| {
                (
                    *class,
                    Style::new(format!("place:{}", class.name()), Arc::new(class.style())),
                )
            })
            .collect();

        Self { styles }
    }
}

impl Default for PlaceClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for PlaceClassifier {
    fn classify_point(&self, properties: &Properties, zoom: u32) -> Option<Style> {
        let class = PlaceClass::from_tag(&property_str(properties, "place")?)?;
        if zoom < class.min_zoom() {
            return None;
        }

        self.styles
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, style)| style.clone())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::style::ResolvedStyle;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn motorway_style() {
        let classifier = RoadClassifier::new();
        let style = classifier
            .classify_line(&props(json!({ "highway": "motorway" })), 14)
            .unwrap();
        assert_eq!(&**style.class(), "road:motorway");
        assert!(!style.is_missing());

        let resolved = ResolvedStyle::resolve(&style, 14, &mut Vec::new());
        assert!(resolved.line.is_none());
        assert_abs_diff_eq!(resolved.underline.unwrap().width, 8.0);
        assert_abs_diff_eq!(resolved.overline.unwrap().width, 6.0);
    }

    #[test]
    fn road_visibility_by_zoom() {
        let classifier = RoadClassifier::new();
        let residential = props(json!({ "highway": "residential" }));
        assert!(classifier.classify_line(&residential, 11).is_none());
        assert!(classifier.classify_line(&residential, 12).is_some());
        assert!(classifier.classify_point(&residential, 16).is_none());
        assert!(classifier.classify_polygon(&residential, 16).is_none());
    }

    #[test]
    fn unknown_highway_is_missing() {
        let classifier = RoadClassifier::new();
        let style = classifier
            .classify_line(&props(json!({ "highway": "busway" })), 14)
            .unwrap();
        assert!(style.is_missing());
        assert_eq!(&**style.class(), "road:busway");

        assert!(classifier
            .classify_line(&props(json!({ "highway": "proposed" })), 14)
            .is_none());
        assert!(classifier
            .classify_line(&props(json!({ "railway": "rail" })), 14)
            .is_none());
    }

    #[test]
    fn bridges_and_tunnels() {
        let classifier = RoadClassifier::new();
        let bridge = classifier
            .classify_line(&props(json!({ "highway": "primary", "bridge": "yes" })), 14)
            .unwrap();
        assert_eq!(&**bridge.class(), "road:primary:bridge");
        assert_eq!(bridge.record().underline_color, Some(Color::BLACK));

        let tunnel = classifier
            .classify_line(&props(json!({ "highway": "primary", "tunnel": "yes" })), 14)
            .unwrap();
        assert_eq!(&**tunnel.class(), "road:primary:tunnel");
        assert!(tunnel.record().underline_dasharray.is_some());

        let ground = classifier
            .classify_line(&props(json!({ "highway": "primary", "bridge": "no" })), 14)
            .unwrap();
        assert_eq!(&**ground.class(), "road:primary");
    }

    #[test]
    fn admin_levels() {
        let classifier = AdminBorderClassifier::new();
        let country = classifier
            .classify_line(&props(json!({ "admin_level": "2" })), 3)
            .unwrap();
        assert_eq!(&**country.class(), "admin:country");

        let municipality = props(json!({ "admin_level": 8 }));
        assert!(classifier.classify_line(&municipality, 9).is_none());
        assert_eq!(
            &**classifier.classify_line(&municipality, 12).unwrap().class(),
            "admin:municipality"
        );

        let unknown = classifier
            .classify_line(&props(json!({ "admin_level": "11" })), 14)
            .unwrap();
        assert!(unknown.is_missing());

        assert!(classifier
            .classify_line(&props(json!({ "boundary": "protected_area" })), 14)
            .is_none());
    }

    #[test]
    fn building_outline_from_zoom_14() {
        let classifier = BuildingClassifier::new();
        let building = props(json!({ "building": "yes" }));
        assert!(classifier.classify_polygon(&building, 12).is_none());
        assert_eq!(
            &**classifier.classify_polygon(&building, 13).unwrap().class(),
            "building"
        );

        let outlined = classifier.classify_polygon(&building, 14).unwrap();
        assert!(outlined.record().line_width.is_some());
        assert!(outlined.record().fill_color.is_some());
    }

    #[test]
    fn water_and_landuse() {
        let water = WaterClassifier::new();
        assert!(water
            .classify_polygon(&props(json!({ "natural": "water" })), 10)
            .is_some());
        assert!(water
            .classify_line(&props(json!({ "waterway": "stream" })), 12)
            .is_none());
        assert!(water
            .classify_line(&props(json!({ "waterway": "river" })), 12)
            .is_some());

        let landuse = LanduseClassifier::new();
        let forest = landuse
            .classify_polygon(&props(json!({ "landuse": "forest" })), 12)
            .unwrap();
        let wood = landuse
            .classify_polygon(&props(json!({ "natural": "wood" })), 12)
            .unwrap();
        assert_eq!(forest, wood);
        assert!(landuse
            .classify_polygon(&props(json!({ "landuse": "quarry" })), 12)
            .is_none());
    }

    #[test]
    fn places() {
        let classifier = PlaceClassifier::new();
        let city = props(json!({ "place": "city", "name": "Berlin" }));
        let style = classifier.classify_point(&city, 6).unwrap();
        assert_eq!(style.record().font_weight, Some(FontWeight::Bold));
        assert!(classifier.classify_point(&city, 3).is_none());
        assert!(classifier.classify_line(&city, 6).is_none());
    }
}
