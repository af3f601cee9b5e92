//! Classifiers decide whether and how a feature of a tile layer is drawn.
//!
//! Every [`TileLayer`](crate::tileset::TileLayer) has one classifier. For each feature geometry the
//! loader asks it for a [`Style`]; `None` excludes the feature from the layer.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MeridianError;
use crate::loader::Properties;
use crate::style::{Style, StyleRecord};

pub mod osm;

/// Kind of a flattened feature geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    /// Single point.
    Point,
    /// Line string.
    Line,
    /// Polygon with optional holes.
    Polygon,
}

/// Assigns styles to the features of one tile layer.
///
/// Returning `None` silently excludes the feature. To draw a feature that should be styled but has
/// no configuration, return [`Style::missing`].
pub trait Classifier: Send + Sync {
    /// Classifies a point feature.
    fn classify_point(&self, _properties: &Properties, _zoom: u32) -> Option<Style> {
        None
    }

    /// Classifies a line feature.
    fn classify_line(&self, _properties: &Properties, _zoom: u32) -> Option<Style> {
        None
    }

    /// Classifies a polygon feature.
    fn classify_polygon(&self, _properties: &Properties, _zoom: u32) -> Option<Style> {
        None
    }

    /// Dispatches to the method for the given geometry kind.
    fn classify(&self, kind: GeometryKind, properties: &Properties, zoom: u32) -> Option<Style> {
        match kind {
            GeometryKind::Point => self.classify_point(properties, zoom),
            GeometryKind::Line => self.classify_line(properties, zoom),
            GeometryKind::Polygon => self.classify_polygon(properties, zoom),
        }
    }
}

/// Returns the property as a string. Numbers and booleans are converted with their JSON
/// representation.
pub fn property_str<'a>(properties: &'a Properties, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    match properties.get(key)? {
        Value::String(s) => Some(s.as_str().into()),
        Value::Number(n) => Some(n.to_string().into()),
        Value::Bool(b) => Some(b.to_string().into()),
        _ => None,
    }
}

/// A rule of [`RuleClassifier`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClassRule {
    /// If set, the rule applies only to geometries of this kind.
    #[serde(default)]
    pub geometry: Option<GeometryKind>,
    /// Properties a feature must have with exactly these values. Non-string values are compared by
    /// their JSON representation.
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// Minimum zoom level (inclusive) the rule applies at.
    #[serde(default)]
    pub min_zoom: Option<u32>,
    /// Maximum zoom level (inclusive) the rule applies at.
    #[serde(default)]
    pub max_zoom: Option<u32>,
    /// Class name assigned by the rule. Defaults to `{classifier name}:{rule index}`.
    #[serde(default)]
    pub class: Option<String>,
    /// Style of the class. A rule without style marks features that must be drawn but have no
    /// configuration yet: they get the missing style fallback.
    #[serde(default)]
    pub style: Option<StyleRecord>,
}

impl ClassRule {
    fn matches(&self, kind: GeometryKind, properties: &Properties, zoom: u32) -> bool {
        self.geometry.map_or(true, |g| g == kind)
            && self.min_zoom.map_or(true, |min| zoom >= min)
            && self.max_zoom.map_or(true, |max| zoom <= max)
            && self.properties.iter().all(|(key, value)| {
                property_str(properties, key).is_some_and(|v| v == value.as_str())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleSet {
    name: String,
    rules: Vec<ClassRule>,
}

/// Data-driven classifier configured with a list of rules.
///
/// Rules are traversed in sequence and the first rule matching the feature defines its style.
/// Features matched by no rule are excluded.
///
/// ```
/// use meridian::classify::{Classifier, RuleClassifier};
/// use serde_json::json;
///
/// let classifier: RuleClassifier = serde_json::from_value(json!({
///     "name": "railway",
///     "rules": [{
///         "geometry": "line",
///         "properties": { "railway": "rail" },
///         "class": "railway:rail",
///         "style": { "line-width": 1.5, "line-color": "#707070" }
///     }]
/// }))?;
///
/// let properties = json!({ "railway": "rail" }).as_object().cloned().unwrap_or_default();
/// let style = classifier.classify_line(&properties, 14).expect("rail is styled");
/// assert_eq!(&**style.class(), "railway:rail");
/// assert!(classifier.classify_point(&properties, 14).is_none());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RuleSet")]
pub struct RuleClassifier {
    name: String,
    rules: Vec<(ClassRule, Style)>,
}

impl From<RuleSet> for RuleClassifier {
    fn from(value: RuleSet) -> Self {
        Self::new(value.name, value.rules)
    }
}

impl RuleClassifier {
    /// Creates a new classifier. Styles of the rules are prepared once here and shared by all
    /// features they match.
    pub fn new(name: impl Into<String>, rules: Vec<ClassRule>) -> Self {
        let name = name.into();
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| {
                let class = rule
                    .class
                    .clone()
                    .unwrap_or_else(|| format!("{name}:{index}"));
                let style = match &rule.style {
                    Some(record) => Style::new(class, Arc::new(record.clone())),
                    None => Style::missing(class),
                };
                (rule, style)
            })
            .collect();

        Self { name, rules }
    }

    /// Parses a classifier from its JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, MeridianError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Name of the classifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, kind: GeometryKind, properties: &Properties, zoom: u32) -> Option<Style> {
        self.rules
            .iter()
            .find(|(rule, _)| rule.matches(kind, properties, zoom))
            .map(|(_, style)| style.clone())
    }
}

impl Classifier for RuleClassifier {
    fn classify_point(&self, properties: &Properties, zoom: u32) -> Option<Style> {
        self.find(GeometryKind::Point, properties, zoom)
    }

    fn classify_line(&self, properties: &Properties, zoom: u32) -> Option<Style> {
        self.find(GeometryKind::Line, properties, zoom)
    }

    fn classify_polygon(&self, properties: &Properties, zoom: u32) -> Option<Style> {
        self.find(GeometryKind::Polygon, properties, zoom)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::style::ZoomValue;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn classifier() -> RuleClassifier {
        RuleClassifier::from_json(
            r##"{
                "name": "test",
                "rules": [
                    { "geometry": "polygon", "properties": { "natural": "water" },
                      "style": { "fill-color": "#AAD3DF" } },
                    { "properties": { "natural": "water" }, "min-zoom": 10, "class": "water:line",
                      "style": { "line-width": [10, 1, 14, 3] } },
                    { "properties": { "admin_level": "2" }, "class": "border" },
                    { "properties": { "layer": "-1" }, "max-zoom": 12, "class": "underground",
                      "style": {} }
                ]
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn first_matching_rule_wins() {
        let classifier = classifier();
        let water = props(json!({ "natural": "water", "name": "Lake" }));

        let style = classifier.classify_polygon(&water, 5).unwrap();
        assert_eq!(&**style.class(), "test:0");
        assert_eq!(style.record().fill_color, crate::Color::try_from_hex("#AAD3DF"));

        assert!(classifier.classify_line(&water, 5).is_none());
        let style = classifier.classify_line(&water, 10).unwrap();
        assert_eq!(&**style.class(), "water:line");
        assert_eq!(
            style.record().line_width,
            Some(ZoomValue::Interpolated(10.0, 1.0, 14.0, 3.0))
        );
    }

    #[test]
    fn numbers_match_string_values() {
        let classifier = classifier();
        let border = props(json!({ "admin_level": 2 }));
        let style = classifier.classify_line(&border, 3).unwrap();
        assert!(style.is_missing());
        assert_eq!(&**style.class(), "border");

        let underground = props(json!({ "layer": -1 }));
        assert!(classifier.classify_point(&underground, 12).is_some());
        assert!(classifier.classify_point(&underground, 13).is_none());
    }

    #[test]
    fn unmatched_features_are_excluded() {
        let classifier = classifier();
        assert!(classifier
            .classify_point(&props(json!({ "amenity": "cafe" })), 16)
            .is_none());
    }

    #[test]
    fn invalid_config() {
        assert_matches!(
            RuleClassifier::from_json(r#"{ "name": "x", "rules": [{ "geometry": "curve" }] }"#),
            Err(MeridianError::Config(_))
        );
    }
}
