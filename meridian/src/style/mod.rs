//! Style records assigned to classified features and their zoom-dependent values.
//!
//! A [`StyleRecord`] is the configuration of how one class of features looks. Classifiers return
//! it wrapped into a [`Style`] together with the class name. Before drawing, the record is
//! resolved for the zoom level of the tile into a [`ResolvedStyle`].

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::Color;

mod resolved;

pub use resolved::{FillPaint, ResolvedStyle, StrokePaint, StyleCache, TextPaint};

/// Style property that can depend on the zoom level.
///
/// In configuration it is either a number, or an array `[z0, v0, z1, v1]` describing a linear
/// function of zoom going through points `(z0, v0)` and `(z1, v1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoomValue {
    /// Same value at every zoom level.
    Constant(f64),
    /// Value interpolated linearly between two zoom levels.
    Interpolated(f64, f64, f64, f64),
}

impl ZoomValue {
    /// Returns the value at the given zoom level.
    ///
    /// Interpolated values are extrapolated outside the `z0..z1` range, not clamped, so a rule
    /// can produce small or negative values far from its zoom range.
    pub fn resolve(&self, zoom: f64) -> f64 {
        match *self {
            ZoomValue::Constant(value) => value,
            ZoomValue::Interpolated(z0, v0, z1, v1) => {
                if z0 == z1 {
                    return v0;
                }

                v0 + (zoom - z0) * (v1 - v0) / (z1 - z0)
            }
        }
    }
}

impl From<f64> for ZoomValue {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

/// Shape of the ends of a stroked line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Line ends exactly at the end point.
    Butt,
    /// Half-circle around the end point.
    #[default]
    Round,
    /// Square extending past the end point by half of the line width.
    Square,
}

/// Shape of the corners of a stroked line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    /// Sharp corner.
    Miter,
    /// Rounded corner.
    #[default]
    Round,
    /// Cut corner.
    Bevel,
}

/// Weight of the font.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular text.
    #[default]
    Normal,
    /// Bold text.
    Bold,
}

/// Style configuration of one class of features.
///
/// Every property is optional. A path is drawn with up to three strokes: `underline` (casing)
/// below `line`, and `overline` above it. A stroke is drawn only if its width is set.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct StyleRecord {
    /// Width of the main line.
    pub line_width: Option<ZoomValue>,
    /// Color of the main line.
    pub line_color: Option<Color>,
    /// Dash pattern of the main line: alternating dash and gap lengths.
    pub line_dasharray: Option<Vec<f64>>,
    /// Cap of the main line.
    pub line_cap: Option<LineCap>,
    /// Join of the main line.
    pub line_join: Option<LineJoin>,

    /// Width of the casing drawn below the line.
    pub underline_width: Option<ZoomValue>,
    /// Color of the casing drawn below the line.
    pub underline_color: Option<Color>,
    /// Dash pattern of the casing drawn below the line: alternating dash and gap lengths.
    pub underline_dasharray: Option<Vec<f64>>,
    /// Cap of the casing drawn below the line.
    pub underline_cap: Option<LineCap>,
    /// Join of the casing drawn below the line.
    pub underline_join: Option<LineJoin>,

    /// Width of the stroke drawn above the line.
    pub overline_width: Option<ZoomValue>,
    /// Color of the stroke drawn above the line.
    pub overline_color: Option<Color>,
    /// Dash pattern of the stroke drawn above the line: alternating dash and gap lengths.
    pub overline_dasharray: Option<Vec<f64>>,
    /// Cap of the stroke drawn above the line.
    pub overline_cap: Option<LineCap>,
    /// Join of the stroke drawn above the line.
    pub overline_join: Option<LineJoin>,

    /// Fill color of polygons.
    pub fill_color: Option<Color>,
    /// Diameter of the circle drawn for points.
    pub point_size: Option<ZoomValue>,

    /// Size of label text. Labels are placed only for styles with a font size.
    pub font_size: Option<ZoomValue>,
    /// Weight of label text.
    pub font_weight: Option<FontWeight>,
    /// Color of label text. Also used for points.
    pub color: Option<Color>,
    /// Color of the outline drawn around label letters.
    pub halo: Option<Color>,
}

impl StyleRecord {
    /// Bright green style used for features with missing style configuration, so that the gap in
    /// configuration is visible on the map.
    pub fn error_indicator() -> Self {
        Self {
            line_width: Some(ZoomValue::Constant(2.0)),
            line_color: Some(Color::ERROR_INDICATOR),
            fill_color: Some(Color::ERROR_INDICATOR.with_alpha(128)),
            point_size: Some(ZoomValue::Constant(6.0)),
            color: Some(Color::ERROR_INDICATOR),
            ..Default::default()
        }
    }
}

/// Style assigned to a feature by a classifier.
///
/// Cloning is cheap: the class name and the record are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    class: Arc<str>,
    record: Arc<StyleRecord>,
    missing: bool,
}

impl Style {
    /// Creates a style of the given class.
    pub fn new(class: impl Into<Arc<str>>, record: Arc<StyleRecord>) -> Self {
        Self {
            class: class.into(),
            record,
            missing: false,
        }
    }

    /// Fallback style for a class that has no style configured.
    pub fn missing(class: impl Into<Arc<str>>) -> Self {
        static ERROR_INDICATOR: OnceLock<Arc<StyleRecord>> = OnceLock::new();

        Self {
            class: class.into(),
            record: ERROR_INDICATOR
                .get_or_init(|| Arc::new(StyleRecord::error_indicator()))
                .clone(),
            missing: true,
        }
    }

    /// Class name, e.g. `road:motorway`.
    pub fn class(&self) -> &Arc<str> {
        &self.class
    }

    /// Style configuration.
    pub fn record(&self) -> &StyleRecord {
        &self.record
    }

    /// Returns true for the fallback style of a class without configuration.
    pub fn is_missing(&self) -> bool {
        self.missing
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn zoom_interpolation() {
        let value = ZoomValue::Interpolated(12.0, 6.0, 16.0, 10.0);
        assert_abs_diff_eq!(value.resolve(12.0), 6.0);
        assert_abs_diff_eq!(value.resolve(14.0), 8.0);
        assert_abs_diff_eq!(value.resolve(16.0), 10.0);
    }

    #[test]
    fn zoom_extrapolation_is_not_clamped() {
        let value = ZoomValue::Interpolated(12.0, 4.0, 16.0, 8.0);
        assert_abs_diff_eq!(value.resolve(18.0), 10.0);
        assert_abs_diff_eq!(value.resolve(8.0), 0.0);
        assert_abs_diff_eq!(value.resolve(6.0), -2.0);
    }

    #[test]
    fn degenerate_range() {
        let value = ZoomValue::Interpolated(10.0, 3.0, 10.0, 5.0);
        assert_abs_diff_eq!(value.resolve(14.0), 3.0);
    }

    #[test]
    fn record_from_config() {
        let record: StyleRecord = serde_json::from_value(json!({
            "line-width": [12, 4.0, 16, 8.0],
            "line-color": "#E892A2",
            "line-dasharray": [4, 2],
            "line-cap": "butt",
            "underline-width": 2,
            "font-size": 11,
            "font-weight": "bold",
            "halo": "#FFFFFFCC",
        }))
        .unwrap();

        assert_eq!(
            record.line_width,
            Some(ZoomValue::Interpolated(12.0, 4.0, 16.0, 8.0))
        );
        assert_eq!(record.line_color, Color::try_from_hex("#E892A2"));
        assert_eq!(record.line_dasharray, Some(vec![4.0, 2.0]));
        assert_eq!(record.line_cap, Some(LineCap::Butt));
        assert_eq!(record.underline_width, Some(ZoomValue::Constant(2.0)));
        assert_eq!(record.font_weight, Some(FontWeight::Bold));
        assert!(record.overline_width.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_value::<StyleRecord>(json!({ "line-widht": 2 }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_style_shares_indicator_record() {
        let a = Style::missing("road:unknown");
        let b = Style::missing("admin:13");
        assert!(a.is_missing());
        assert!(Arc::ptr_eq(&a.record, &b.record));
        assert_eq!(a.record().line_color, Some(Color::ERROR_INDICATOR));
    }
}
