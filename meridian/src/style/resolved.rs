use std::sync::Arc;

use ahash::{HashMap, HashMapExt};

use super::{FontWeight, LineCap, LineJoin, Style, ZoomValue};
use crate::diagnostics::{Diagnostics, Warning};
use crate::Color;

const MIN_PLAUSIBLE_VALUE: f64 = 0.1;

/// Parameters of a stroke operation.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePaint {
    /// Stroke width in pixels.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
    /// Alternating dash and gap lengths. `None` for a solid line.
    pub dash: Option<Vec<f64>>,
    /// Line cap.
    pub cap: LineCap,
    /// Line join.
    pub join: LineJoin,
}

/// Parameters of a fill operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPaint {
    /// Fill color.
    pub color: Color,
}

/// Parameters of label text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPaint {
    /// Font size in pixels.
    pub font_size: f64,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Text color.
    pub color: Color,
    /// Color of the outline around the letters.
    pub halo: Option<Color>,
}

/// Style record with all zoom-dependent values resolved for one zoom level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    /// Casing stroke drawn below the line.
    pub underline: Option<StrokePaint>,
    /// Main line stroke.
    pub line: Option<StrokePaint>,
    /// Stroke drawn above the line.
    pub overline: Option<StrokePaint>,
    /// Polygon fill.
    pub fill: Option<FillPaint>,
    /// Diameter of point circles and the paint they are filled with.
    pub point: Option<(f64, FillPaint)>,
    /// Label text paint.
    pub text: Option<TextPaint>,
}

impl ResolvedStyle {
    /// Resolves the style for the given zoom level.
    ///
    /// Values smaller than `0.1` are reported as implausible. Components with a non-positive
    /// width or size are not drawn at all.
    pub fn resolve(style: &Style, zoom: u32, diagnostics: &mut dyn Diagnostics) -> Self {
        let record = style.record();
        let mut resolver = Resolver {
            class: style.class(),
            zoom,
            diagnostics,
        };

        let underline = resolver.stroke(
            "underline-width",
            record.underline_width,
            record.underline_color,
            &record.underline_dasharray,
            record.underline_cap,
            record.underline_join,
        );
        let line = resolver.stroke(
            "line-width",
            record.line_width,
            record.line_color,
            &record.line_dasharray,
            record.line_cap,
            record.line_join,
        );
        let overline = resolver.stroke(
            "overline-width",
            record.overline_width,
            record.overline_color,
            &record.overline_dasharray,
            record.overline_cap,
            record.overline_join,
        );

        let point = resolver
            .value("point-size", record.point_size)
            .map(|size| {
                let color = record.color.or(record.fill_color).unwrap_or(Color::BLACK);
                (size, FillPaint { color })
            });

        let text = resolver
            .value("font-size", record.font_size)
            .map(|font_size| TextPaint {
                font_size,
                font_weight: record.font_weight.unwrap_or_default(),
                color: record.color.unwrap_or(Color::BLACK),
                halo: record.halo,
            });

        Self {
            underline,
            line,
            overline,
            fill: record.fill_color.map(|color| FillPaint { color }),
            point,
            text,
        }
    }

    /// Returns true if the style draws at least one stroke.
    pub fn has_strokes(&self) -> bool {
        self.underline.is_some() || self.line.is_some() || self.overline.is_some()
    }
}

struct Resolver<'a> {
    class: &'a Arc<str>,
    zoom: u32,
    diagnostics: &'a mut dyn Diagnostics,
}

impl Resolver<'_> {
    fn value(&mut self, property: &'static str, value: Option<ZoomValue>) -> Option<f64> {
        let value = value?.resolve(self.zoom as f64);
        if value < MIN_PLAUSIBLE_VALUE {
            self.diagnostics.warn(Warning::ImplausibleStyleValue {
                class: self.class.clone(),
                property,
                zoom: self.zoom,
                value,
            });
        }

        (value > 0.0).then_some(value)
    }

    fn stroke(
        &mut self,
        property: &'static str,
        width: Option<ZoomValue>,
        color: Option<Color>,
        dash: &Option<Vec<f64>>,
        cap: Option<LineCap>,
        join: Option<LineJoin>,
    ) -> Option<StrokePaint> {
        let width = self.value(property, width)?;
        Some(StrokePaint {
            width,
            color: color.unwrap_or(Color::BLACK),
            dash: dash.clone().filter(|d| !d.is_empty()),
            cap: cap.unwrap_or_default(),
            join: join.unwrap_or_default(),
        })
    }
}

/// Cache of resolved styles for one render call, keyed by zoom level and style class.
///
/// Class names are unique within one classifier only, so a cache must not be shared between
/// layers.
#[derive(Debug, Default)]
pub struct StyleCache {
    resolved: HashMap<(u32, Arc<str>), Arc<ResolvedStyle>>,
}

impl StyleCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            resolved: HashMap::new(),
        }
    }

    /// Returns the resolved style, resolving it on first access. Warnings about implausible values
    /// are reported only once per zoom level and class.
    pub fn get(
        &mut self,
        style: &Style,
        zoom: u32,
        diagnostics: &mut dyn Diagnostics,
    ) -> Arc<ResolvedStyle> {
        self.resolved
            .entry((zoom, style.class().clone()))
            .or_insert_with(|| Arc::new(ResolvedStyle::resolve(style, zoom, diagnostics)))
            .clone()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Returns true if nothing was resolved yet.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::style::StyleRecord;

    fn motorway() -> Style {
        Style::new(
            "road:motorway",
            Arc::new(StyleRecord {
                underline_width: Some(ZoomValue::Interpolated(12.0, 6.0, 16.0, 10.0)),
                underline_color: Color::try_from_hex("#C24E6B"),
                overline_width: Some(ZoomValue::Interpolated(12.0, 4.0, 16.0, 8.0)),
                overline_color: Color::try_from_hex("#E892A2"),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn resolves_strokes() {
        let mut warnings = Vec::new();
        let resolved = ResolvedStyle::resolve(&motorway(), 14, &mut warnings);

        assert!(resolved.line.is_none());
        assert_abs_diff_eq!(resolved.underline.as_ref().unwrap().width, 8.0);
        assert_abs_diff_eq!(resolved.overline.as_ref().unwrap().width, 6.0);
        assert_eq!(resolved.overline.unwrap().cap, LineCap::Round);
        assert!(warnings.is_empty());
    }

    #[test]
    fn warns_about_implausible_values() {
        let mut warnings = Vec::new();
        let resolved = ResolvedStyle::resolve(&motorway(), 8, &mut warnings);

        // overline width extrapolates to 0.0 at zoom 8
        assert!(resolved.overline.is_none());
        assert!(resolved.underline.is_some());
        assert_eq!(warnings.len(), 1);
        assert_matches!(
            &warnings[0],
            Warning::ImplausibleStyleValue { property: "overline-width", zoom: 8, value, .. } if *value == 0.0
        );
    }

    #[test]
    fn small_positive_value_is_kept() {
        let style = Style::new(
            "thin",
            Arc::new(StyleRecord {
                line_width: Some(ZoomValue::Constant(0.05)),
                ..Default::default()
            }),
        );
        let mut warnings = Vec::new();
        let resolved = ResolvedStyle::resolve(&style, 10, &mut warnings);
        assert_abs_diff_eq!(resolved.line.unwrap().width, 0.05);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn cache_resolves_once_per_zoom_and_class() {
        let mut cache = StyleCache::new();
        let mut warnings = Vec::new();
        let style = motorway();

        let first = cache.get(&style, 8, &mut warnings);
        let second = cache.get(&style, 8, &mut warnings);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(warnings.len(), 1);

        cache.get(&style, 14, &mut warnings);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn text_paint_defaults() {
        let style = Style::new(
            "place:city",
            Arc::new(StyleRecord {
                font_size: Some(ZoomValue::Constant(12.0)),
                ..Default::default()
            }),
        );
        let resolved = ResolvedStyle::resolve(&style, 10, &mut Vec::new());
        let text = resolved.text.unwrap();
        assert_eq!(text.font_weight, FontWeight::Normal);
        assert_eq!(text.color, Color::BLACK);
        assert!(text.halo.is_none());
    }
}
