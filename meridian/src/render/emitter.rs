use std::sync::Arc;

use meridian_types::projection::TILE_SIZE;
use meridian_types::{Point2, Polygon, Rect, Vector2};

use super::{DrawPass, PassComponent, Surface, TextCommand};
use crate::diagnostics::Diagnostics;
use crate::label::LabelPlacement;
use crate::loader::{Classified, TileGeometry};
use crate::style::{
    FillPaint, FontWeight, LineCap, LineJoin, ResolvedStyle, StrokePaint, StyleCache,
};
use crate::tileset::{PreparedLayer, PreparedTile};
use crate::Color;

/// Bezier control point distance approximating a quarter circle of radius 1.
const CIRCLE_KAPPA: f64 = 0.552_284_749_831;

/// Appearance of route shields.
#[derive(Debug, Clone, PartialEq)]
pub struct ShieldStyle {
    /// Fill color of the badge.
    pub background: Color,
    /// Border color of the badge.
    pub border: Color,
    /// Border width in pixels.
    pub border_width: f64,
    /// Space between the text and the border in pixels.
    pub padding: f64,
}

impl Default for ShieldStyle {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            border: Color::from_hex("#666666"),
            border_width: 1.0,
            padding: 2.0,
        }
    }
}

/// Emits draw commands of prepared tiles into a [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct TileRenderer {
    shield: ShieldStyle,
}

impl TileRenderer {
    /// Creates a renderer with default shield style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the appearance of route shields.
    pub fn with_shield_style(mut self, shield: ShieldStyle) -> Self {
        self.shield = shield;
        self
    }

    /// Draws the tiles.
    ///
    /// Pass `k` is drawn for every tile before pass `k + 1` of any tile. Styles are resolved once
    /// per tile, layer, zoom level and style class for the duration of the call. Class names are
    /// unique within one classifier only, so every layer has its own cache.
    pub fn render_tiles(
        &self,
        tiles: &[PreparedTile],
        surface: &mut dyn Surface,
        diagnostics: &mut dyn Diagnostics,
    ) {
        let passes: Vec<Vec<(usize, &DrawPass)>> = tiles
            .iter()
            .map(|tile| {
                tile.layers
                    .iter()
                    .enumerate()
                    .flat_map(|(i, layer)| layer.passes.iter().map(move |pass| (i, pass)))
                    .collect()
            })
            .collect();
        let pass_count = passes.iter().map(Vec::len).max().unwrap_or(0);
        let mut caches: Vec<Vec<StyleCache>> = tiles
            .iter()
            .map(|tile| tile.layers.iter().map(|_| StyleCache::new()).collect())
            .collect();

        for pass_index in 0..pass_count {
            log::trace!("Drawing pass {pass_index} of {} tiles", tiles.len());

            for ((tile, tile_passes), tile_caches) in tiles.iter().zip(&passes).zip(&mut caches) {
                let Some(&(layer_index, pass)) = tile_passes.get(pass_index) else {
                    continue;
                };
                let (Some(layer), Some(cache)) =
                    (tile.layers.get(layer_index), tile_caches.get_mut(layer_index))
                else {
                    continue;
                };

                let mut painter = Painter {
                    surface: &mut *surface,
                    origin: tile.origin,
                };
                let mut styles = Styles {
                    cache,
                    zoom: tile.index.z,
                    diagnostics: &mut *diagnostics,
                };

                self.draw_pass(layer, pass, &mut painter, &mut styles);
            }
        }
    }

    /// Draws one pass of a layer. Label components are never clipped: label anchors are inside
    /// the tile, but the text may extend past its border.
    fn draw_pass(
        &self,
        layer: &PreparedLayer,
        pass: &DrawPass,
        painter: &mut Painter,
        styles: &mut Styles,
    ) {
        let clip = layer.clip_inset.map(|inset| {
            Rect::new(0.0, 0.0, TILE_SIZE, TILE_SIZE)
                .shrink(inset)
                .translate(painter.origin.x, painter.origin.y)
        });

        let mut clipped = false;
        for component in pass.components() {
            match (clip, *component == PassComponent::Labels) {
                (Some(rect), false) if !clipped => {
                    painter.surface.clip(rect);
                    clipped = true;
                }
                (_, true) if clipped => {
                    painter.surface.reset_clip();
                    clipped = false;
                }
                _ => {}
            }

            self.draw_component(*component, &layer.geometry, painter, styles);
        }

        if clipped {
            painter.surface.reset_clip();
        }
    }

    fn draw_component(
        &self,
        component: PassComponent,
        geometry: &TileGeometry,
        painter: &mut Painter,
        styles: &mut Styles,
    ) {
        match component {
            PassComponent::Fill => {
                for polygon in &geometry.polygons {
                    let style = styles.get(polygon);
                    if let Some(fill) = &style.fill {
                        painter.polygon(&polygon.geometry);
                        painter.surface.fill(fill);
                    }
                }
            }
            PassComponent::Underline | PassComponent::Line | PassComponent::Overline => {
                for line in &geometry.lines {
                    let style = styles.get(line);
                    if let Some(paint) = stroke_of(component, &style) {
                        painter.line(line.geometry.points());
                        painter.surface.stroke(paint);
                    }
                }

                for polygon in &geometry.polygons {
                    let style = styles.get(polygon);
                    if let Some(paint) = stroke_of(component, &style) {
                        painter.polygon(&polygon.geometry);
                        painter.surface.stroke(paint);
                    }
                }
            }
            PassComponent::Points => {
                for point in &geometry.points {
                    let style = styles.get(point);
                    if let Some((size, paint)) = &style.point {
                        painter.circle(point.geometry, size / 2.0);
                        painter.surface.fill(paint);
                    }
                }
            }
            PassComponent::Labels => {
                for label in geometry
                    .polygon_labels
                    .iter()
                    .chain(&geometry.line_labels)
                    .chain(&geometry.point_labels)
                {
                    let style = styles.get(label);
                    if let Some(text) = label_text(&style, &label.geometry, painter) {
                        painter.surface.draw_text(&text);
                    }
                }

                for shield in &geometry.line_shields {
                    let style = styles.get(shield);
                    if let Some(text) = label_text(&style, &shield.geometry, painter) {
                        self.draw_shield(text, painter);
                    }
                }
            }
        }
    }

    fn draw_shield(&self, mut text: TextCommand, painter: &mut Painter) {
        let padding = self.shield.padding;
        let half_width = text.text.chars().count() as f64 * text.font_size * 0.3 + padding;
        let half_height = text.font_size / 2.0 + padding;
        let badge = Rect::new(
            text.position.x - half_width,
            text.position.y - half_height,
            text.position.x + half_width,
            text.position.y + half_height,
        );

        painter.rect(badge);
        painter.surface.fill(&FillPaint {
            color: self.shield.background,
        });

        if self.shield.border_width > 0.0 {
            painter.rect(badge);
            painter.surface.stroke(&StrokePaint {
                width: self.shield.border_width,
                color: self.shield.border,
                dash: None,
                cap: LineCap::Butt,
                join: LineJoin::Miter,
            });
        }

        text.halo = None;
        text.font_weight = FontWeight::Bold;
        painter.surface.draw_text(&text);
    }
}

fn stroke_of(component: PassComponent, style: &ResolvedStyle) -> Option<&StrokePaint> {
    match component {
        PassComponent::Underline => style.underline.as_ref(),
        PassComponent::Line => style.line.as_ref(),
        PassComponent::Overline => style.overline.as_ref(),
        _ => None,
    }
}

fn label_text(
    style: &ResolvedStyle,
    label: &LabelPlacement,
    painter: &Painter,
) -> Option<TextCommand> {
    let paint = style.text?;
    Some(TextCommand {
        position: painter.point(&label.anchor),
        rotation: label.rotation,
        text: label.text.clone(),
        font_size: label.font_size,
        font_weight: paint.font_weight,
        color: paint.color,
        halo: paint.halo,
    })
}

struct Styles<'a> {
    cache: &'a mut StyleCache,
    zoom: u32,
    diagnostics: &'a mut dyn Diagnostics,
}

impl Styles<'_> {
    fn get<G>(&mut self, feature: &Classified<G>) -> Arc<ResolvedStyle> {
        self.cache.get(&feature.style, self.zoom, self.diagnostics)
    }
}

/// Issues path operations in tile pixels offset by the tile origin.
struct Painter<'a> {
    surface: &'a mut dyn Surface,
    origin: Vector2<f64>,
}

impl Painter<'_> {
    fn point(&self, point: &Point2<f64>) -> Point2<f64> {
        *point + self.origin
    }

    fn line(&mut self, points: &[Point2<f64>]) {
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            self.surface.move_to(self.point(first));
        }
        for point in iter {
            self.surface.line_to(self.point(point));
        }
    }

    fn polygon(&mut self, polygon: &Polygon<Point2<f64>>) {
        for ring in polygon.iter_rings() {
            self.line(ring);
            self.surface.close_path();
        }
    }

    fn rect(&mut self, rect: Rect) {
        let corners = rect.into_quadrangle();
        self.surface.move_to(corners[0]);
        for corner in &corners[1..] {
            self.surface.line_to(*corner);
        }
        self.surface.close_path();
    }

    fn circle(&mut self, center: Point2<f64>, radius: f64) {
        let c = self.point(&center);
        let k = radius * CIRCLE_KAPPA;
        let (x, y, r) = (c.x, c.y, radius);

        self.surface.move_to(Point2::new(x + r, y));
        self.surface.curve_to(
            Point2::new(x + r, y + k),
            Point2::new(x + k, y + r),
            Point2::new(x, y + r),
        );
        self.surface.curve_to(
            Point2::new(x - k, y + r),
            Point2::new(x - r, y + k),
            Point2::new(x - r, y),
        );
        self.surface.curve_to(
            Point2::new(x - r, y - k),
            Point2::new(x - k, y - r),
            Point2::new(x, y - r),
        );
        self.surface.curve_to(
            Point2::new(x + k, y - r),
            Point2::new(x + r, y - k),
            Point2::new(x + r, y),
        );
        self.surface.close_path();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use meridian_types::LineString;

    use super::*;
    use crate::diagnostics::Warning;
    use crate::render::{CommandList, DrawCommand};
    use crate::style::{Style, StyleRecord, ZoomValue};
    use crate::tile_schema::TileIndex;

    fn classified<G>(geometry: G, style: &Style) -> Classified<G> {
        Classified {
            id: None,
            geometry,
            properties: Arc::default(),
            style: style.clone(),
        }
    }

    fn cased_style() -> Style {
        Style::new(
            "road",
            Arc::new(StyleRecord {
                underline_width: Some(ZoomValue::Constant(5.0)),
                underline_color: Some(Color::BLACK),
                overline_width: Some(ZoomValue::Constant(3.0)),
                overline_color: Some(Color::WHITE),
                font_size: Some(ZoomValue::Constant(10.0)),
                color: Some(Color::BLACK),
                ..Default::default()
            }),
        )
    }

    fn tile(origin: Vector2<f64>, passes: Vec<DrawPass>, clip_inset: Option<f64>) -> PreparedTile {
        let index = TileIndex::new(0, 0, 14);
        let style = cased_style();
        let mut geometry = TileGeometry::empty(index);
        geometry.lines.push(classified(
            LineString::new(vec![Point2::new(10.0, 10.0), Point2::new(100.0, 10.0)]),
            &style,
        ));
        geometry.line_labels.push(classified(
            LabelPlacement {
                anchor: Point2::new(55.0, 10.0),
                rotation: 0.0,
                text: "Main".into(),
                font_size: 10.0,
            },
            &style,
        ));

        PreparedTile {
            index,
            origin,
            layers: vec![PreparedLayer {
                name: "roads".into(),
                passes,
                clip_inset,
                geometry,
            }],
        }
    }

    #[test]
    fn pass_is_drawn_for_all_tiles_before_the_next_one() {
        let passes = vec![
            DrawPass::new([PassComponent::Underline]),
            DrawPass::new([PassComponent::Overline]),
        ];
        let tiles = [
            tile(Vector2::zeros(), passes.clone(), None),
            tile(Vector2::new(256.0, 0.0), passes, None),
        ];

        let mut commands = CommandList::new();
        let mut diagnostics: Vec<Warning> = vec![];
        TileRenderer::new().render_tiles(&tiles, &mut commands, &mut diagnostics);

        let widths: Vec<_> = commands.strokes().map(|s| s.width).collect();
        assert_eq!(widths, vec![5.0, 5.0, 3.0, 3.0]);
        assert!(diagnostics.is_empty());

        let xs: Vec<_> = commands.path_points().map(|p| p.x).collect();
        assert_eq!(xs, vec![10.0, 100.0, 266.0, 356.0, 10.0, 100.0, 266.0, 356.0]);
    }

    #[test]
    fn same_class_in_different_layers_keeps_its_own_style() {
        let index = TileIndex::new(0, 0, 14);
        let layer = |name: &str, width: f64| {
            let style = Style::new(
                "water",
                Arc::new(StyleRecord {
                    line_width: Some(ZoomValue::Constant(width)),
                    line_color: Some(Color::BLACK),
                    ..Default::default()
                }),
            );
            let mut geometry = TileGeometry::empty(index);
            geometry.lines.push(classified(
                LineString::new(vec![Point2::new(10.0, 10.0), Point2::new(100.0, 10.0)]),
                &style,
            ));
            PreparedLayer {
                name: name.into(),
                passes: vec![DrawPass::new([PassComponent::Line])],
                clip_inset: None,
                geometry,
            }
        };
        let tile = PreparedTile {
            index,
            origin: Vector2::zeros(),
            layers: vec![layer("rivers", 2.0), layer("canals", 5.0)],
        };

        let mut commands = CommandList::new();
        TileRenderer::new().render_tiles(&[tile], &mut commands, &mut Vec::<Warning>::new());

        let widths: Vec<_> = commands.strokes().map(|s| s.width).collect();
        assert_eq!(widths, vec![2.0, 5.0]);
    }

    #[test]
    fn clip_does_not_cover_labels() {
        let tiles = [tile(
            Vector2::new(256.0, 512.0),
            vec![DrawPass::new([PassComponent::Underline, PassComponent::Labels])],
            Some(0.0),
        )];

        let mut commands = CommandList::new();
        TileRenderer::new().render_tiles(&tiles, &mut commands, &mut Vec::<Warning>::new());

        let commands = commands.into_commands();
        assert_matches!(&commands[0], DrawCommand::Clip(rect) => {
            assert_eq!(*rect, Rect::new(256.0, 512.0, 512.0, 768.0));
        });
        let reset = commands
            .iter()
            .position(|c| *c == DrawCommand::ResetClip)
            .expect("clip is reset");
        assert_matches!(&commands[reset - 1], DrawCommand::Stroke(_));
        assert_matches!(&commands[reset + 1], DrawCommand::Text(text) => {
            assert_eq!(text.text, "Main");
            assert_eq!(text.position, Point2::new(311.0, 522.0));
        });
        assert_eq!(commands.len(), reset + 2);
    }

    #[test]
    fn points_are_drawn_as_circles() {
        let index = TileIndex::new(0, 0, 10);
        let style = Style::new(
            "place",
            Arc::new(StyleRecord {
                point_size: Some(ZoomValue::Constant(4.0)),
                fill_color: Some(Color::BLACK),
                ..Default::default()
            }),
        );
        let mut geometry = TileGeometry::empty(index);
        geometry
            .points
            .push(classified(Point2::new(20.0, 30.0), &style));
        let tiles = [PreparedTile {
            index,
            origin: Vector2::zeros(),
            layers: vec![PreparedLayer {
                name: "places".into(),
                passes: vec![DrawPass::new([PassComponent::Points])],
                clip_inset: None,
                geometry,
            }],
        }];

        let mut commands = CommandList::new();
        TileRenderer::new().render_tiles(&tiles, &mut commands, &mut Vec::<Warning>::new());

        let curves = commands
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::CurveTo(..)))
            .count();
        assert_eq!(curves, 4);
        assert_eq!(commands.fills().count(), 1);
        assert_matches!(&commands.commands()[0], DrawCommand::MoveTo(p) => {
            assert_relative_eq!(p.x, 22.0);
            assert_relative_eq!(p.y, 30.0);
        });
    }

    #[test]
    fn shields_have_badges() {
        let index = TileIndex::new(0, 0, 12);
        let style = cased_style();
        let mut geometry = TileGeometry::empty(index);
        geometry.line_shields.push(classified(
            LabelPlacement {
                anchor: Point2::new(50.0, 50.0),
                rotation: 0.0,
                text: "A1".into(),
                font_size: 10.0,
            },
            &style,
        ));
        let tiles = [PreparedTile {
            index,
            origin: Vector2::zeros(),
            layers: vec![PreparedLayer {
                name: "roads".into(),
                passes: vec![DrawPass::new([PassComponent::Labels])],
                clip_inset: None,
                geometry,
            }],
        }];

        let mut commands = CommandList::new();
        TileRenderer::new().render_tiles(&tiles, &mut commands, &mut Vec::<Warning>::new());

        assert_eq!(commands.fills().collect::<Vec<_>>(), vec![&FillPaint { color: Color::WHITE }]);
        assert_eq!(commands.strokes().count(), 1);
        let text = commands.texts().next().expect("shield text");
        assert_eq!(text.font_weight, FontWeight::Bold);
        assert_eq!(text.halo, None);
    }

    #[test]
    fn missing_style_is_drawn_with_error_indicator() {
        let index = TileIndex::new(0, 0, 14);
        let mut geometry = TileGeometry::empty(index);
        geometry.lines.push(classified(
            LineString::new(vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)]),
            &Style::missing("road:unknown"),
        ));
        let tiles = [PreparedTile {
            index,
            origin: Vector2::zeros(),
            layers: vec![PreparedLayer {
                name: "roads".into(),
                passes: vec![DrawPass::new([PassComponent::Line])],
                clip_inset: None,
                geometry,
            }],
        }];

        let mut commands = CommandList::new();
        TileRenderer::new().render_tiles(&tiles, &mut commands, &mut Vec::<Warning>::new());

        let stroke = commands.strokes().next().expect("stroke");
        assert_eq!(stroke.color, Color::ERROR_INDICATOR);
    }
}
