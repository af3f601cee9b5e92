use std::ops::Range;

use lyon::math::point;
use lyon::path::path::Builder;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};
use meridian_types::{Point2, Rect};

use super::{Surface, TextCommand};
use crate::style::{FillPaint, LineCap, LineJoin, StrokePaint};

const TOLERANCE: f32 = 0.1;

/// Vertex of a tessellated mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredVertex {
    /// Position in surface pixels.
    pub position: [f32; 2],
    /// RGBA color with channels in `0.0..=1.0`.
    pub color: [f32; 4],
}

/// Triangles produced by one stroke or fill operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Range of the operation's indices in [`TessellatingSurface::indices`].
    pub indices: Range<usize>,
    /// Clip rectangle active when the operation was issued.
    pub clip: Option<Rect>,
}

/// Surface converting strokes and fills into triangle meshes with lyon.
///
/// All meshes share one vertex and index buffer, ready to be uploaded to a GPU. Texts are collected
/// as is, for the backend to render with its own text engine. Dash patterns are not supported:
/// dashed lines are tessellated as solid ones.
pub struct TessellatingSurface {
    path: Option<Builder>,
    sub_path_open: bool,
    stroke_tessellator: StrokeTessellator,
    fill_tessellator: FillTessellator,
    buffers: VertexBuffers<ColoredVertex, u32>,
    meshes: Vec<Mesh>,
    clip: Option<Rect>,
    texts: Vec<(TextCommand, Option<Rect>)>,
}

impl Default for TessellatingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TessellatingSurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self {
            path: None,
            sub_path_open: false,
            stroke_tessellator: StrokeTessellator::new(),
            fill_tessellator: FillTessellator::new(),
            buffers: VertexBuffers::new(),
            meshes: vec![],
            clip: None,
            texts: vec![],
        }
    }

    /// Vertices of all meshes.
    pub fn vertices(&self) -> &[ColoredVertex] {
        &self.buffers.vertices
    }

    /// Triangle indices of all meshes.
    pub fn indices(&self) -> &[u32] {
        &self.buffers.indices
    }

    /// Meshes in drawing order.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Texts in drawing order with the clip rectangle active at the time.
    pub fn texts(&self) -> &[(TextCommand, Option<Rect>)] {
        &self.texts
    }

    /// Removes all meshes and texts.
    pub fn clear(&mut self) {
        self.path = None;
        self.sub_path_open = false;
        self.buffers.vertices.clear();
        self.buffers.indices.clear();
        self.meshes.clear();
        self.clip = None;
        self.texts.clear();
    }

    fn builder(&mut self) -> &mut Builder {
        self.path.get_or_insert_with(Path::builder)
    }

    fn ensure_sub_path(&mut self, at: Point2<f64>) {
        if !self.sub_path_open {
            self.move_to(at);
        }
    }

    fn take_path(&mut self) -> Option<Path> {
        let mut builder = self.path.take()?;
        if self.sub_path_open {
            builder.end(false);
            self.sub_path_open = false;
        }

        Some(builder.build())
    }

    fn push_mesh(&mut self, vertex_start: usize, index_start: usize, ok: bool) {
        if !ok {
            self.buffers.vertices.truncate(vertex_start);
            self.buffers.indices.truncate(index_start);
            return;
        }

        let index_end = self.buffers.indices.len();
        if index_end > index_start {
            self.meshes.push(Mesh {
                indices: index_start..index_end,
                clip: self.clip,
            });
        }
    }
}

impl Surface for TessellatingSurface {
    fn move_to(&mut self, at: Point2<f64>) {
        let sub_path_open = self.sub_path_open;
        let builder = self.builder();
        if sub_path_open {
            builder.end(false);
        }

        let _ = builder.begin(point(at.x as f32, at.y as f32));
        self.sub_path_open = true;
    }

    fn line_to(&mut self, to: Point2<f64>) {
        if !self.sub_path_open {
            self.move_to(to);
            return;
        }

        let _ = self.builder().line_to(point(to.x as f32, to.y as f32));
    }

    fn curve_to(&mut self, control1: Point2<f64>, control2: Point2<f64>, to: Point2<f64>) {
        self.ensure_sub_path(control1);
        let _ = self.builder().cubic_bezier_to(
            point(control1.x as f32, control1.y as f32),
            point(control2.x as f32, control2.y as f32),
            point(to.x as f32, to.y as f32),
        );
    }

    fn close_path(&mut self) {
        if self.sub_path_open {
            self.builder().end(true);
            self.sub_path_open = false;
        }
    }

    fn stroke(&mut self, paint: &StrokePaint) {
        let Some(path) = self.take_path() else {
            return;
        };

        if paint.dash.is_some() {
            log::trace!("Dash pattern is not supported, stroking a solid line");
        }

        let options = StrokeOptions::DEFAULT
            .with_line_width(paint.width as f32)
            .with_line_cap(lyon_cap(paint.cap))
            .with_line_join(lyon_join(paint.join))
            .with_tolerance(TOLERANCE);
        let vertex_constructor = PaintVertexConstructor {
            color: paint.color.to_f32_array(),
        };

        let vertex_start = self.buffers.vertices.len();
        let index_start = self.buffers.indices.len();
        let result = self.stroke_tessellator.tessellate_path(
            &path,
            &options,
            &mut BuffersBuilder::new(&mut self.buffers, vertex_constructor),
        );
        if let Err(err) = &result {
            log::error!("Stroke tessellation failed: {err:?}");
        }

        self.push_mesh(vertex_start, index_start, result.is_ok());
    }

    fn fill(&mut self, paint: &FillPaint) {
        let Some(path) = self.take_path() else {
            return;
        };

        let vertex_constructor = PaintVertexConstructor {
            color: paint.color.to_f32_array(),
        };

        let vertex_start = self.buffers.vertices.len();
        let index_start = self.buffers.indices.len();
        let result = self.fill_tessellator.tessellate_path(
            &path,
            &FillOptions::DEFAULT.with_tolerance(TOLERANCE),
            &mut BuffersBuilder::new(&mut self.buffers, vertex_constructor),
        );
        if let Err(err) = &result {
            log::error!("Fill tessellation failed: {err:?}");
        }

        self.push_mesh(vertex_start, index_start, result.is_ok());
    }

    fn clip(&mut self, rect: Rect) {
        self.clip = Some(rect);
    }

    fn reset_clip(&mut self) {
        self.clip = None;
    }

    fn draw_text(&mut self, text: &TextCommand) {
        self.texts.push((text.clone(), self.clip));
    }
}

fn lyon_cap(cap: LineCap) -> lyon::tessellation::LineCap {
    match cap {
        LineCap::Butt => lyon::tessellation::LineCap::Butt,
        LineCap::Round => lyon::tessellation::LineCap::Round,
        LineCap::Square => lyon::tessellation::LineCap::Square,
    }
}

fn lyon_join(join: LineJoin) -> lyon::tessellation::LineJoin {
    match join {
        LineJoin::Miter => lyon::tessellation::LineJoin::MiterClip,
        LineJoin::Round => lyon::tessellation::LineJoin::Round,
        LineJoin::Bevel => lyon::tessellation::LineJoin::Bevel,
    }
}

struct PaintVertexConstructor {
    color: [f32; 4],
}

impl StrokeVertexConstructor<ColoredVertex> for PaintVertexConstructor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> ColoredVertex {
        ColoredVertex {
            position: vertex.position().to_array(),
            color: self.color,
        }
    }
}

impl FillVertexConstructor<ColoredVertex> for PaintVertexConstructor {
    fn new_vertex(&mut self, vertex: FillVertex) -> ColoredVertex {
        ColoredVertex {
            position: vertex.position().to_array(),
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn square(surface: &mut TessellatingSurface, size: f64) {
        surface.move_to(Point2::new(0.0, 0.0));
        surface.line_to(Point2::new(size, 0.0));
        surface.line_to(Point2::new(size, size));
        surface.line_to(Point2::new(0.0, size));
        surface.close_path();
    }

    #[test]
    fn fill_square() {
        let mut surface = TessellatingSurface::new();
        square(&mut surface, 10.0);
        surface.fill(&FillPaint { color: Color::WHITE });

        assert_eq!(surface.meshes().len(), 1);
        assert_eq!(surface.indices().len(), 6);
        assert_eq!(surface.vertices().len(), 4);
        assert!(surface
            .vertices()
            .iter()
            .all(|v| v.color == [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn stroke_consumes_path() {
        let mut surface = TessellatingSurface::new();
        surface.move_to(Point2::new(0.0, 5.0));
        surface.line_to(Point2::new(100.0, 5.0));

        let paint = StrokePaint {
            width: 4.0,
            color: Color::BLACK,
            dash: None,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
        };
        surface.stroke(&paint);
        surface.stroke(&paint);

        assert_eq!(surface.meshes().len(), 1);
        let mesh = &surface.meshes()[0];
        assert_eq!(mesh.indices.len() % 3, 0);
        for vertex in surface.vertices() {
            assert!((vertex.position[1] - 5.0).abs() <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn meshes_remember_clip() {
        let mut surface = TessellatingSurface::new();
        let clip = Rect::new(0.0, 0.0, 256.0, 256.0);
        surface.clip(clip);
        square(&mut surface, 10.0);
        surface.fill(&FillPaint { color: Color::BLACK });
        surface.reset_clip();
        square(&mut surface, 10.0);
        surface.fill(&FillPaint { color: Color::BLACK });

        assert_eq!(surface.meshes()[0].clip, Some(clip));
        assert_eq!(surface.meshes()[1].clip, None);
    }

    #[test]
    fn line_without_move_starts_sub_path() {
        let mut surface = TessellatingSurface::new();
        surface.line_to(Point2::new(0.0, 0.0));
        surface.line_to(Point2::new(10.0, 10.0));
        surface.stroke(&StrokePaint {
            width: 1.0,
            color: Color::BLACK,
            dash: Some(vec![2.0, 2.0]),
            cap: LineCap::Round,
            join: LineJoin::Round,
        });

        assert_eq!(surface.meshes().len(), 1);
    }
}
