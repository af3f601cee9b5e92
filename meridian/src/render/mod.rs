//! Emission of draw commands for prepared tiles.
//!
//! The renderer does not depend on any drawing backend. It issues path and paint operations into a
//! [`Surface`]. [`CommandList`] records them for later replay or inspection, and
//! `TessellatingSurface` (with the `lyon` feature) turns them into triangle meshes.

use meridian_types::{Point2, Rect};

use crate::style::{FillPaint, FontWeight, StrokePaint};
use crate::Color;

mod emitter;
mod pass;
#[cfg(feature = "lyon")]
mod tessellating;

pub use emitter::{ShieldStyle, TileRenderer};
pub use pass::{DrawPass, PassComponent};
#[cfg(feature = "lyon")]
pub use tessellating::{ColoredVertex, Mesh, TessellatingSurface};

/// Text drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    /// Center of the text in surface pixels.
    pub position: Point2<f64>,
    /// Rotation in radians.
    pub rotation: f64,
    /// Text to draw.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Text color.
    pub color: Color,
    /// Color of the outline around the letters.
    pub halo: Option<Color>,
}

/// Abstract 2D drawing surface.
///
/// Path operations build the current path, which is consumed by the next [`stroke`](Self::stroke)
/// or [`fill`](Self::fill). All coordinates are in surface pixels.
pub trait Surface {
    /// Starts a new sub-path at the point.
    fn move_to(&mut self, point: Point2<f64>);
    /// Adds a straight segment to the current sub-path.
    fn line_to(&mut self, point: Point2<f64>);
    /// Adds a cubic Bezier curve to the current sub-path.
    fn curve_to(&mut self, control1: Point2<f64>, control2: Point2<f64>, to: Point2<f64>);
    /// Closes the current sub-path.
    fn close_path(&mut self);
    /// Strokes the current path and clears it.
    fn stroke(&mut self, paint: &StrokePaint);
    /// Fills the current path and clears it.
    fn fill(&mut self, paint: &FillPaint);
    /// Restricts the following drawing operations to the rectangle.
    fn clip(&mut self, rect: Rect);
    /// Removes the clip rectangle.
    fn reset_clip(&mut self);
    /// Draws text.
    fn draw_text(&mut self, text: &TextCommand);
}

/// Recorded [`Surface`] operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// See [`Surface::move_to`].
    MoveTo(Point2<f64>),
    /// See [`Surface::line_to`].
    LineTo(Point2<f64>),
    /// See [`Surface::curve_to`].
    CurveTo(Point2<f64>, Point2<f64>, Point2<f64>),
    /// See [`Surface::close_path`].
    ClosePath,
    /// See [`Surface::stroke`].
    Stroke(StrokePaint),
    /// See [`Surface::fill`].
    Fill(FillPaint),
    /// See [`Surface::clip`].
    Clip(Rect),
    /// See [`Surface::reset_clip`].
    ResetClip,
    /// See [`Surface::draw_text`].
    Text(TextCommand),
}

/// Surface recording all operations into a list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommandList {
    commands: Vec<DrawCommand>,
}

impl CommandList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Consumes the list returning the commands.
    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Iterates over the paints of stroke operations.
    pub fn strokes(&self) -> impl Iterator<Item = &StrokePaint> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Stroke(paint) => Some(paint),
            _ => None,
        })
    }

    /// Iterates over the paints of fill operations.
    pub fn fills(&self) -> impl Iterator<Item = &FillPaint> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Fill(paint) => Some(paint),
            _ => None,
        })
    }

    /// Iterates over text operations.
    pub fn texts(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    /// Iterates over all points of path operations, including curve control points.
    pub fn path_points(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.commands.iter().flat_map(|c| match c {
            DrawCommand::MoveTo(p) | DrawCommand::LineTo(p) => vec![p],
            DrawCommand::CurveTo(c1, c2, p) => vec![c1, c2, p],
            _ => vec![],
        })
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Removes all recorded commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Replays the recorded commands into another surface.
    pub fn replay(&self, surface: &mut dyn Surface) {
        for command in &self.commands {
            match command {
                DrawCommand::MoveTo(p) => surface.move_to(*p),
                DrawCommand::LineTo(p) => surface.line_to(*p),
                DrawCommand::CurveTo(c1, c2, p) => surface.curve_to(*c1, *c2, *p),
                DrawCommand::ClosePath => surface.close_path(),
                DrawCommand::Stroke(paint) => surface.stroke(paint),
                DrawCommand::Fill(paint) => surface.fill(paint),
                DrawCommand::Clip(rect) => surface.clip(*rect),
                DrawCommand::ResetClip => surface.reset_clip(),
                DrawCommand::Text(text) => surface.draw_text(text),
            }
        }
    }
}

impl Surface for CommandList {
    fn move_to(&mut self, point: Point2<f64>) {
        self.commands.push(DrawCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Point2<f64>) {
        self.commands.push(DrawCommand::LineTo(point));
    }

    fn curve_to(&mut self, control1: Point2<f64>, control2: Point2<f64>, to: Point2<f64>) {
        self.commands
            .push(DrawCommand::CurveTo(control1, control2, to));
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn stroke(&mut self, paint: &StrokePaint) {
        self.commands.push(DrawCommand::Stroke(paint.clone()));
    }

    fn fill(&mut self, paint: &FillPaint) {
        self.commands.push(DrawCommand::Fill(*paint));
    }

    fn clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clip(rect));
    }

    fn reset_clip(&mut self) {
        self.commands.push(DrawCommand::ResetClip);
    }

    fn draw_text(&mut self, text: &TextCommand) {
        self.commands.push(DrawCommand::Text(text.clone()));
    }
}
