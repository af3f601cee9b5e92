use serde::{Deserialize, Serialize};

/// Part of a feature style drawn in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassComponent {
    /// Polygon fills.
    Fill,
    /// Casing strokes of lines and polygon outlines.
    Underline,
    /// Main strokes of lines and polygon outlines.
    Line,
    /// Strokes drawn above the main line.
    Overline,
    /// Point circles.
    Points,
    /// Text labels and route shields.
    Labels,
}

/// One drawing pass of a tile layer.
///
/// Every pass draws its components in order, each component for all features of the layer. The
/// renderer draws a pass for all tiles before starting the next one, so e.g. road casings of
/// neighbouring tiles never cover road fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawPass {
    components: Vec<PassComponent>,
}

impl DrawPass {
    /// Creates a pass drawing the given components.
    pub fn new(components: impl IntoIterator<Item = PassComponent>) -> Self {
        Self {
            components: components.into_iter().collect(),
        }
    }

    /// Components of the pass.
    pub fn components(&self) -> &[PassComponent] {
        &self.components
    }
}
