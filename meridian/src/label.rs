//! Placement of text labels and route shields in tile-pixel space.
//!
//! All functions are pure: they take projected geometry and return a [`LabelPlacement`], or
//! `None` if the label anchor would fall outside the tile. Labels of features crossing tile borders
//! are then drawn by exactly the tile containing the anchor.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;

use meridian_types::projection::TILE_SIZE;
use meridian_types::{CartesianPoint2d, LineString, Point2, Polygon, Segment};

/// Number of grid steps along each side of the polygon bounding box searched for the label
/// position. The grid nodes at the box boundary are skipped.
const GRID_STEPS: u32 = 10;

/// Position of a label in tile pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    /// Anchor point of the label (center of the text).
    pub anchor: Point2<f64>,
    /// Rotation of the text in radians, clockwise in the y-down tile space.
    pub rotation: f64,
    /// Label text.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f64,
}

impl LabelPlacement {
    fn in_tile(anchor: Point2<f64>, rotation: f64, text: &str, font_size: f64) -> Option<Self> {
        is_inside_tile(&anchor).then(|| Self {
            anchor,
            rotation,
            text: text.to_string(),
            font_size,
        })
    }
}

/// Returns true if the point is inside the tile `[0, 256] x [0, 256]`, borders included.
pub fn is_inside_tile(point: &impl CartesianPoint2d) -> bool {
    (0.0..=TILE_SIZE).contains(&point.x()) && (0.0..=TILE_SIZE).contains(&point.y())
}

/// Places a label along the line.
///
/// The label is put at the middle of the segment where the line reaches half of its length and is
/// rotated along that segment. The rotation is kept within `(-PI/2, PI/2]` so the text never
/// appears upside down.
pub fn line_label(
    line: &LineString<Point2<f64>>,
    text: &str,
    font_size: f64,
) -> Option<LabelPlacement> {
    let half = line.length() / 2.0;
    let mut walked = 0.0;
    for segment in line.iter_segments() {
        walked += segment.length();
        if walked >= half {
            let (x, y) = segment.midpoint();
            return LabelPlacement::in_tile(Point2::new(x, y), segment_angle(&segment), text, font_size);
        }
    }

    None
}

/// Places a route shield (e.g. road number badge) at one third of the line length. Shields are not
/// rotated.
pub fn line_shield(
    line: &LineString<Point2<f64>>,
    text: &str,
    font_size: f64,
) -> Option<LabelPlacement> {
    let target = line.length() / 3.0;
    let mut walked = 0.0;
    for Segment(a, b) in line.iter_segments() {
        let length = a.distance(b);
        if walked + length >= target {
            let t = if length > 0.0 {
                (target - walked) / length
            } else {
                0.0
            };
            let anchor = Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            return LabelPlacement::in_tile(anchor, 0.0, text, font_size);
        }

        walked += length;
    }

    None
}

/// Places a label inside the polygon.
///
/// Below `grid_zoom` the label goes to the center of the bounding box. At or above it, a grid of
/// candidate points inside the bounding box is searched for the point farthest from the polygon
/// boundary. If no grid point is inside the polygon, the centroid is used.
pub fn polygon_label(
    polygon: &Polygon<Point2<f64>>,
    text: &str,
    font_size: f64,
    zoom: u32,
    grid_zoom: u32,
) -> Option<LabelPlacement> {
    let bbox = polygon.bounding_rect();
    if zoom < grid_zoom {
        return LabelPlacement::in_tile(bbox.center(), 0.0, text, font_size);
    }

    let mut best: Option<(Point2<f64>, f64)> = None;
    for i in 1..GRID_STEPS {
        for j in 1..GRID_STEPS {
            let candidate = Point2::new(
                bbox.x_min() + bbox.width() * i as f64 / GRID_STEPS as f64,
                bbox.y_min() + bbox.height() * j as f64 / GRID_STEPS as f64,
            );
            if !polygon.contains_point(&candidate) {
                continue;
            }

            let threshold = best.map(|(_, distance)| distance);
            if let Some(distance) = polygon.distance_to_boundary(&candidate, threshold) {
                if threshold.map_or(true, |best_distance| distance > best_distance) {
                    best = Some((candidate, distance));
                }
            }
        }
    }

    let anchor = match best {
        Some((point, _)) => point,
        None => polygon.centroid(),
    };

    LabelPlacement::in_tile(anchor, 0.0, text, font_size)
}

/// Places a label at the point.
pub fn point_label(point: &Point2<f64>, text: &str, font_size: f64) -> Option<LabelPlacement> {
    LabelPlacement::in_tile(*point, 0.0, text, font_size)
}

fn segment_angle(segment: &Segment<'_, Point2<f64>>) -> f64 {
    let dx = segment.1.x - segment.0.x;
    let dy = segment.1.y - segment.0.y;

    let angle = if dx == 0.0 {
        if dy > 0.0 {
            FRAC_PI_2
        } else if dy < 0.0 {
            -FRAC_PI_2
        } else {
            0.0
        }
    } else {
        dy.atan2(dx)
    };

    upright(angle)
}

/// Normalizes the angle into `(-PI/2, PI/2]`.
fn upright(mut angle: f64) -> f64 {
    while angle > FRAC_PI_2 {
        angle -= PI;
    }
    while angle <= -FRAC_PI_2 {
        angle += PI;
    }

    angle
}
