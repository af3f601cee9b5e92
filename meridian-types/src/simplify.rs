//! Douglas-Peucker line simplification.
//!
//! The algorithm keeps an explicit stack of `(anchor, floater)` index ranges into the original
//! point slice instead of recursing, so arbitrarily long lines cannot overflow the call stack.

use nalgebra::Vector2;

use crate::cartesian::CartesianPoint2d;

/// Returns the sorted indices of the points kept by Douglas-Peucker simplification with the given
/// tolerance. The first and the last indices are always kept. Inputs with fewer than 3 points are
/// kept entirely.
pub fn simplify_indices<P: CartesianPoint2d>(points: &[P], tolerance: f64) -> Vec<usize> {
    let count = points.len();
    if count < 3 {
        return (0..count).collect();
    }

    let mut keep = vec![false; count];
    keep[0] = true;
    keep[count - 1] = true;

    let mut stack = vec![(0, count - 1)];
    while let Some((anchor, floater)) = stack.pop() {
        if floater <= anchor + 1 {
            continue;
        }

        let anchor_point = &points[anchor];
        let floater_point = &points[floater];

        let segment = floater_point.sub(anchor_point);
        let segment_len = segment.norm();
        let unit = if segment_len > 0.0 {
            segment / segment_len
        } else {
            Vector2::zeros()
        };

        let mut max_distance = 0.0;
        let mut farthest = anchor;
        for (index, point) in points.iter().enumerate().take(floater).skip(anchor + 1) {
            let from_anchor = point.sub(anchor_point);
            let projection = from_anchor.dot(&unit);

            let distance = if segment_len == 0.0 || projection < 0.0 {
                from_anchor.norm()
            } else if projection > segment_len {
                point.sub(floater_point).norm()
            } else {
                (from_anchor - unit * projection).norm()
            };

            if distance > max_distance {
                max_distance = distance;
                farthest = index;
            }
        }

        if max_distance <= tolerance {
            continue;
        }

        keep[farthest] = true;
        stack.push((anchor, farthest));
        stack.push((farthest, floater));
    }

    keep.iter()
        .enumerate()
        .filter_map(|(index, kept)| kept.then_some(index))
        .collect()
}

/// Simplifies the polyline with the Douglas-Peucker algorithm.
///
/// Points farther than `tolerance` from the simplified line are kept. The result preserves the
/// original order of points and always contains the first and the last point of the input.
pub fn simplify<P: CartesianPoint2d + Clone>(points: &[P], tolerance: f64) -> Vec<P> {
    simplify_indices(points, tolerance)
        .into_iter()
        .map(|index| points[index].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use super::*;

    fn line(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    /// Walks the border of a 6x6 square one unit at a time and returns to the start.
    fn square_walk() -> Vec<Point2<f64>> {
        let mut coords = vec![];
        for x in 0..6 {
            coords.push((x as f64, 0.0));
        }
        for y in 0..6 {
            coords.push((6.0, y as f64));
        }
        for x in (1..=6).rev() {
            coords.push((x as f64, 6.0));
        }
        for y in (1..=6).rev() {
            coords.push((0.0, y as f64));
        }
        coords.push((0.0, 0.0));

        line(&coords)
    }

    #[test]
    fn square_walk_collapses_to_corners() {
        let walk = square_walk();
        assert_eq!(walk.len(), 25);

        let simplified = simplify(&walk, 1.0);
        assert_eq!(
            simplified,
            line(&[(0.0, 0.0), (6.0, 0.0), (6.0, 6.0), (0.0, 6.0), (0.0, 0.0)])
        );
    }

    #[test]
    fn simplification_is_idempotent() {
        let inputs = [
            square_walk(),
            line(&[
                (0.0, 0.0),
                (1.0, 0.1),
                (2.0, -0.1),
                (3.0, 5.0),
                (4.0, 6.0),
                (5.0, 7.0),
                (6.0, 8.1),
                (7.0, 9.0),
                (8.0, 9.0),
                (9.0, 9.0),
            ]),
        ];

        for input in inputs {
            for tolerance in [0.0, 0.5, 1.0, 3.0] {
                let once = simplify(&input, tolerance);
                let twice = simplify(&once, tolerance);
                assert_eq!(once, twice, "tolerance {tolerance}");
            }
        }
    }

    #[test]
    fn endpoints_are_kept() {
        let input = line(&[(0.0, 0.0), (1.0, 0.01), (2.0, -0.01), (3.0, 0.0)]);
        let simplified = simplify(&input, 0.5);
        assert_eq!(simplified, line(&[(0.0, 0.0), (3.0, 0.0)]));
    }

    #[test]
    fn zero_tolerance_drops_only_collinear_points() {
        let input = line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (2.0, 2.0)]);
        assert_eq!(simplify_indices(&input, 0.0), vec![0, 2, 4]);
    }

    #[test]
    fn point_projecting_outside_of_segment() {
        // The middle point lies behind the anchor, so its distance is measured to the anchor.
        let input = line(&[(0.0, 0.0), (-2.0, 0.0), (4.0, 0.0)]);
        assert_eq!(simplify_indices(&input, 1.5), vec![0, 1, 2]);
        assert_eq!(simplify_indices(&input, 2.0), vec![0, 2]);
    }

    #[test]
    fn short_lines_are_unchanged() {
        assert!(simplify::<Point2<f64>>(&[], 1.0).is_empty());
        let two = line(&[(0.0, 0.0), (5.0, 5.0)]);
        assert_eq!(simplify(&two, 10.0), two);
    }
}
