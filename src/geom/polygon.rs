//! Polygon primitives shared by the loft strategies and the edit guard.
//!
//! Loops are closed: the edge after the last vertex returns to vertex 0.
//! None of these functions mutate their input.

use super::{Point2, Tolerance};

/// Orientation of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Collinear,
}

/// Signed area of a closed loop (shoelace formula). Positive for CCW loops.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice_area += a.x * b.y - b.x * a.y;
    }
    0.5 * twice_area
}

#[must_use]
pub fn is_ccw(points: &[Point2]) -> bool {
    signed_area(points) > 0.0
}

/// Returns the loop with counter-clockwise winding.
///
/// A clockwise loop is reversed while keeping vertex 0 in front, so
/// `[p0, p1, p2, p3]` becomes `[p0, p3, p2, p1]`. Loops that are already CCW
/// (or have zero area) are returned unchanged.
#[must_use]
pub fn ensure_ccw(points: &[Point2]) -> Vec<Point2> {
    if signed_area(points) >= 0.0 {
        return points.to_vec();
    }
    let mut result = Vec::with_capacity(points.len());
    result.push(points[0]);
    result.extend(points[1..].iter().rev().copied());
    result
}

/// Total length of the closed loop, including the closing edge.
#[must_use]
pub fn perimeter(points: &[Point2]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    (0..points.len())
        .map(|i| points[i].distance(points[(i + 1) % points.len()]))
        .sum()
}

/// Cumulative arc length at each vertex of the closed loop.
///
/// The returned vector has `points.len() + 1` entries; the last one is the
/// full perimeter (the virtual wrap back to vertex 0).
#[must_use]
pub fn cumulative_lengths(points: &[Point2]) -> Vec<f64> {
    let mut lengths = Vec::with_capacity(points.len() + 1);
    lengths.push(0.0);
    if points.is_empty() {
        return lengths;
    }
    let mut total = 0.0;
    for i in 0..points.len() {
        total += points[i].distance(points[(i + 1) % points.len()]);
        lengths.push(total);
    }
    lengths
}

/// Arc length of an open polyline.
#[must_use]
pub fn polyline_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Raw 2D cross product of `(b - a) x (c - a)`.
#[must_use]
pub fn orient2d(a: Point2, b: Point2, c: Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Classifies the turn `a -> b -> c`, treating `|cross| < 1e-10` as collinear.
#[must_use]
pub fn orientation(a: Point2, b: Point2, c: Point2) -> Orientation {
    let value = orient2d(a, b, c);
    if value.abs() < Tolerance::ORIENTATION.eps {
        Orientation::Collinear
    } else if value > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Whether `q` lies within the bounding box of segment `p -> r`.
/// Only meaningful when the three points are known to be collinear.
#[must_use]
pub fn on_segment(p: Point2, q: Point2, r: Point2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Whether segment `p1 -> q1` intersects segment `p2 -> q2`.
///
/// Touching and collinear-overlapping segments count as intersecting.
#[must_use]
pub fn segments_intersect(p1: Point2, q1: Point2, p2: Point2, q2: Point2) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 && !has_collinear(o1, o2, o3, o4) {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (o2 == Orientation::Collinear && on_segment(p1, q2, q1))
        || (o3 == Orientation::Collinear && on_segment(p2, p1, q2))
        || (o4 == Orientation::Collinear && on_segment(p2, q1, q2))
}

fn has_collinear(o1: Orientation, o2: Orientation, o3: Orientation, o4: Orientation) -> bool {
    [o1, o2, o3, o4].contains(&Orientation::Collinear)
}

/// Whether `p` lies inside or on the boundary of triangle `a, b, c`
/// (either winding).
#[must_use]
pub fn point_in_triangle(p: Point2, a: Point2, b: Point2, c: Point2) -> bool {
    let d1 = orient2d(a, b, p);
    let d2 = orient2d(b, c, p);
    let d3 = orient2d(c, a, p);
    let eps = Tolerance::ORIENTATION.eps;

    let has_neg = d1 < -eps || d2 < -eps || d3 < -eps;
    let has_pos = d1 > eps || d2 > eps || d3 > eps;
    !(has_neg && has_pos)
}

/// Parameter in `[0, 1]` of the point on segment `a -> b` closest to `p`.
#[must_use]
pub fn closest_param_on_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= Tolerance::ZERO_LENGTH.eps {
        return 0.0;
    }
    let ap = p - a;
    ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0)
}

/// Index of the point in `points` nearest to `target` (first one on ties).
#[must_use]
pub fn nearest_index(points: &[Point2], target: Point2) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance_squared(target);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Rotates the loop so that `start` becomes vertex 0.
#[must_use]
pub fn rotate_loop<T: Copy>(points: &[T], start: usize) -> Vec<T> {
    if points.is_empty() {
        return Vec::new();
    }
    let start = start % points.len();
    points[start..].iter().chain(&points[..start]).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_signed_area_sign_follows_winding() {
        let ccw = square();
        assert!((signed_area(&ccw) - 1.0).abs() < 1e-12);
        let cw: Vec<Point2> = ccw.iter().rev().copied().collect();
        assert!((signed_area(&cw) + 1.0).abs() < 1e-12);
        assert_eq!(signed_area(&ccw[..2]), 0.0);
    }

    #[test]
    fn test_ensure_ccw_keeps_first_vertex() {
        let cw = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let fixed = ensure_ccw(&cw);
        assert!(is_ccw(&fixed));
        assert_eq!(fixed[0], cw[0]);
        assert_eq!(fixed, square());
        assert_eq!(ensure_ccw(&square()), square());
    }

    #[test]
    fn test_perimeter_and_cumulative_lengths() {
        let sq = square();
        assert!((perimeter(&sq) - 4.0).abs() < 1e-12);
        let lengths = cumulative_lengths(&sq);
        assert_eq!(lengths, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cumulative_lengths(&[]), vec![0.0]);
    }

    #[test]
    fn test_segments_intersect_cases() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 2.0);
        assert!(segments_intersect(a, b, Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)));
        assert!(!segments_intersect(a, b, Point2::new(3.0, 0.0), Point2::new(4.0, 1.0)));
        // Touching at an endpoint.
        assert!(segments_intersect(a, b, b, Point2::new(3.0, 0.0)));
        // Collinear overlap.
        assert!(segments_intersect(a, b, Point2::new(1.0, 1.0), Point2::new(3.0, 3.0)));
        // Collinear but disjoint.
        assert!(!segments_intersect(a, b, Point2::new(3.0, 3.0), Point2::new(4.0, 4.0)));
    }

    #[test]
    fn test_point_in_triangle_either_winding() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 0.0);
        let c = Point2::new(0.0, 4.0);
        assert!(point_in_triangle(Point2::new(1.0, 1.0), a, b, c));
        assert!(point_in_triangle(Point2::new(1.0, 1.0), a, c, b));
        assert!(point_in_triangle(Point2::new(2.0, 0.0), a, b, c));
        assert!(!point_in_triangle(Point2::new(3.0, 3.0), a, b, c));
    }

    #[test]
    fn test_closest_param_is_clamped() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        assert!((closest_param_on_segment(Point2::new(2.5, 3.0), a, b) - 0.25).abs() < 1e-12);
        assert_eq!(closest_param_on_segment(Point2::new(-5.0, 1.0), a, b), 0.0);
        assert_eq!(closest_param_on_segment(Point2::new(15.0, 1.0), a, b), 1.0);
        assert_eq!(closest_param_on_segment(Point2::new(1.0, 1.0), a, a), 0.0);
    }

    #[test]
    fn test_rotate_and_nearest() {
        let sq = square();
        let rotated = rotate_loop(&sq, 2);
        assert_eq!(rotated[0], sq[2]);
        assert_eq!(rotated[3], sq[1]);
        assert_eq!(nearest_index(&sq, Point2::new(0.9, 1.2)), Some(2));
        assert_eq!(nearest_index(&[], Point2::ORIGIN), None);
    }
}
