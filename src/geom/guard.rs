//! Edit guard for interactive single-vertex drags.

use super::Point2;
use super::polygon::segments_intersect;

/// Whether moving vertex `drag_index` of `points` to `new_position` would make
/// the loop self-intersecting.
///
/// The two edges meeting at the dragged vertex are replaced by
/// `prev -> new_position` and `new_position -> next`; each is tested against
/// every other edge except those sharing one of its endpoints. Loops with
/// fewer than four vertices cannot be broken by one vertex and always pass.
#[must_use]
pub fn would_cause_self_intersection(points: &[Point2], drag_index: usize, new_position: Point2) -> bool {
    let n = points.len();
    if n < 4 || drag_index >= n {
        return false;
    }

    let prev = (drag_index + n - 1) % n;
    let next = (drag_index + 1) % n;
    let prev_prev_edge = (prev + n - 1) % n;
    let next_edge = next;

    // Edge `k` runs from vertex `k` to vertex `k + 1`.
    let edge = |k: usize| (points[k], points[(k + 1) % n]);
    let replaced = |k: usize| k == prev || k == drag_index;

    let incoming = (points[prev], new_position);
    let outgoing = (new_position, points[next]);

    for k in 0..n {
        if replaced(k) {
            continue;
        }
        let (p, q) = edge(k);
        if k != prev_prev_edge && segments_intersect(incoming.0, incoming.1, p, q) {
            return true;
        }
        if k != next_edge && segments_intersect(outgoing.0, outgoing.1, p, q) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(-2.0, -2.0),
            Point2::new(2.0, -2.0),
            Point2::new(2.0, 2.0),
            Point2::new(-2.0, 2.0),
        ]
    }

    #[test]
    fn test_square_drag_across_opposite_edge() {
        assert!(would_cause_self_intersection(&square(), 0, Point2::new(3.0, 0.0)));
    }

    #[test]
    fn test_square_drag_inside() {
        assert!(!would_cause_self_intersection(&square(), 0, Point2::new(0.0, 0.0)));
        assert!(!would_cause_self_intersection(&square(), 2, Point2::new(3.0, 3.0)));
    }

    #[test]
    fn test_triangles_always_pass() {
        let tri = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        for target in [Point2::new(5.0, 5.0), Point2::new(-3.0, 0.5), Point2::new(0.0, 0.0)] {
            for i in 0..3 {
                assert!(!would_cause_self_intersection(&tri, i, target));
            }
        }
    }

    #[test]
    fn test_out_of_range_index_passes() {
        assert!(!would_cause_self_intersection(&square(), 7, Point2::new(3.0, 0.0)));
    }

    #[test]
    fn test_pentagon_bowtie_detected() {
        let pentagon = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(5.0, 3.0),
            Point2::new(2.0, 5.0),
            Point2::new(-1.0, 3.0),
        ];
        // Dragging vertex 1 above the top vertex folds the loop over itself.
        assert!(would_cause_self_intersection(&pentagon, 1, Point2::new(2.0, 7.0)));
        assert!(!would_cause_self_intersection(&pentagon, 1, Point2::new(4.5, -0.5)));
    }
}
