//! Closed loops parameterized by normalized perimeter arc length.

use super::polygon::{cumulative_lengths, ensure_ccw};
use super::{Point2, Tolerance};

/// A CCW loop with a perimeter parameter in `[0, 1)` for every vertex.
///
/// `param(0)` is always `0.0` and `param(len())` is the virtual wrap `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamLoop {
    points: Vec<Point2>,
    params: Vec<f64>,
}

impl ParamLoop {
    /// Normalizes `points` to CCW and computes their perimeter parameters.
    ///
    /// A loop with zero perimeter gets an all-zero parameterization.
    #[must_use]
    pub fn new(points: &[Point2]) -> Self {
        let points = ensure_ccw(points);
        let lengths = cumulative_lengths(&points);
        let total = lengths.last().copied().unwrap_or(0.0);

        let params = if total > Tolerance::ZERO_LENGTH.eps && total.is_finite() {
            lengths[..points.len()].iter().map(|l| l / total).collect()
        } else {
            vec![0.0; points.len()]
        };

        Self { points, params }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point2> {
        self.points
    }

    /// Vertex `i` modulo the vertex count.
    ///
    /// # Panics
    /// Panics on an empty loop.
    #[must_use]
    pub fn vertex(&self, i: usize) -> Point2 {
        self.points[i % self.points.len()]
    }

    /// Perimeter parameter of vertex `i`; `1.0` for `i >= len()`.
    #[must_use]
    pub fn param(&self, i: usize) -> f64 {
        self.params.get(i).copied().unwrap_or(1.0)
    }

    /// Point on edge `i -> i + 1` at global parameter `t`.
    ///
    /// `t` is expected to lie in `[param(i), param(i + 1)]`. On the closing
    /// edge the stored parameter of the next vertex is `0.0`, so the span is
    /// measured across the wrap as `(1 - param(i)) + param(i + 1)`.
    ///
    /// # Panics
    /// Panics on an empty loop.
    #[must_use]
    pub fn interpolate(&self, i: usize, t: f64) -> Point2 {
        let n = self.points.len();
        let i = i % n;
        let j = (i + 1) % n;
        let start = self.params[i];
        let end = self.params[j];

        let span = if end <= start {
            (1.0 - start) + end
        } else {
            end - start
        };
        let local = if span > Tolerance::ZERO_LENGTH.eps {
            ((t - start) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.points[i].lerp(self.points[j], local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_params_follow_arc_length() {
        let lp = ParamLoop::new(&rect());
        assert_eq!(lp.len(), 4);
        assert_eq!(lp.param(0), 0.0);
        assert!((lp.param(1) - 3.0 / 8.0).abs() < 1e-12);
        assert!((lp.param(2) - 4.0 / 8.0).abs() < 1e-12);
        assert!((lp.param(3) - 7.0 / 8.0).abs() < 1e-12);
        assert_eq!(lp.param(4), 1.0);
        assert_eq!(lp.param(9), 1.0);
    }

    #[test]
    fn test_clockwise_input_is_normalized() {
        let cw: Vec<Point2> = {
            let r = rect();
            vec![r[0], r[3], r[2], r[1]]
        };
        let lp = ParamLoop::new(&cw);
        assert_eq!(lp.points(), rect().as_slice());
    }

    #[test]
    fn test_vertex_wraps() {
        let lp = ParamLoop::new(&rect());
        assert_eq!(lp.vertex(4), lp.vertex(0));
        assert_eq!(lp.vertex(5), lp.vertex(1));
    }

    #[test]
    fn test_interpolate_inner_and_wrap_edges() {
        let lp = ParamLoop::new(&rect());
        let mid_bottom = lp.interpolate(0, 1.5 / 8.0);
        assert!((mid_bottom.x - 1.5).abs() < 1e-12);
        assert!(mid_bottom.y.abs() < 1e-12);

        // Closing edge (0,1) -> (0,0) spans params 7/8 .. 1.
        let on_wrap = lp.interpolate(3, 7.5 / 8.0);
        assert!(on_wrap.x.abs() < 1e-12);
        assert!((on_wrap.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_loop_has_zero_params() {
        let p = Point2::new(2.0, 2.0);
        let lp = ParamLoop::new(&[p, p, p]);
        assert_eq!(lp.params(), &[0.0, 0.0, 0.0]);
        assert_eq!(lp.interpolate(1, 0.0), p);
        assert!(ParamLoop::new(&[]).is_empty());
    }
}
