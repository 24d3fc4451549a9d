//! Perimeter-walk loft between two cross-section loops.
//!
//! Both loops are parameterized by normalized arc length and walked in
//! lockstep. Wherever the next vertices of both loops sit at the same
//! parameter a quad is emitted; where one loop runs ahead, a collapse triangle
//! fans onto the other loop's current vertex. Before walking, edges that span
//! several vertices of the other loop are split so the band does not
//! degenerate into long triangle fans.
//!
//! # Example
//! ```ignore
//! use loft_engine::geom::{Point2, perimeter_walk};
//!
//! let square = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let faces = perimeter_walk(&square, 0.0, &square, 3.0);
//! assert_eq!(faces.len(), 4);
//! ```

use super::face::Face;
use super::param_loop::ParamLoop;
use super::polygon::{ensure_ccw, nearest_index, rotate_loop};
use super::{Point2, Tolerance};

/// Counters describing how a band was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkDiagnostics {
    /// Quads emitted where both loops advanced together.
    pub quad_count: usize,
    /// Quads produced by merging two would-be collapse triangles.
    pub merged_quad_count: usize,
    /// Collapse triangles emitted.
    pub triangle_count: usize,
    /// Points inserted into loop A by balancing.
    pub inserted_a: usize,
    /// Points inserted into loop B by balancing.
    pub inserted_b: usize,
    /// Index of the original (balanced) B vertex that became B's vertex 0.
    pub start_rotation: usize,
    /// Vertex counts walked after balancing.
    pub balanced_count_a: usize,
    pub balanced_count_b: usize,
}

impl WalkDiagnostics {
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.quad_count + self.merged_quad_count + self.triangle_count
    }
}

/// Lofts `loop_a` at `height_a` to `loop_b` at `height_b`.
///
/// Returns an empty list when either loop has fewer than 3 points.
#[must_use]
pub fn perimeter_walk(
    loop_a: &[Point2],
    height_a: f64,
    loop_b: &[Point2],
    height_b: f64,
) -> Vec<Face> {
    perimeter_walk_with_diagnostics(loop_a, height_a, loop_b, height_b).0
}

/// [`perimeter_walk`] that also reports how the band was assembled.
#[must_use]
pub fn perimeter_walk_with_diagnostics(
    loop_a: &[Point2],
    height_a: f64,
    loop_b: &[Point2],
    height_b: f64,
) -> (Vec<Face>, WalkDiagnostics) {
    let mut diag = WalkDiagnostics::default();
    if loop_a.len() < 3 || loop_b.len() < 3 {
        return (Vec::new(), diag);
    }

    let a = ensure_ccw(loop_a);
    let b = ensure_ccw(loop_b);

    let (a, b) = balance_loops(&a, &b);
    diag.inserted_a = a.len() - loop_a.len();
    diag.inserted_b = b.len() - loop_b.len();

    let (b, rotation) = align_start(&a, &b);
    diag.start_rotation = rotation;

    let pa = ParamLoop::new(&a);
    let pb = ParamLoop::new(&b);
    diag.balanced_count_a = pa.len();
    diag.balanced_count_b = pb.len();

    let faces = walk(&pa, height_a, &pb, height_b, &mut diag);
    log::debug!(
        "perimeter walk: {}x{} -> {} faces ({} quads, {} merged, {} triangles)",
        pa.len(),
        pb.len(),
        faces.len(),
        diag.quad_count,
        diag.merged_quad_count,
        diag.triangle_count
    );
    (faces, diag)
}

/// Splits edges of each loop that span two or more vertex parameters of the
/// other loop.
///
/// Both loops are expected CCW. Parameters of both loops are taken before
/// either one is modified, so the two passes are independent. Original
/// vertices keep their order and position; new points only ever go between
/// them.
#[must_use]
pub fn balance_loops(a: &[Point2], b: &[Point2]) -> (Vec<Point2>, Vec<Point2>) {
    if a.len() < 3 || b.len() < 3 {
        return (a.to_vec(), b.to_vec());
    }
    let pa = ParamLoop::new(a);
    let pb = ParamLoop::new(b);
    let near = 0.5 / a.len().max(b.len()) as f64;

    (balance_against(&pa, &pb, near), balance_against(&pb, &pa, near))
}

fn balance_against(target: &ParamLoop, other: &ParamLoop, near: f64) -> Vec<Point2> {
    let mut result = Vec::with_capacity(target.len() + other.len());

    for i in 0..target.len() {
        result.push(target.vertex(i));

        let start = target.param(i);
        let end = target.param(i + 1);
        let inside: Vec<f64> = other
            .params()
            .iter()
            .copied()
            .filter(|&t| t > start && t < end)
            .filter(|&t| (t - start).abs() >= near && (end - t).abs() >= near)
            .collect();

        if inside.len() >= 2 {
            log::debug!(
                "balance: splitting edge {i} [{start:.4}, {end:.4}] at {} parameters",
                inside.len()
            );
            result.extend(inside.iter().map(|&t| target.interpolate(i, t)));
        }
    }

    result
}

/// Rotates `b` so its vertex nearest to `a[0]` comes first.
///
/// Returns the rotated loop and the index of the new first vertex in `b`.
#[must_use]
pub fn align_start(a: &[Point2], b: &[Point2]) -> (Vec<Point2>, usize) {
    let Some(&anchor) = a.first() else {
        return (b.to_vec(), 0);
    };
    let start = nearest_index(b, anchor).unwrap_or(0);
    (rotate_loop(b, start), start)
}

fn walk(
    pa: &ParamLoop,
    height_a: f64,
    pb: &ParamLoop,
    height_b: f64,
    diag: &mut WalkDiagnostics,
) -> Vec<Face> {
    let (na, nb) = (pa.len(), pb.len());
    let mut faces = Vec::with_capacity(na + nb);
    let (mut ia, mut ib) = (0usize, 0usize);

    let a_at = |i: usize| pa.vertex(i).at_height(height_a);
    let b_at = |i: usize| pb.vertex(i).at_height(height_b);

    while ia < na || ib < nb {
        let (a0, a1) = (a_at(ia), a_at(ia + 1));
        let (b0, b1) = (b_at(ib), b_at(ib + 1));

        if ia >= na {
            faces.push(Face::triangle(a0, b1, b0));
            diag.triangle_count += 1;
            ib += 1;
            continue;
        }
        if ib >= nb {
            faces.push(Face::triangle(a0, a1, b0));
            diag.triangle_count += 1;
            ia += 1;
            continue;
        }

        let next_a = pa.param(ia + 1);
        let next_b = pb.param(ib + 1);

        if Tolerance::PARAM.approx_eq(next_a, next_b) {
            faces.push(Face::quad(a0, a1, b1, b0));
            diag.quad_count += 1;
            ia += 1;
            ib += 1;
        } else if next_a < next_b {
            // The step after this one would advance B; fold both into a quad.
            if pa.param(ia + 2) > next_b {
                faces.push(Face::quad(a0, a1, b1, b0));
                diag.merged_quad_count += 1;
                ia += 1;
                ib += 1;
            } else {
                faces.push(Face::triangle(a0, a1, b0));
                diag.triangle_count += 1;
                ia += 1;
            }
        } else if pb.param(ib + 2) > next_a {
            faces.push(Face::quad(a0, a1, b1, b0));
            diag.merged_quad_count += 1;
            ia += 1;
            ib += 1;
        } else {
            faces.push(Face::triangle(a0, b1, b0));
            diag.triangle_count += 1;
            ib += 1;
        }
    }

    faces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3;

    fn square(size: f64) -> Vec<Point2> {
        let h = size / 2.0;
        vec![
            Point2::new(-h, -h),
            Point2::new(h, -h),
            Point2::new(h, h),
            Point2::new(-h, h),
        ]
    }

    fn circle(r: f64, n: usize) -> Vec<Point2> {
        (0..n)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                Point2::new(r * a.cos(), r * a.sin())
            })
            .collect()
    }

    #[test]
    fn test_short_loops_give_empty_band() {
        let sq = square(2.0);
        assert!(perimeter_walk(&sq[..2], 0.0, &sq, 1.0).is_empty());
        assert!(perimeter_walk(&sq, 0.0, &[], 1.0).is_empty());
    }

    #[test]
    fn test_same_shape_gives_prism_quads() {
        let sq = square(2.0);
        let (faces, diag) = perimeter_walk_with_diagnostics(&sq, 0.0, &sq, 3.0);
        assert_eq!(faces.len(), 4);
        assert!(faces.iter().all(Face::is_quad));
        assert_eq!(diag.quad_count, 4);
        assert_eq!(diag.inserted_a + diag.inserted_b, 0);

        let first = &faces[0];
        assert_eq!(
            first.vertices(),
            &[
                Point3::new(-1.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 3.0),
                Point3::new(-1.0, -1.0, 3.0),
            ]
        );
    }

    #[test]
    fn test_clockwise_input_matches_ccw_band() {
        let sq = square(2.0);
        let cw = vec![sq[0], sq[3], sq[2], sq[1]];
        assert_eq!(perimeter_walk(&cw, 0.0, &cw, 1.0), perimeter_walk(&sq, 0.0, &sq, 1.0));
    }

    #[test]
    fn test_start_alignment_rotates_b() {
        let a = square(2.0);
        let b = rotate_loop(&square(2.0), 2);
        let (rotated, start) = align_start(&a, &b);
        assert_eq!(start, 2);
        assert_eq!(rotated, a);
    }

    #[test]
    fn test_balancing_splits_long_edges() {
        let a = square(2.0);
        let b = circle(1.0, 16);
        let (ba, bb) = balance_loops(&a, &b);
        assert!(ba.len() > a.len());
        assert_eq!(bb.len(), b.len());
        for p in &a {
            assert!(ba.contains(p));
        }
    }

    #[test]
    fn test_single_extra_vertex_is_left_to_the_walk() {
        let a = square(2.0);
        let b = vec![
            Point2::new(-1.0, -1.0),
            Point2::new(0.0, -1.2),
            Point2::new(1.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(-1.0, 1.0),
        ];
        let (ba, bb) = balance_loops(&a, &b);
        assert_eq!(ba.len(), a.len());
        assert_eq!(bb.len(), b.len());
    }

    #[test]
    fn test_walk_uses_every_balanced_vertex() {
        let a = square(2.0);
        let b = circle(0.8, 7);
        let (faces, diag) = perimeter_walk_with_diagnostics(&a, 0.0, &b, 2.0);
        assert!(!faces.is_empty());
        assert!(faces.len() <= diag.balanced_count_a + diag.balanced_count_b);

        let (ba, bb) = balance_loops(&ensure_ccw(&a), &ensure_ccw(&b));
        for p in ba.iter().map(|p| p.at_height(0.0)).chain(bb.iter().map(|p| p.at_height(2.0))) {
            assert!(
                faces.iter().any(|f| f.vertices().contains(&p)),
                "vertex {p:?} missing from band"
            );
        }
    }

    #[test]
    fn test_faces_keep_heights() {
        let faces = perimeter_walk(&square(4.0), 1.0, &circle(1.5, 9), 5.0);
        for face in &faces {
            for v in face.vertices() {
                assert!(v.z == 1.0 || v.z == 5.0);
            }
            let bottom = face.vertices().iter().filter(|v| v.z == 1.0).count();
            assert!(bottom >= 1 && bottom < face.len());
        }
    }

    #[test]
    fn test_walk_is_deterministic() {
        let a = circle(2.0, 11);
        let b = square(3.0);
        assert_eq!(perimeter_walk(&a, 0.0, &b, 1.0), perimeter_walk(&a, 0.0, &b, 1.0));
    }
}
