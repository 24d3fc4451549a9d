//! Cap faces closing the bottom and top of a lofted stack.

use super::face::Face;
use super::polygon::{ensure_ccw, orient2d, point_in_triangle};
use super::{Point2, Tolerance};

/// Which way a cap faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapFacing {
    /// Bottom of the stack, normal pointing towards `-z`.
    Down,
    /// Top of the stack, normal pointing towards `+z`.
    Up,
}

/// Ear-clips the loop into triangles at `height`.
///
/// Loops with fewer than 3 points give no faces. If clipping stalls (a
/// self-intersecting loop), the remaining polygon is closed with a fan so the
/// cap is never left open.
#[must_use]
pub fn cap_faces(points: &[Point2], height: f64, facing: CapFacing) -> Vec<Face> {
    if points.len() < 3 {
        return Vec::new();
    }
    let ring = ensure_ccw(points);
    let triangles = earclip(&ring);

    triangles
        .into_iter()
        .map(|[a, b, c]| {
            let face = Face::triangle(ring[a].at_height(height), ring[b].at_height(height), ring[c].at_height(height));
            match facing {
                CapFacing::Up => face,
                CapFacing::Down => face.flipped(),
            }
        })
        .collect()
}

fn earclip(ring: &[Point2]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..ring.len()).collect();
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    let mut cursor = 0usize;
    let mut misses = 0usize;

    while remaining.len() > 3 {
        let n = remaining.len();
        let prev = remaining[(cursor + n - 1) % n];
        let ear = remaining[cursor % n];
        let next = remaining[(cursor + 1) % n];

        if is_ear(ring, &remaining, prev, ear, next) {
            triangles.push([prev, ear, next]);
            remaining.remove(cursor % n);
            cursor %= remaining.len();
            misses = 0;
            continue;
        }

        cursor = (cursor + 1) % n;
        misses += 1;
        if misses > n {
            log::warn!("cap: no ear found with {n} vertices left, closing with a fan");
            for k in 1..n - 1 {
                triangles.push([remaining[0], remaining[k], remaining[k + 1]]);
            }
            return triangles;
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

fn is_ear(ring: &[Point2], remaining: &[usize], prev: usize, ear: usize, next: usize) -> bool {
    let (a, b, c) = (ring[prev], ring[ear], ring[next]);
    if orient2d(a, b, c) <= Tolerance::ORIENTATION.eps {
        return false;
    }
    remaining
        .iter()
        .filter(|&&k| k != prev && k != ear && k != next)
        .all(|&k| ring[k] == a || ring[k] == b || ring[k] == c || !point_in_triangle(ring[k], a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3;

    fn area_of(faces: &[Face]) -> f64 {
        faces
            .iter()
            .map(|f| {
                let v = f.vertices();
                let (a, b, c) = (v[0].xy(), v[1].xy(), v[2].xy());
                0.5 * orient2d(a, b, c)
            })
            .sum()
    }

    #[test]
    fn square_cap_has_two_triangles() {
        let sq = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let up = cap_faces(&sq, 5.0, CapFacing::Up);
        assert_eq!(up.len(), 2);
        assert!((area_of(&up) - 4.0).abs() < 1e-12);
        assert!(up.iter().flat_map(Face::vertices).all(|v: &Point3| v.z == 5.0));

        let down = cap_faces(&sq, 0.0, CapFacing::Down);
        assert!((area_of(&down) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn concave_cap_covers_exact_area() {
        // L-shape, area 3.
        let l = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let faces = cap_faces(&l, 0.0, CapFacing::Up);
        assert_eq!(faces.len(), 4);
        assert!((area_of(&faces) - 3.0).abs() < 1e-12);
        for f in &faces {
            let v = f.vertices();
            assert!(orient2d(v[0].xy(), v[1].xy(), v[2].xy()) > 0.0);
        }
    }

    #[test]
    fn short_loop_has_no_cap() {
        assert!(cap_faces(&[Point2::ORIGIN, Point2::new(1.0, 0.0)], 0.0, CapFacing::Up).is_empty());
    }
}
