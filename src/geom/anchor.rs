//! Anchor-based resampling of dissimilar loops to a shared vertex count.
//!
//! Unlike the perimeter walk, this strategy does not emit faces directly. It
//! produces one point array per loop, all of equal length and index aligned,
//! so that point `k` of every loop corresponds to point `k` of every other.
//! [`matched_band`] turns two such arrays into quads.
//!
//! Correspondence comes from *anchors*: vertex pairs that are each other's
//! nearest neighbour and close enough together. The arcs between anchors are
//! resampled independently, which keeps corners that line up across the two
//! sketches locked together.

use super::face::Face;
use super::polygon::{ensure_ccw, nearest_index, polyline_length, rotate_loop};
use super::{Point2, Tolerance};

/// Default distance under which mutual nearest vertices become anchors.
pub const DEFAULT_ANCHOR_EPSILON: f64 = 0.5;

/// Vertex `index_a` of loop A corresponds to vertex `index_b` of loop B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub index_a: usize,
    pub index_b: usize,
}

impl Anchor {
    #[must_use]
    pub const fn new(index_a: usize, index_b: usize) -> Self {
        Self { index_a, index_b }
    }
}

/// Finds mutual-nearest-neighbour anchors between `a` and `b`.
///
/// Candidates are visited in `index_a` order; a candidate whose `index_b`
/// does not increase past the last kept anchor would cross it and is dropped.
#[must_use]
pub fn find_anchors(a: &[Point2], b: &[Point2], epsilon: f64) -> Vec<Anchor> {
    let mut anchors: Vec<Anchor> = Vec::new();
    if a.is_empty() || b.is_empty() {
        return anchors;
    }
    let eps_sq = epsilon * epsilon;

    for (i, &pa) in a.iter().enumerate() {
        let Some(j) = nearest_index(b, pa) else {
            continue;
        };
        if pa.distance_squared(b[j]) > eps_sq {
            continue;
        }
        if nearest_index(a, b[j]) != Some(i) {
            continue;
        }
        if anchors.last().is_some_and(|last| j <= last.index_b) {
            continue;
        }
        anchors.push(Anchor::new(i, j));
    }

    anchors
}

/// Resamples two loops to a common, index-aligned vertex count.
///
/// Both loops are normalized to CCW first. Loops with fewer than 3 points are
/// returned normalized but otherwise untouched.
#[must_use]
pub fn anchor_resample_pair(a: &[Point2], b: &[Point2], epsilon: f64) -> (Vec<Point2>, Vec<Point2>) {
    let a = ensure_ccw(a);
    let b = ensure_ccw(b);
    if a.len() < 3 || b.len() < 3 {
        return (a, b);
    }

    let anchors = find_anchors(&a, &b, epsilon);
    log::debug!("anchor resample: {}x{} with {} anchors", a.len(), b.len(), anchors.len());

    if anchors.is_empty() {
        subdivide_and_align(&a, &b)
    } else {
        resample_between_anchors(&a, &b, &anchors)
    }
}

/// Resamples a whole stack of loops to one shared, index-aligned count.
///
/// Each loop is matched against its already-resampled predecessor. If the
/// pairwise pass leaves the counts unequal, every loop is subdivided up to
/// the largest count and rotated to best fit its predecessor, starting from
/// the first loop which stays fixed.
#[must_use]
pub fn anchor_resample_loops(loops: &[Vec<Point2>], epsilon: f64) -> Vec<Vec<Point2>> {
    let mut result: Vec<Vec<Point2>> = Vec::with_capacity(loops.len());
    let Some(first) = loops.first() else {
        return result;
    };
    result.push(ensure_ccw(first));

    for next in &loops[1..] {
        let Some(prev) = result.pop() else {
            break;
        };
        let (ra, rb) = anchor_resample_pair(&prev, next, epsilon);
        result.push(ra);
        result.push(rb);
    }

    let target = result.iter().map(Vec::len).max().unwrap_or(0);
    if result.iter().any(|l| l.len() != target) {
        log::debug!("anchor resample: equalizing {} loops to {target} points", result.len());
        for k in 0..result.len() {
            let subdivided = subdivide_to_count(&result[k], target);
            result[k] = if k == 0 {
                subdivided
            } else {
                best_rotation(&result[k - 1], &subdivided)
            };
        }
    }

    result
}

/// Quads between two index-aligned loops at their heights.
///
/// Extra points in the longer array are ignored.
#[must_use]
pub fn matched_band(a: &[Point2], height_a: f64, b: &[Point2], height_b: f64) -> Vec<Face> {
    let n = a.len().min(b.len());
    if n < 3 {
        return Vec::new();
    }
    (0..n)
        .map(|k| {
            let next = (k + 1) % n;
            Face::quad(
                a[k].at_height(height_a),
                a[next].at_height(height_a),
                b[next].at_height(height_b),
                b[k].at_height(height_b),
            )
        })
        .collect()
}

fn subdivide_and_align(a: &[Point2], b: &[Point2]) -> (Vec<Point2>, Vec<Point2>) {
    let target = a.len().max(b.len());
    let a = subdivide_to_count(a, target);
    let b = subdivide_to_count(b, target);
    let b = best_rotation(&a, &b);
    (a, b)
}

/// Rotation of `b` with the smallest summed squared distance to `a`.
fn best_rotation(a: &[Point2], b: &[Point2]) -> Vec<Point2> {
    let n = a.len().min(b.len());
    if n == 0 {
        return b.to_vec();
    }
    let mut best = (0usize, f64::INFINITY);
    for shift in 0..b.len() {
        let cost: f64 = (0..n)
            .map(|k| a[k].distance_squared(b[(k + shift) % b.len()]))
            .sum();
        if cost < best.1 {
            best = (shift, cost);
        }
    }
    rotate_loop(b, best.0)
}

/// Adds points along the edges of a closed loop until it has `target` points.
///
/// Extra points are shared out in proportion to edge length (largest
/// remainder first, lower edge index on ties) and spaced evenly on each
/// edge. Original vertices are kept.
#[must_use]
pub fn subdivide_to_count(points: &[Point2], target: usize) -> Vec<Point2> {
    let n = points.len();
    if n < 2 || target <= n {
        return points.to_vec();
    }
    let extra = target - n;
    let lengths: Vec<f64> = (0..n)
        .map(|i| points[i].distance(points[(i + 1) % n]))
        .collect();
    let total: f64 = lengths.iter().sum();

    let shares: Vec<f64> = if total > Tolerance::ZERO_LENGTH.eps {
        lengths.iter().map(|l| extra as f64 * l / total).collect()
    } else {
        vec![extra as f64 / n as f64; n]
    };

    let mut counts: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();
    let assigned: usize = counts.iter().sum();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        let ri = shares[i] - shares[i].floor();
        let rj = shares[j] - shares[j].floor();
        rj.total_cmp(&ri).then(i.cmp(&j))
    });
    for &i in order.iter().take(extra.saturating_sub(assigned)) {
        counts[i] += 1;
    }

    let mut result = Vec::with_capacity(target);
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        result.push(p);
        let k = counts[i];
        for s in 1..=k {
            result.push(p.lerp(q, s as f64 / (k + 1) as f64));
        }
    }
    result
}

fn resample_between_anchors(a: &[Point2], b: &[Point2], anchors: &[Anchor]) -> (Vec<Point2>, Vec<Point2>) {
    let mut out_a = Vec::new();
    let mut out_b = Vec::new();

    for (k, anchor) in anchors.iter().enumerate() {
        let next = anchors[(k + 1) % anchors.len()];
        let chunk_a = open_chunk(a, anchor.index_a, next.index_a);
        let chunk_b = open_chunk(b, anchor.index_b, next.index_b);
        let count = chunk_a.len().max(chunk_b.len());

        let ra = resample_open(&chunk_a, count);
        let rb = resample_open(&chunk_b, count);
        // The chunk's last point is the next chunk's first.
        out_a.extend_from_slice(&ra[..count - 1]);
        out_b.extend_from_slice(&rb[..count - 1]);
    }

    (out_a, out_b)
}

/// Vertices from `start` to `end` inclusive, walking forward around the loop.
/// `start == end` yields the full loop closed back onto `start`.
fn open_chunk(points: &[Point2], start: usize, end: usize) -> Vec<Point2> {
    let n = points.len();
    let steps = if end > start { end - start } else { end + n - start };
    (0..=steps).map(|s| points[(start + s) % n]).collect()
}

/// Uniform arc-length resampling of an open polyline, endpoints kept.
///
/// A chunk that already has `count` points is still respaced, so index `k`
/// of two chunks always sits at the same fraction of their lengths.
fn resample_open(points: &[Point2], count: usize) -> Vec<Point2> {
    if points.len() < 2 || count < 2 {
        return points.to_vec();
    }

    let mut lengths = Vec::with_capacity(points.len());
    lengths.push(0.0);
    for w in points.windows(2) {
        let last = lengths.last().copied().unwrap_or(0.0);
        lengths.push(last + w[0].distance(w[1]));
    }
    let total = polyline_length(points);
    if total <= Tolerance::ZERO_LENGTH.eps || !total.is_finite() {
        return vec![points[0]; count];
    }

    let mut result = Vec::with_capacity(count);
    let mut seg = 0usize;
    for i in 0..count {
        let target = total * i as f64 / (count - 1) as f64;
        while seg + 2 < lengths.len() && lengths[seg + 1] < target {
            seg += 1;
        }
        let span = lengths[seg + 1] - lengths[seg];
        let local = if span > 0.0 {
            ((target - lengths[seg]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        result.push(points[seg].lerp(points[seg + 1], local));
    }
    if let Some(last) = result.last_mut() {
        *last = points[points.len() - 1];
    }
    result
}
