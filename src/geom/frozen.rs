//! Frozen segments: face connectivity locked, vertex positions still live.
//!
//! Freezing records, for every vertex of every face, where that vertex came
//! from: a numbered sketch vertex, or a point part-way along a sketch edge.
//! Replaying recomputes positions from those sources against the current
//! sketches, so edits move the band without re-triangulating it.

use serde::{Deserialize, Serialize};

use super::face::Face;
use super::polygon::closest_param_on_segment;
use super::{Point2, Point3, Tolerance};

/// Which of the two loops bounding a segment a vertex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopSide {
    Bottom,
    Top,
}

/// Provenance of one frozen face vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VertexSource {
    /// Coincides with sketch vertex `index`.
    Sketch {
        #[serde(rename = "loop")]
        side: LoopSide,
        index: usize,
    },
    /// Lies on the sketch edge `edge_start -> edge_end` at parameter `t`.
    Interpolated {
        #[serde(rename = "loop")]
        side: LoopSide,
        #[serde(rename = "edgeStart")]
        edge_start: usize,
        #[serde(rename = "edgeEnd")]
        edge_end: usize,
        t: f64,
    },
}

impl VertexSource {
    #[must_use]
    pub const fn side(&self) -> LoopSide {
        match *self {
            Self::Sketch { side, .. } | Self::Interpolated { side, .. } => side,
        }
    }

    /// Position of this source against the given loops, or `None` if an
    /// index no longer exists in the loop.
    #[must_use]
    pub fn resolve(&self, loops: &SegmentLoops<'_>) -> Option<Point3> {
        let (points, height) = loops.side(self.side());
        match *self {
            Self::Sketch { index, .. } => points.get(index).map(|p| p.at_height(height)),
            Self::Interpolated {
                edge_start,
                edge_end,
                t,
                ..
            } => {
                let a = points.get(edge_start)?;
                let b = points.get(edge_end)?;
                Some(a.lerp(*b, t).at_height(height))
            }
        }
    }
}

/// The two sketches bounding a segment, borrowed for one freeze or replay.
#[derive(Debug, Clone, Copy)]
pub struct SegmentLoops<'a> {
    pub bottom: &'a [Point2],
    pub bottom_height: f64,
    pub top: &'a [Point2],
    pub top_height: f64,
}

impl<'a> SegmentLoops<'a> {
    #[must_use]
    pub const fn new(bottom: &'a [Point2], bottom_height: f64, top: &'a [Point2], top_height: f64) -> Self {
        Self {
            bottom,
            bottom_height,
            top,
            top_height,
        }
    }

    #[must_use]
    pub const fn side(&self, side: LoopSide) -> (&'a [Point2], f64) {
        match side {
            LoopSide::Bottom => (self.bottom, self.bottom_height),
            LoopSide::Top => (self.top, self.top_height),
        }
    }
}

/// A segment whose face connectivity is fixed.
///
/// `sources[f][v]` is the provenance of `faces[f].vertices()[v]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenSegment {
    faces: Vec<Face>,
    sources: Vec<Vec<VertexSource>>,
}

impl FrozenSegment {
    /// Snapshots `faces` and classifies each vertex against `loops`.
    #[must_use]
    pub fn freeze(faces: &[Face], loops: &SegmentLoops<'_>) -> Self {
        let sources = faces
            .iter()
            .map(|face| face.vertices().iter().map(|&v| classify_vertex(v, loops)).collect())
            .collect();
        Self {
            faces: faces.to_vec(),
            sources,
        }
    }

    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[must_use]
    pub fn sources(&self) -> &[Vec<VertexSource>] {
        &self.sources
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Moves every vertex to the position its source has in `loops`.
    pub fn replay(&mut self, loops: &SegmentLoops<'_>) {
        replay_positions(&mut self.faces, &self.sources, loops);
    }

    #[must_use]
    pub fn to_record(&self) -> FrozenSegmentRecord {
        let faces = self
            .faces
            .iter()
            .zip(&self.sources)
            .map(|(face, sources)| FaceRecord {
                vertices: face.vertices().iter().map(|v| v.to_array()).collect(),
                sources: sources.clone(),
            })
            .collect();
        FrozenSegmentRecord { faces }
    }

    /// Rebuilds a frozen segment from its record.
    ///
    /// Each face is clamped to the shorter of its vertex and source lists and
    /// to at most four vertices; faces left with fewer than three are dropped.
    #[must_use]
    pub fn from_record(record: &FrozenSegmentRecord) -> Self {
        let mut faces = Vec::with_capacity(record.faces.len());
        let mut sources = Vec::with_capacity(record.faces.len());

        for (index, face) in record.faces.iter().enumerate() {
            let count = face.vertices.len().min(face.sources.len()).min(4);
            if count != face.vertices.len() || count != face.sources.len() {
                log::warn!(
                    "frozen face {index}: {} vertices / {} sources, keeping {count}",
                    face.vertices.len(),
                    face.sources.len()
                );
            }
            let points: Vec<Point3> = face.vertices[..count].iter().copied().map(Point3::from).collect();
            let Some(built) = Face::from_points(&points) else {
                log::warn!("frozen face {index}: dropped, {count} usable vertices");
                continue;
            };
            faces.push(built);
            sources.push(face.sources[..count].to_vec());
        }

        Self { faces, sources }
    }
}

/// Recomputes face positions in place from their sources.
///
/// Vertices whose source cannot be resolved keep their previous position.
/// Faces and sources beyond the shorter of the two lists are left alone.
pub fn replay_positions(faces: &mut [Face], sources: &[Vec<VertexSource>], loops: &SegmentLoops<'_>) {
    for (face_index, (face, face_sources)) in faces.iter_mut().zip(sources).enumerate() {
        for (vertex, source) in face.vertices_mut().iter_mut().zip(face_sources) {
            match source.resolve(loops) {
                Some(position) => *vertex = position,
                None => log::debug!("replay: face {face_index} source {source:?} is out of range"),
            }
        }
    }
}

/// Works out where face vertex `v` came from.
#[must_use]
pub fn classify_vertex(v: Point3, loops: &SegmentLoops<'_>) -> VertexSource {
    let tol = Tolerance::POSITION;
    let side = if tol.approx_eq(v.z, loops.bottom_height) {
        LoopSide::Bottom
    } else if tol.approx_eq(v.z, loops.top_height) {
        LoopSide::Top
    } else {
        log::warn!(
            "freeze: vertex at z={} matches neither height {} nor {}",
            v.z,
            loops.bottom_height,
            loops.top_height
        );
        return VertexSource::Interpolated {
            side: LoopSide::Bottom,
            edge_start: 0,
            edge_end: usize::from(loops.bottom.len() > 1),
            t: 0.0,
        };
    };

    let (points, _) = loops.side(side);
    let target = v.xy();

    if let Some(index) = points.iter().position(|p| p.distance(target) <= tol.eps) {
        return VertexSource::Sketch { side, index };
    }

    let n = points.len();
    let mut best = VertexSource::Interpolated {
        side,
        edge_start: 0,
        edge_end: 0,
        t: 0.0,
    };
    let mut best_dist = f64::INFINITY;
    for i in 0..n {
        let j = (i + 1) % n;
        let t = closest_param_on_segment(target, points[i], points[j]);
        let dist = points[i].lerp(points[j], t).distance_squared(target);
        if dist < best_dist {
            best_dist = dist;
            best = VertexSource::Interpolated {
                side,
                edge_start: i,
                edge_end: j,
                t,
            };
        }
    }
    best
}

/// One face of a [`FrozenSegmentRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub vertices: Vec<[f64; 3]>,
    pub sources: Vec<VertexSource>,
}

/// Plain, serializable form of a [`FrozenSegment`]: a list of faces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrozenSegmentRecord {
    pub faces: Vec<FaceRecord>,
}
