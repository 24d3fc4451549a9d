use serde::{Deserialize, Serialize};

use super::Point3;

/// One polygon of the band between two cross-sections.
///
/// Quads are ordered `a0, a1, b1, b0` (bottom edge forward, top edge back),
/// triangles keep the same turning direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Face {
    Triangle([Point3; 3]),
    Quad([Point3; 4]),
}

impl Face {
    #[must_use]
    pub const fn triangle(a: Point3, b: Point3, c: Point3) -> Self {
        Self::Triangle([a, b, c])
    }

    #[must_use]
    pub const fn quad(a: Point3, b: Point3, c: Point3, d: Point3) -> Self {
        Self::Quad([a, b, c, d])
    }

    /// Builds a face from 3 or 4 points; any other count yields `None`.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        match *points {
            [a, b, c] => Some(Self::triangle(a, b, c)),
            [a, b, c, d] => Some(Self::quad(a, b, c, d)),
            _ => None,
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        match self {
            Self::Triangle(v) => v,
            Self::Quad(v) => v,
        }
    }

    pub fn vertices_mut(&mut self) -> &mut [Point3] {
        match self {
            Self::Triangle(v) => v,
            Self::Quad(v) => v,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub const fn is_quad(&self) -> bool {
        matches!(self, Self::Quad(_))
    }

    /// The same face with reversed winding.
    #[must_use]
    pub fn flipped(&self) -> Self {
        match *self {
            Self::Triangle([a, b, c]) => Self::triangle(a, c, b),
            Self::Quad([a, b, c, d]) => Self::quad(a, d, c, b),
        }
    }

    /// Fan triangulation (`0, i, i + 1`), the split a renderer applies to quads.
    #[must_use]
    pub fn triangles(&self) -> Vec<[Point3; 3]> {
        match *self {
            Self::Triangle(t) => vec![t],
            Self::Quad([a, b, c, d]) => vec![[a, b, c], [a, c, d]],
        }
    }
}
