//! Loft strategy selection and options.

use std::fmt;
use std::str::FromStr;

use super::anchor::{DEFAULT_ANCHOR_EPSILON, anchor_resample_loops, anchor_resample_pair, matched_band};
use super::face::Face;
use super::walk::perimeter_walk;
use super::Point2;

/// How adjacent cross-sections are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoftStrategy {
    /// Walk both perimeters in lockstep; band topology follows the sketches.
    #[default]
    PerimeterWalk,
    /// Resample every sketch to one shared count via anchors, then join with quads.
    AnchorResample,
}

impl LoftStrategy {
    /// Every strategy, in presentation order.
    pub const ALL: [Self; 2] = [Self::PerimeterWalk, Self::AnchorResample];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PerimeterWalk => "perimeter-walk",
            Self::AnchorResample => "anchor-resample",
        }
    }

    /// Band between one pair of loops.
    #[must_use]
    pub fn loft_pair(self, a: &[Point2], height_a: f64, b: &[Point2], height_b: f64, options: &LoftOptions) -> Vec<Face> {
        match self {
            Self::PerimeterWalk => perimeter_walk(a, height_a, b, height_b),
            Self::AnchorResample => {
                let (ra, rb) = anchor_resample_pair(a, b, options.anchor_epsilon);
                matched_band(&ra, height_a, &rb, height_b)
            }
        }
    }

    /// Bands for every adjacent pair of a stack of `(loop, height)` sections.
    ///
    /// The anchor strategy resamples the whole stack at once so every band
    /// shares the same vertex correspondence.
    #[must_use]
    pub fn loft_stack(self, sections: &[(&[Point2], f64)], options: &LoftOptions) -> Vec<Vec<Face>> {
        if sections.len() < 2 {
            return Vec::new();
        }
        match self {
            Self::PerimeterWalk => sections
                .windows(2)
                .map(|w| perimeter_walk(w[0].0, w[0].1, w[1].0, w[1].1))
                .collect(),
            Self::AnchorResample => {
                let loops: Vec<Vec<Point2>> = sections.iter().map(|(points, _)| points.to_vec()).collect();
                let short = loops.iter().any(|l| l.len() < 3);
                let resampled = if short {
                    loops
                } else {
                    anchor_resample_loops(&loops, options.anchor_epsilon)
                };
                resampled
                    .windows(2)
                    .zip(sections.windows(2))
                    .map(|(r, s)| matched_band(&r[0], s[0].1, &r[1], s[1].1))
                    .collect()
            }
        }
    }
}

impl fmt::Display for LoftStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loft strategy '{0}' (expected one of: perimeter-walk, anchor-resample)")]
pub struct UnknownStrategy(pub String);

impl FromStr for LoftStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == key)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Options controlling how a model is lofted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoftOptions {
    /// Strategy used for unlocked segments
    pub strategy: LoftStrategy,
    /// Maximum distance between mutual nearest vertices for them to anchor
    pub anchor_epsilon: f64,
    /// Close the lowest cross-section with a downward-facing cap
    pub cap_bottom: bool,
    /// Close the highest cross-section with an upward-facing cap
    pub cap_top: bool,
}

impl Default for LoftOptions {
    fn default() -> Self {
        Self {
            strategy: LoftStrategy::PerimeterWalk,
            anchor_epsilon: DEFAULT_ANCHOR_EPSILON,
            cap_bottom: false,
            cap_top: false,
        }
    }
}

impl LoftOptions {
    /// Options using the anchor-resample strategy
    #[must_use]
    pub fn anchor_resample() -> Self {
        Self {
            strategy: LoftStrategy::AnchorResample,
            ..Default::default()
        }
    }

    /// Options with caps on both ends
    #[must_use]
    pub fn capped() -> Self {
        Self {
            cap_bottom: true,
            cap_top: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_strategy(self, strategy: LoftStrategy) -> Self {
        Self { strategy, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in LoftStrategy::ALL {
            assert_eq!(strategy.name().parse::<LoftStrategy>(), Ok(strategy));
        }
        assert_eq!("Anchor_Resample".parse::<LoftStrategy>(), Ok(LoftStrategy::AnchorResample));
        assert!("ruled".parse::<LoftStrategy>().is_err());
    }

    #[test]
    fn test_options_defaults() {
        let options = LoftOptions::default();
        assert_eq!(options.strategy, LoftStrategy::PerimeterWalk);
        assert!(!options.cap_bottom && !options.cap_top);
        assert_eq!(LoftOptions::anchor_resample().strategy, LoftStrategy::AnchorResample);
        assert!(LoftOptions::capped().cap_top);
    }

    #[test]
    fn test_stack_gives_one_band_per_pair() {
        let sq = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let sections = vec![(sq.as_slice(), 0.0), (sq.as_slice(), 1.0), (sq.as_slice(), 2.0)];
        for strategy in LoftStrategy::ALL {
            let bands = strategy.loft_stack(&sections, &LoftOptions::default());
            assert_eq!(bands.len(), 2);
            assert!(bands.iter().all(|b| b.len() == 4));
        }
        assert!(LoftStrategy::PerimeterWalk.loft_stack(&sections[..1], &LoftOptions::default()).is_empty());
    }
}
