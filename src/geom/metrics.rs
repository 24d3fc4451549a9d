//! Opt-in timing hooks for the loft engine.
//!
//! Timing is only collected when the `loft_metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise
//! every call compiles down to running the closure.
//!
//! # Usage
//!
//! ```ignore
//! use loft_engine::geom::{LoftMetrics, TimingBucket};
//!
//! let mut metrics = LoftMetrics::default();
//! metrics.begin();
//! let faces = metrics.time(TimingBucket::Walk, || perimeter_walk(&a, 0.0, &b, 1.0));
//! if let Some(report) = metrics.end() {
//!     println!("walk: {} ns", report.walk_ns);
//! }
//! ```

/// Categories of loft work that are timed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Fresh band construction (either strategy).
    Walk,
    /// Anchor search and resampling.
    Anchor,
    /// Classifying vertices when a segment is locked.
    Freeze,
    /// Position-only updates of locked segments.
    Replay,
    /// Self-intersection checks on vertex edits.
    Guard,
    /// Cap triangulation.
    Cap,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoftTimingReport {
    pub walk_ns: u64,
    pub anchor_ns: u64,
    pub freeze_ns: u64,
    pub replay_ns: u64,
    pub guard_ns: u64,
    pub cap_ns: u64,
}

impl LoftTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.walk_ns
            .saturating_add(self.anchor_ns)
            .saturating_add(self.freeze_ns)
            .saturating_add(self.replay_ns)
            .saturating_add(self.guard_ns)
            .saturating_add(self.cap_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing loft operations.
///
/// When the `loft_metrics` feature is disabled (or on WASM), all methods are
/// no-ops and [`end`](Self::end) returns `None`.
#[derive(Debug, Default, Clone)]
pub struct LoftMetrics {
    #[cfg(all(feature = "loft_metrics", not(target_arch = "wasm32")))]
    report: LoftTimingReport,
}

impl LoftMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "loft_metrics", not(target_arch = "wasm32")))]
        {
            self.report = LoftTimingReport::default();
        }
    }

    /// Returns the accumulated report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<LoftTimingReport> {
        #[cfg(all(feature = "loft_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "loft_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times `f` and adds the elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "loft_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = match bucket {
                TimingBucket::Walk => &mut self.report.walk_ns,
                TimingBucket::Anchor => &mut self.report.anchor_ns,
                TimingBucket::Freeze => &mut self.report.freeze_ns,
                TimingBucket::Replay => &mut self.report.replay_ns,
                TimingBucket::Guard => &mut self.report.guard_ns,
                TimingBucket::Cap => &mut self.report.cap_ns,
            };
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "loft_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
