//! Stacked cross-section model with per-segment locking.
//!
//! A [`LoftModel`] keeps its sections sorted by height. Every adjacent pair of
//! sections forms a segment, and every segment is either rebuilt from the
//! current sketches on demand or locked to a [`FrozenSegment`] whose
//! connectivity never changes while its positions follow sketch edits.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use super::cap::{CapFacing, cap_faces};
use super::face::Face;
use super::frozen::{FrozenSegment, FrozenSegmentRecord, SegmentLoops};
use super::guard::would_cause_self_intersection;
use super::metrics::{LoftMetrics, LoftTimingReport, TimingBucket};
use super::strategy::{LoftOptions, LoftStrategy};
use super::Point2;

/// One sketch loop placed at a height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub points: Vec<Point2>,
    pub height: f64,
}

impl CrossSection {
    #[must_use]
    pub fn new(points: Vec<Point2>, height: f64) -> Self {
        Self { points, height }
    }
}

/// Lock state of one segment. A locked segment owns its frozen snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SegmentLock {
    #[default]
    Unlocked,
    Locked(FrozenSegment),
}

impl SegmentLock {
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked(_))
    }

    #[must_use]
    pub const fn frozen(&self) -> Option<&FrozenSegment> {
        match self {
            Self::Locked(frozen) => Some(frozen),
            Self::Unlocked => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("section index {index} out of range ({count} sections)")]
    SectionOutOfRange { index: usize, count: usize },
    #[error("segment index {index} out of range ({count} segments)")]
    SegmentOutOfRange { index: usize, count: usize },
    #[error("vertex {index} out of range for section {section} ({count} vertices)")]
    VertexOutOfRange {
        section: usize,
        index: usize,
        count: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid model record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializable snapshot of a [`LoftModel`].
///
/// `locks[i]` and `frozen[i]` describe segment `i`, the band between
/// `sections[i]` and `sections[i + 1]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelRecord {
    pub sections: Vec<CrossSection>,
    #[serde(default)]
    pub locks: Vec<bool>,
    #[serde(default)]
    pub frozen: Vec<Option<FrozenSegmentRecord>>,
}

#[derive(Debug, Clone, Default)]
pub struct LoftModel {
    sections: Vec<CrossSection>,
    locks: Vec<SegmentLock>,
    options: LoftOptions,
    metrics: RefCell<LoftMetrics>,
}

impl LoftModel {
    #[must_use]
    pub fn new(options: LoftOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn options(&self) -> &LoftOptions {
        &self.options
    }

    /// Replaces the options. Locked segments keep their frozen topology.
    pub fn set_options(&mut self, options: LoftOptions) {
        self.options = options;
    }

    pub fn set_strategy(&mut self, strategy: LoftStrategy) {
        self.options.strategy = strategy;
    }

    #[must_use]
    pub fn sections(&self) -> &[CrossSection] {
        &self.sections
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.locks.len()
    }

    /// Timing accumulated since the last [`reset_timing`](Self::reset_timing),
    /// or `None` without the `loft_metrics` feature. Covers edits, locking and
    /// face queries alike.
    #[must_use]
    pub fn timing(&self) -> Option<LoftTimingReport> {
        self.metrics.borrow().end()
    }

    pub fn reset_timing(&mut self) {
        self.metrics.get_mut().begin();
    }

    /// Inserts a section above every section of lower or equal height and
    /// returns its index.
    ///
    /// A segment split by the insertion is unlocked; the new segment starts
    /// unlocked.
    pub fn add_section(&mut self, section: CrossSection) -> usize {
        let index = self.sections.partition_point(|s| s.height <= section.height);
        let had_sections = !self.sections.is_empty();
        self.sections.insert(index, section);

        if had_sections {
            if index == 0 {
                self.locks.insert(0, SegmentLock::Unlocked);
            } else if index == self.sections.len() - 1 {
                self.locks.push(SegmentLock::Unlocked);
            } else {
                if self.locks[index - 1].is_locked() {
                    log::debug!("segment {}: unlocked, split by new section {index}", index - 1);
                }
                self.locks[index - 1] = SegmentLock::Unlocked;
                self.locks.insert(index, SegmentLock::Unlocked);
            }
        }
        debug_assert_eq!(self.locks.len(), self.sections.len().saturating_sub(1));
        index
    }

    /// Removes a section. The segments on either side of it are replaced by
    /// one unlocked segment joining its neighbours.
    pub fn remove_section(&mut self, index: usize) -> Result<CrossSection, ModelError> {
        self.check_section(index)?;
        let count = self.sections.len();
        let removed = self.sections.remove(index);

        if count > 1 {
            if index == 0 {
                self.locks.remove(0);
            } else if index == count - 1 {
                self.locks.pop();
            } else {
                self.locks[index - 1] = SegmentLock::Unlocked;
                self.locks.remove(index);
            }
        }
        debug_assert_eq!(self.locks.len(), self.sections.len().saturating_sub(1));
        Ok(removed)
    }

    /// Replaces the sketch of a section and replays the locked segments that
    /// touch it.
    pub fn set_section_points(&mut self, index: usize, points: Vec<Point2>) -> Result<(), ModelError> {
        self.check_section(index)?;
        self.sections[index].points = points;
        self.replay_around(index);
        Ok(())
    }

    /// Moves one sketch vertex unless the move would make the loop
    /// self-intersecting. Returns whether the move was applied.
    pub fn move_vertex(&mut self, section: usize, vertex: usize, position: Point2) -> Result<bool, ModelError> {
        self.check_section(section)?;
        let count = self.sections[section].points.len();
        if vertex >= count {
            return Err(ModelError::VertexOutOfRange {
                section,
                index: vertex,
                count,
            });
        }

        let points = &self.sections[section].points;
        let rejected = self
            .metrics
            .get_mut()
            .time(TimingBucket::Guard, || would_cause_self_intersection(points, vertex, position));
        if rejected {
            log::debug!("section {section}: move of vertex {vertex} to {position:?} rejected");
            return Ok(false);
        }

        self.sections[section].points[vertex] = position;
        self.replay_around(section);
        Ok(true)
    }

    /// Freezes the current faces of a segment. Locking a locked segment does
    /// nothing.
    pub fn lock_segment(&mut self, index: usize) -> Result<(), ModelError> {
        self.check_segment(index)?;
        if self.locks[index].is_locked() {
            return Ok(());
        }

        let frozen = {
            let mut metrics = self.metrics.borrow_mut();
            let faces = self.fresh_segment_faces(index, &mut metrics);
            let loops = self.segment_loops(index);
            metrics.time(TimingBucket::Freeze, || {
                // Positions are snapped to their sources so a reload replays to the same bits.
                let mut frozen = FrozenSegment::freeze(&faces, &loops);
                frozen.replay(&loops);
                frozen
            })
        };

        log::debug!("segment {index}: locked with {} faces", frozen.face_count());
        self.locks[index] = SegmentLock::Locked(frozen);
        Ok(())
    }

    /// Drops the frozen snapshot; the segment is rebuilt on the next query.
    pub fn unlock_segment(&mut self, index: usize) -> Result<(), ModelError> {
        self.check_segment(index)?;
        if self.locks[index].is_locked() {
            log::debug!("segment {index}: unlocked");
        }
        self.locks[index] = SegmentLock::Unlocked;
        Ok(())
    }

    pub fn is_segment_locked(&self, index: usize) -> Result<bool, ModelError> {
        self.check_segment(index)?;
        Ok(self.locks[index].is_locked())
    }

    /// Faces of one segment, frozen or freshly built.
    pub fn segment_faces(&self, index: usize) -> Result<Vec<Face>, ModelError> {
        self.check_segment(index)?;
        Ok(match &self.locks[index] {
            SegmentLock::Locked(frozen) => frozen.faces().to_vec(),
            SegmentLock::Unlocked => self.fresh_segment_faces(index, &mut self.metrics.borrow_mut()),
        })
    }

    /// Every band in segment order, followed by caps if enabled.
    #[must_use]
    pub fn faces(&self) -> Vec<Face> {
        let (bottom, top) = self.caps();
        let mut faces = bottom;
        faces.extend(self.segment_bands().into_iter().flatten());
        faces.extend(top);
        faces
    }

    /// Bottom and top cap faces; empty for a cap that is switched off.
    #[must_use]
    pub fn caps(&self) -> (Vec<Face>, Vec<Face>) {
        let mut metrics = self.metrics.borrow_mut();
        let mut cap = |section: Option<&CrossSection>, enabled: bool, facing: CapFacing| match section {
            Some(s) if enabled => metrics.time(TimingBucket::Cap, || cap_faces(&s.points, s.height, facing)),
            _ => Vec::new(),
        };
        let bottom = cap(self.sections.first(), self.options.cap_bottom, CapFacing::Down);
        let top = cap(self.sections.last(), self.options.cap_top, CapFacing::Up);
        (bottom, top)
    }

    /// Faces grouped per segment.
    #[must_use]
    pub fn segment_bands(&self) -> Vec<Vec<Face>> {
        let mut metrics = self.metrics.borrow_mut();
        let any_unlocked = self.locks.iter().any(|lock| !lock.is_locked());
        let mut stacked = match self.options.strategy {
            LoftStrategy::AnchorResample if any_unlocked => {
                let stack = self.stack();
                Some(metrics.time(TimingBucket::Anchor, || {
                    LoftStrategy::AnchorResample.loft_stack(&stack, &self.options)
                }))
            }
            _ => None,
        };

        self.locks
            .iter()
            .enumerate()
            .map(|(index, lock)| match (lock, stacked.as_mut()) {
                (SegmentLock::Locked(frozen), _) => frozen.faces().to_vec(),
                (SegmentLock::Unlocked, Some(bands)) => bands.get_mut(index).map(std::mem::take).unwrap_or_default(),
                (SegmentLock::Unlocked, None) => self.fresh_segment_faces(index, &mut metrics),
            })
            .collect()
    }

    #[must_use]
    pub fn to_record(&self) -> ModelRecord {
        ModelRecord {
            sections: self.sections.clone(),
            locks: self.locks.iter().map(SegmentLock::is_locked).collect(),
            frozen: self
                .locks
                .iter()
                .map(|lock| lock.frozen().map(FrozenSegment::to_record))
                .collect(),
        }
    }

    /// Rebuilds a model from a record.
    ///
    /// Lock and frozen lists are read per segment and extra entries ignored.
    /// A lock flag with no frozen data freezes the current geometry; frozen
    /// data without a lock flag is discarded. Locked segments are replayed
    /// against the loaded sketches.
    #[must_use]
    pub fn from_record(record: ModelRecord, options: LoftOptions) -> Self {
        let ModelRecord {
            mut sections,
            mut locks,
            mut frozen,
        } = record;

        let sorted = sections.windows(2).all(|w| w[0].height <= w[1].height);
        if !sorted {
            log::warn!("model record: sections not sorted by height, dropping lock state");
            sections.sort_by(|a, b| a.height.total_cmp(&b.height));
            locks.clear();
            frozen.clear();
        }

        let segment_count = sections.len().saturating_sub(1);
        if locks.len() > segment_count || frozen.len() > segment_count {
            log::warn!(
                "model record: {} locks / {} frozen entries for {segment_count} segments, extra ignored",
                locks.len(),
                frozen.len()
            );
        }
        frozen.resize(segment_count.max(frozen.len()), None);

        let mut model = Self {
            sections,
            locks: vec![SegmentLock::Unlocked; segment_count],
            options,
            metrics: RefCell::default(),
        };

        for (index, slot) in frozen.into_iter().take(segment_count).enumerate() {
            let locked = locks.get(index).copied().unwrap_or(false);
            match (locked, slot) {
                (true, Some(record)) => {
                    model.locks[index] = SegmentLock::Locked(FrozenSegment::from_record(&record));
                    model.replay_segment(index);
                }
                (true, None) => {
                    log::warn!("model record: segment {index} locked without frozen data, freezing current faces");
                    // Index is in range by construction.
                    let _ = model.lock_segment(index);
                }
                (false, Some(_)) => {
                    log::warn!("model record: segment {index} has frozen data but is unlocked, discarding");
                }
                (false, None) => {}
            }
        }
        model
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    pub fn from_json(json: &str, options: LoftOptions) -> Result<Self, RecordError> {
        let record: ModelRecord = serde_json::from_str(json)?;
        Ok(Self::from_record(record, options))
    }

    fn check_section(&self, index: usize) -> Result<(), ModelError> {
        if index < self.sections.len() {
            Ok(())
        } else {
            Err(ModelError::SectionOutOfRange {
                index,
                count: self.sections.len(),
            })
        }
    }

    fn check_segment(&self, index: usize) -> Result<(), ModelError> {
        if index < self.locks.len() {
            Ok(())
        } else {
            Err(ModelError::SegmentOutOfRange {
                index,
                count: self.locks.len(),
            })
        }
    }

    fn stack(&self) -> Vec<(&[Point2], f64)> {
        self.sections.iter().map(|s| (s.points.as_slice(), s.height)).collect()
    }

    fn segment_loops(&self, index: usize) -> SegmentLoops<'_> {
        let (bottom, top) = (&self.sections[index], &self.sections[index + 1]);
        SegmentLoops::new(&bottom.points, bottom.height, &top.points, top.height)
    }

    fn fresh_segment_faces(&self, index: usize, metrics: &mut LoftMetrics) -> Vec<Face> {
        let (bottom, top) = (&self.sections[index], &self.sections[index + 1]);
        match self.options.strategy {
            LoftStrategy::PerimeterWalk => metrics.time(TimingBucket::Walk, || {
                LoftStrategy::PerimeterWalk.loft_pair(&bottom.points, bottom.height, &top.points, top.height, &self.options)
            }),
            // Anchor correspondence depends on the whole stack.
            LoftStrategy::AnchorResample => {
                let stack = self.stack();
                metrics
                    .time(TimingBucket::Anchor, || {
                        LoftStrategy::AnchorResample.loft_stack(&stack, &self.options)
                    })
                    .into_iter()
                    .nth(index)
                    .unwrap_or_default()
            }
        }
    }

    fn replay_around(&mut self, section: usize) {
        if section > 0 {
            self.replay_segment(section - 1);
        }
        if section < self.locks.len() {
            self.replay_segment(section);
        }
    }

    fn replay_segment(&mut self, index: usize) {
        let (bottom, top) = (&self.sections[index], &self.sections[index + 1]);
        let loops = SegmentLoops::new(&bottom.points, bottom.height, &top.points, top.height);
        if let SegmentLock::Locked(frozen) = &mut self.locks[index] {
            self.metrics.get_mut().time(TimingBucket::Replay, || frozen.replay(&loops));
        }
    }
}
