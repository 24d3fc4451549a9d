mod anchor;
mod cap;
mod core;
mod face;
mod frozen;
mod guard;
mod metrics;
mod model;
mod param_loop;
mod polygon;
mod strategy;
mod walk;

pub use anchor::{
    Anchor, DEFAULT_ANCHOR_EPSILON, anchor_resample_loops, anchor_resample_pair, find_anchors,
    matched_band, subdivide_to_count,
};
pub use cap::{CapFacing, cap_faces};
pub use core::{Point2, Point3, Tolerance, Vec3};
pub use face::Face;
pub use frozen::{
    FaceRecord, FrozenSegment, FrozenSegmentRecord, LoopSide, SegmentLoops, VertexSource,
    classify_vertex, replay_positions,
};
pub use guard::would_cause_self_intersection;
pub use metrics::{LoftMetrics, LoftTimingReport, TimingBucket};
pub use model::{CrossSection, LoftModel, ModelError, ModelRecord, RecordError, SegmentLock};
pub use param_loop::ParamLoop;
pub use polygon::{
    Orientation, closest_param_on_segment, cumulative_lengths, ensure_ccw, is_ccw, nearest_index,
    on_segment, orient2d, orientation, perimeter, point_in_triangle, polyline_length, rotate_loop,
    segments_intersect, signed_area,
};
pub use strategy::{LoftOptions, LoftStrategy, UnknownStrategy};
pub use walk::{
    WalkDiagnostics, align_start, balance_loops, perimeter_walk, perimeter_walk_with_diagnostics,
};

#[cfg(test)]
mod tests;
