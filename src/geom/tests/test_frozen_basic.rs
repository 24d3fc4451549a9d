use crate::geom::{
    Face, FrozenSegment, FrozenSegmentRecord, LoopSide, Point2, SegmentLoops, VertexSource,
    perimeter_walk,
};

fn circle(r: f64, n: usize) -> Vec<Point2> {
    (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            Point2::new(r * a.cos(), r * a.sin())
        })
        .collect()
}

fn square(h: f64) -> Vec<Point2> {
    vec![
        Point2::new(-h, -h),
        Point2::new(h, -h),
        Point2::new(h, h),
        Point2::new(-h, h),
    ]
}

#[test]
fn balanced_points_freeze_as_interpolated_sources() {
    let bottom = square(1.0);
    let top = circle(1.0, 16);
    let faces = perimeter_walk(&bottom, 0.0, &top, 1.0);
    let frozen = FrozenSegment::freeze(&faces, &SegmentLoops::new(&bottom, 0.0, &top, 1.0));

    let interpolated = frozen
        .sources()
        .iter()
        .flatten()
        .filter(|s| matches!(s, VertexSource::Interpolated { side: LoopSide::Bottom, .. }))
        .count();
    assert!(interpolated > 0);
    assert!(
        frozen
            .sources()
            .iter()
            .flatten()
            .filter(|s| s.side() == LoopSide::Top)
            .all(|s| matches!(s, VertexSource::Sketch { .. }))
    );
}

#[test]
fn scaling_a_sketch_scales_interpolated_points() {
    let bottom = square(1.0);
    let top = circle(1.0, 16);
    let faces = perimeter_walk(&bottom, 0.0, &top, 1.0);
    let mut frozen = FrozenSegment::freeze(&faces, &SegmentLoops::new(&bottom, 0.0, &top, 1.0));

    let doubled: Vec<Point2> = bottom.iter().map(|&p| p * 2.0).collect();
    frozen.replay(&SegmentLoops::new(&doubled, 0.0, &top, 1.0));

    assert_eq!(frozen.face_count(), faces.len());
    for (before, after) in faces.iter().zip(frozen.faces()) {
        for (p, q) in before.vertices().iter().zip(after.vertices()) {
            if p.z == 0.0 {
                assert!((q.x - 2.0 * p.x).abs() < 1e-9 && (q.y - 2.0 * p.y).abs() < 1e-9);
            } else {
                assert_eq!(p, q);
            }
        }
    }
}

#[test]
fn record_parses_hand_written_json() {
    let json = r#"[
        {
            "vertices": [[0, 0, 0], [1, 0, 0], [1, 0, 2], [0, 0, 2]],
            "sources": [
                {"type": "sketch", "loop": "bottom", "index": 0},
                {"type": "sketch", "loop": "bottom", "index": 1},
                {"type": "sketch", "loop": "top", "index": 1},
                {"type": "interpolated", "loop": "top", "edgeStart": 0, "edgeEnd": 1, "t": 0.0}
            ]
        }
    ]"#;
    let record: FrozenSegmentRecord = serde_json::from_str(json).unwrap();
    let mut frozen = FrozenSegment::from_record(&record);
    assert_eq!(frozen.face_count(), 1);
    assert!(frozen.faces()[0].is_quad());

    let bottom = vec![Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(0.0, 3.0)];
    let top = vec![Point2::new(0.5, 0.5), Point2::new(2.0, 0.5), Point2::new(0.5, 2.0)];
    frozen.replay(&SegmentLoops::new(&bottom, 0.0, &top, 2.0));
    let v = frozen.faces()[0].vertices();
    assert_eq!(v[1].x, 3.0);
    assert_eq!(v[2].x, 2.0);
    assert_eq!(v[3].x, 0.5);
    assert!(frozen.faces().iter().all(|f: &Face| f.len() == 4));
}
