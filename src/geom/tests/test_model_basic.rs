use crate::geom::{
    CrossSection, Face, LoftModel, LoftOptions, LoftStrategy, ModelRecord, Point2,
};

fn square(h: f64) -> Vec<Point2> {
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

fn tower() -> LoftModel {
    let mut model = LoftModel::default();
    model.add_section(CrossSection::new(square(2.0), 0.0));
    model.add_section(CrossSection::new(circle(1.5, 12), 2.0));
    model.add_section(CrossSection::new(square(1.0), 4.0));
    model
}

#[test]
fn locked_segment_survives_edits_to_both_sketches() {
    let mut model = tower();
    model.lock_segment(0).unwrap();
    let frozen_counts: Vec<usize> = model.segment_faces(0).unwrap().iter().map(Face::len).collect();

    assert!(model.move_vertex(0, 1, Point2::new(2.5, -2.5)).unwrap());
    model.set_section_points(1, circle(1.8, 12)).unwrap();

    let counts: Vec<usize> = model.segment_faces(0).unwrap().iter().map(Face::len).collect();
    assert_eq!(counts, frozen_counts);
    let faces = model.segment_faces(0).unwrap();
    assert!(faces.iter().flat_map(Face::vertices).any(|v| v.x == 2.5 && v.y == -2.5));
}

#[test]
fn unlocked_neighbour_follows_strategy_changes() {
    let mut model = tower();
    model.lock_segment(0).unwrap();
    let locked = model.segment_faces(0).unwrap();

    model.set_strategy(LoftStrategy::AnchorResample);
    assert_eq!(model.segment_faces(0).unwrap(), locked);
    assert!(model.segment_faces(1).unwrap().iter().all(Face::is_quad));
}

#[test]
fn faces_concatenate_segments_in_order() {
    let model = tower();
    let bands = model.segment_bands();
    let all = model.faces();
    assert_eq!(all.len(), bands.iter().map(Vec::len).sum::<usize>());
    assert_eq!(all[..bands[0].len()], bands[0][..]);
    assert!(all.last().unwrap().vertices().iter().any(|v| v.z == 4.0));
}

#[test]
fn saved_model_reloads_with_locks_and_edits() {
    let mut model = LoftModel::new(LoftOptions::capped());
    model.add_section(CrossSection::new(square(2.0), 0.0));
    model.add_section(CrossSection::new(circle(1.5, 12), 2.0));
    model.lock_segment(0).unwrap();
    assert!(model.move_vertex(1, 3, Point2::new(0.0, 1.7)).unwrap());

    let json = model.to_json().unwrap();
    let record: ModelRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record.locks, vec![true]);
    assert!(record.frozen[0].is_some());

    let loaded = LoftModel::from_json(&json, LoftOptions::capped()).unwrap();
    assert_eq!(loaded.faces(), model.faces());
}

#[test]
fn minimal_record_without_lock_lists_loads() {
    let json = r#"{"sections": [
        {"points": [[0, 0], [1, 0], [1, 1], [0, 1]], "height": 0},
        {"points": [[0, 0], [1, 0], [1, 1], [0, 1]], "height": 1}
    ]}"#;
    let model = LoftModel::from_json(json, LoftOptions::default()).unwrap();
    assert_eq!(model.segment_count(), 1);
    assert!(!model.is_segment_locked(0).unwrap());
    assert_eq!(model.faces().len(), 4);
}

#[test]
fn unsorted_record_is_sorted_and_unlocked() {
    let record = ModelRecord {
        sections: vec![
            CrossSection::new(square(1.0), 3.0),
            CrossSection::new(square(1.0), 1.0),
        ],
        locks: vec![true],
        frozen: vec![None],
    };
    let model = LoftModel::from_record(record, LoftOptions::default());
    assert_eq!(model.sections()[0].height, 1.0);
    assert!(!model.is_segment_locked(0).unwrap());
}
