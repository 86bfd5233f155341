use super::*;

fn full_set(visibility: f64) -> Vec<Landmark> {
    (0..LANDMARK_COUNT)
        .map(|i| Landmark::new(i as f64 / 40.0, 0.5, 0.0, visibility))
        .collect()
}

#[test]
fn names_cover_the_canonical_indices() {
    assert_eq!(LANDMARK_NAMES[NOSE], "nose");
    assert_eq!(LANDMARK_NAMES[LEFT_HIP], "left_hip");
    assert_eq!(LANDMARK_NAMES[RIGHT_HIP], "right_hip");
    assert_eq!(LANDMARK_NAMES[32], "right_foot_index");
}

#[test]
fn face_detail_excludes_nose_and_body() {
    assert!(!is_face_detail(NOSE));
    assert!((1..=10).all(is_face_detail));
    assert!(!is_face_detail(11));
}

#[test]
fn landmark_set_invariant() {
    let ok = PoseFrame::detected(FrameIndex(3), full_set(0.9));
    assert!(ok.validate_landmarks().is_ok());

    let empty = PoseFrame::undetected(FrameIndex(4));
    assert!(empty.validate_landmarks().is_ok());

    let mut short = ok.clone();
    short.landmarks.truncate(20);
    assert!(short.validate_landmarks().unwrap_err().contains("20 landmarks"));

    let mut nan = ok.clone();
    nan.landmarks[5].x = f64::NAN;
    assert!(nan.validate_landmarks().unwrap_err().contains("right_eye"));
}

#[test]
fn overall_confidence_is_mean_of_visible() {
    let mut lms = full_set(0.2);
    lms[0].visibility = 0.8;
    lms[1].visibility = 1.0;
    let f = PoseFrame::detected(FrameIndex(0), lms);
    assert!((f.overall_confidence - 0.9).abs() < 1e-9);
    assert_eq!(mean_visibility(&full_set(0.1), 0.5), 0.0);
}

#[test]
fn pose_frame_json_defaults_missing_fields() {
    let json = r#"{ "frame_index": 7, "landmarks": [] }"#;
    let f: PoseFrame = serde_json::from_str(json).unwrap();
    assert_eq!(f.frame_index, FrameIndex(7));
    assert!(!f.pose_detected);
    assert_eq!(f.quality_flags, QualityFlags::default());
    assert!(!f.has_drawable_pose());
}
