use super::*;

#[test]
fn fps_parses_ffprobe_ratios() {
    let ntsc = Fps::parse_ratio("30000/1001").unwrap();
    assert_eq!(ntsc, Fps { num: 30000, den: 1001 });
    assert!((ntsc.as_f64() - 29.97).abs() < 0.01);

    assert_eq!(Fps::parse_ratio("25").unwrap(), Fps { num: 25, den: 1 });
    assert!(Fps::parse_ratio("0/0").is_err());
    assert!(Fps::parse_ratio("abc").is_err());
}

#[test]
fn secs_to_frames_rounds() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(2.0), 60);
    let fps = Fps::new(30000, 1001).unwrap();
    assert_eq!(fps.secs_to_frames_round(2.0), 60);
    let fps = Fps::new(24, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(0.02), 0);
}

#[test]
fn rotation_round_trips_through_degrees() {
    for r in Rotation::ALL {
        assert_eq!(Rotation::from_degrees(i64::from(r.degrees())), Some(r));
        assert_eq!(
            (u32::from(r.degrees()) + u32::from(r.inverse().degrees())) % 360,
            0
        );
    }
    assert_eq!(Rotation::from_degrees(45), None);
    assert_eq!(Rotation::from_degrees(-90), None);
}

#[test]
fn rotation_serializes_as_degrees() {
    let json = serde_json::to_string(&Rotation::Deg270).unwrap();
    assert_eq!(json, "270");
    let r: Rotation = serde_json::from_str("90").unwrap();
    assert_eq!(r, Rotation::Deg90);
    assert!(serde_json::from_str::<Rotation>("45").is_err());
}

#[test]
fn frame_size_swaps_only_for_quarter_turns() {
    let raw = FrameSize::new(1920, 1080);
    assert_eq!(raw.rotated(Rotation::Deg0), raw);
    assert_eq!(raw.rotated(Rotation::Deg180), raw);
    assert_eq!(raw.rotated(Rotation::Deg90), FrameSize::new(1080, 1920));
    assert_eq!(raw.rotated(Rotation::Deg270), FrameSize::new(1080, 1920));
}

#[test]
fn frame_size_bounds_are_half_open() {
    let s = FrameSize::new(4, 3);
    assert!(s.contains(0, 0));
    assert!(s.contains(3, 2));
    assert!(!s.contains(4, 2));
    assert!(!s.contains(3, 3));
    assert!(!s.contains(-1, 0));
}

#[test]
fn video_properties_follow_rotation() {
    let fps = Fps::new(30, 1).unwrap();
    let props = VideoProperties::from_raw(fps, FrameSize::new(640, 360), Rotation::Deg90);
    assert_eq!((props.width, props.height), (360, 640));
    assert_eq!(props.rotation, Rotation::Deg90);
}

#[test]
fn frame_age_saturates() {
    assert_eq!(FrameIndex(10).age_since(FrameIndex(4)), 6);
    assert_eq!(FrameIndex(4).age_since(FrameIndex(10)), 0);
}
