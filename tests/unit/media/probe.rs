use super::*;

fn parse(json: &str) -> OverlayResult<SourceInfo> {
    parse_probe_json(json.as_bytes(), Path::new("clip.mov"))
}

#[test]
fn parses_dimensions_rate_and_count() {
    let info = parse(
        r#"{ "streams": [
            { "codec_type": "audio" },
            { "codec_type": "video", "width": 1920, "height": 1080,
              "r_frame_rate": "30000/1001", "avg_frame_rate": "30000/1001", "nb_frames": "240" }
        ] }"#,
    )
    .unwrap();
    assert_eq!(info.raw_size, FrameSize::new(1920, 1080));
    assert_eq!(info.fps, Fps { num: 30000, den: 1001 });
    assert_eq!(info.frame_count, Some(240));
    assert_eq!(info.metadata_rotation, None);
    assert_eq!(info.source_path, PathBuf::from("clip.mov"));
}

#[test]
fn falls_back_to_average_rate() {
    let info = parse(
        r#"{ "streams": [ { "codec_type": "video", "width": 8, "height": 8,
              "r_frame_rate": "0/0", "avg_frame_rate": "25/1" } ] }"#,
    )
    .unwrap();
    assert_eq!(info.fps, Fps { num: 25, den: 1 });
    assert_eq!(info.frame_count, None);
}

#[test]
fn display_matrix_rotation_is_negated_to_clockwise() {
    let info = parse(
        r#"{ "streams": [ { "codec_type": "video", "width": 8, "height": 8, "r_frame_rate": "30/1",
              "side_data_list": [ { "side_data_type": "Display Matrix", "rotation": -90 } ] } ] }"#,
    )
    .unwrap();
    assert_eq!(info.metadata_rotation, Some(90.0));
}

#[test]
fn rotate_tag_wins_over_side_data() {
    let info = parse(
        r#"{ "streams": [ { "codec_type": "video", "width": 8, "height": 8, "r_frame_rate": "30/1",
              "tags": { "rotate": "270" },
              "side_data_list": [ { "side_data_type": "Display Matrix", "rotation": 90 } ] } ] }"#,
    )
    .unwrap();
    assert_eq!(info.metadata_rotation, Some(270.0));
}

#[test]
fn missing_video_stream_is_resource_error() {
    let err = parse(r#"{ "streams": [ { "codec_type": "audio" } ] }"#).unwrap_err();
    assert!(matches!(err, OverlayError::ResourceUnavailable(_)));
    assert!(parse("garbage").is_err());
}

#[test]
fn probing_missing_file_is_not_found() {
    let err = probe_video(Path::new("target/definitely-missing.mov")).unwrap_err();
    assert!(matches!(err, OverlayError::NotFound(_)));
}
