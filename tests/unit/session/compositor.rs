use super::*;
use crate::encode::sink::InMemorySink;
use crate::media::decode::InMemoryFrameSource;
use crate::pose::landmark::{LANDMARK_COUNT, LEFT_HIP, NOSE, RIGHT_HIP};

const GREEN: [u8; 4] = [0, 255, 0, 255];

fn fps() -> Fps {
    Fps::new(30, 1).unwrap()
}

fn nose_only(x: f64, y: f64) -> Vec<Landmark> {
    let mut lms = vec![Landmark::new(0.5, 0.5, 0.0, 0.0); LANDMARK_COUNT];
    lms[NOSE] = Landmark::new(x, y, 0.0, 0.9);
    lms
}

fn opts(strategy: RotationStrategy) -> OverlayOpts {
    OverlayOpts {
        strategy,
        ..OverlayOpts::default()
    }
}

fn raw() -> FrameSize {
    FrameSize::new(40, 20)
}

#[test]
fn every_strategy_lands_the_joint_on_the_same_upright_pixel() {
    let frame = FrameRGBA::solid(raw(), [0, 0, 0, 255]);
    let cases = [
        (RotationStrategy::PreRotateFrame, nose_only(0.5, 0.25)),
        (RotationStrategy::CompensateLandmarks, nose_only(0.25, 0.5)),
        (RotationStrategy::PostRotateOutput, nose_only(0.25, 0.5)),
    ];
    for (strategy, lms) in cases {
        let mut c = FrameCompositor::new(&opts(strategy), Rotation::Deg90, raw(), fps());
        let pose = PoseFrame::detected(FrameIndex(0), lms);
        let out = c.compose(FrameIndex(0), &frame, Some(&pose));
        assert!(out.annotated && !out.degraded, "{strategy:?}");
        assert_eq!(out.frame.size(), FrameSize::new(20, 40));
        assert_eq!(out.frame.pixel(10, 10), Some(GREEN), "{strategy:?}");
        assert_eq!(out.frame.pixel(9, 10), Some(GREEN), "{strategy:?}");
        assert_eq!(out.frame.pixel(10, 30), Some([0, 0, 0, 255]), "{strategy:?}");
    }
}

#[test]
fn frames_without_drawable_pose_pass_through_rotated() {
    let frame = FrameRGBA::from_image(image::RgbaImage::from_fn(40, 20, |x, y| {
        image::Rgba([x as u8, y as u8, 7, 255])
    }));
    let mut c = FrameCompositor::new(
        &OverlayOpts::default(),
        Rotation::Deg270,
        raw(),
        fps(),
    );
    let expected = frame.rotated(Rotation::Deg270);

    let out = c.compose(FrameIndex(0), &frame, None);
    assert_eq!(out.frame, expected);
    assert!(!out.annotated && !out.degraded);

    let undetected = PoseFrame::undetected(FrameIndex(1));
    assert_eq!(c.compose(FrameIndex(1), &frame, Some(&undetected)).frame, expected);

    let mut empty = PoseFrame::detected(FrameIndex(2), Vec::new());
    empty.pose_detected = true;
    assert!(!c.compose(FrameIndex(2), &frame, Some(&empty)).annotated);
}

#[test]
fn invalid_landmark_sets_degrade_to_pass_through() {
    let frame = FrameRGBA::solid(raw(), [5, 5, 5, 255]);
    let mut c = FrameCompositor::new(&OverlayOpts::default(), Rotation::Deg0, raw(), fps());

    let short = PoseFrame::detected(FrameIndex(0), vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 5]);
    let out = c.compose(FrameIndex(0), &frame, Some(&short));
    assert!(out.degraded && !out.annotated);
    assert_eq!(out.frame, frame);

    let mut lms = nose_only(0.5, 0.5);
    lms[3].x = f64::NAN;
    let nan = PoseFrame::detected(FrameIndex(1), lms);
    assert!(c.compose(FrameIndex(1), &frame, Some(&nan)).degraded);
}

#[test]
fn hip_trail_is_recorded_in_upright_space() {
    let frame = FrameRGBA::solid(raw(), [0, 0, 0, 255]);
    let mut lms = nose_only(0.25, 0.5);
    lms[LEFT_HIP] = Landmark::new(0.25, 0.5, 0.0, 0.9);
    lms[RIGHT_HIP] = Landmark::new(0.25, 0.5, 0.0, 0.9);
    let pose = PoseFrame::detected(FrameIndex(0), lms);

    for strategy in [
        RotationStrategy::CompensateLandmarks,
        RotationStrategy::PostRotateOutput,
    ] {
        let mut c = FrameCompositor::new(&opts(strategy), Rotation::Deg90, raw(), fps());
        c.compose(FrameIndex(0), &frame, Some(&pose));
        let anchor = c.tracer().unwrap().current_anchor().unwrap();
        assert_eq!((anchor.x, anchor.y), (10.0, 10.0), "{strategy:?}");
    }

    let mut no_trail = opts(RotationStrategy::CompensateLandmarks);
    no_trail.trail.enabled = false;
    let c = FrameCompositor::new(&no_trail, Rotation::Deg90, raw(), fps());
    assert!(c.tracer().is_none());
}

#[test]
fn hip_anchor_agrees_across_strategies_for_fractional_and_edge_hips() {
    let frame = FrameRGBA::solid(raw(), [0, 0, 0, 255]);
    // Raw pixel positions on a 40x20 frame; the first sits on row 0.
    for (hx, hy) in [(10.6, 0.4), (3.2, 7.9), (39.5, 19.5), (0.5, 0.5)] {
        let mut lms = nose_only(0.25, 0.5);
        lms[LEFT_HIP] = Landmark::new(hx / 40.0, hy / 20.0, 0.0, 0.9);
        lms[RIGHT_HIP] = Landmark::new(hx / 40.0, hy / 20.0, 0.0, 0.9);
        let pose = PoseFrame::detected(FrameIndex(0), lms);

        for rotation in Rotation::ALL {
            let upright = raw().rotated(rotation);
            let mut anchors = Vec::new();
            for strategy in [
                RotationStrategy::CompensateLandmarks,
                RotationStrategy::PostRotateOutput,
            ] {
                let mut c = FrameCompositor::new(&opts(strategy), rotation, raw(), fps());
                c.compose(FrameIndex(0), &frame, Some(&pose));
                let a = c.tracer().unwrap().current_anchor().unwrap();
                assert!(
                    a.x >= 0.0
                        && a.y >= 0.0
                        && a.x < f64::from(upright.width)
                        && a.y < f64::from(upright.height),
                    "{strategy:?} {rotation} ({hx}, {hy}) -> ({}, {})",
                    a.x,
                    a.y
                );
                anchors.push((a.x, a.y));
            }
            assert_eq!(anchors[0], anchors[1], "{rotation} ({hx}, {hy})");
            if (hx, hy, rotation) == (10.6, 0.4, Rotation::Deg90) {
                assert_eq!(anchors[0], (19.0, 10.0));
            }
        }
    }
}

fn clip(n: u64) -> InMemoryFrameSource {
    let frames = (0..n)
        .map(|i| FrameRGBA::solid(raw(), [i as u8, 0, 0, 255]))
        .collect();
    InMemoryFrameSource::new(raw(), frames).unwrap()
}

#[test]
fn session_streams_every_frame_and_closes() {
    let mut source = clip(6);
    let mut sink = InMemorySink::new();
    let poses = vec![
        PoseFrame::detected(FrameIndex(1), nose_only(0.5, 0.5)),
        PoseFrame::detected(FrameIndex(3), vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 2]),
        PoseFrame::detected(FrameIndex(99), nose_only(0.5, 0.5)),
    ];
    let mut session = OverlaySession::new(OverlayOpts::default());
    let report = session
        .run(&mut source, &mut sink, &poses, fps(), Rotation::Deg180)
        .unwrap();

    assert_eq!(report.frames_written, 6);
    assert_eq!(report.frames_annotated, 1);
    assert_eq!(report.frames_degraded, 1);
    assert_eq!(report.state, SessionState::Closed);
    assert_eq!(report.properties.rotation, Rotation::Deg180);
    assert_eq!(session.state(), SessionState::Closed);
    assert!(source.is_closed());
    assert!(sink.is_ended());
    assert_eq!(sink.config().unwrap().fps, fps());
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);

    let again = session.run(&mut clip(1), &mut InMemorySink::new(), &poses, fps(), Rotation::Deg0);
    assert!(matches!(again.unwrap_err(), OverlayError::Validation(_)));
}

#[test]
fn empty_source_fails_and_aborts() {
    let mut source = clip(0);
    let mut sink = InMemorySink::new();
    let err = OverlaySession::new(OverlayOpts::default())
        .run(&mut source, &mut sink, &[], fps(), Rotation::Deg0)
        .unwrap_err();
    assert!(matches!(err, OverlayError::ResourceUnavailable(_)));
    assert!(sink.is_aborted());
    assert!(source.is_closed());
}

struct FailingSink {
    accepted: u64,
    fail_at: u64,
    aborted: bool,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> OverlayResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> OverlayResult<()> {
        if idx.0 == self.fail_at {
            return Err(OverlayError::resource("disk full"));
        }
        self.accepted += 1;
        Ok(())
    }

    fn end(&mut self) -> OverlayResult<()> {
        panic!("end must not be called after a failure");
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn sink_failure_aborts_and_releases_source() {
    let mut source = clip(10);
    let mut sink = FailingSink {
        accepted: 0,
        fail_at: 4,
        aborted: false,
    };
    let mut session = OverlaySession::new(OverlayOpts::default());
    let err = session
        .run(&mut source, &mut sink, &[], fps(), Rotation::Deg0)
        .unwrap_err();
    assert!(matches!(err, OverlayError::ResourceUnavailable(_)));
    assert_eq!(sink.accepted, 4);
    assert!(sink.aborted);
    assert!(source.is_closed());
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn render_overlay_video_reports_missing_inputs() {
    use crate::pose::document::PoseDocument;
    use crate::pose::source::InMemoryLandmarkSource;

    let paths = AnalysisPaths::new("/nonexistent/crux/uploads", "/nonexistent/crux/outputs");
    let mut store = InMemoryLandmarkSource::new();

    let err = render_overlay_video("abc12345", &paths, &store, &OverlayOpts::default())
        .unwrap_err();
    assert!(matches!(err, OverlayError::NotFound(_)));

    store.insert("abc12345", PoseDocument::default());
    let err = render_overlay_video("abc12345", &paths, &store, &OverlayOpts::default())
        .unwrap_err();
    assert!(matches!(err, OverlayError::NotFound(_)));

    store.insert(
        "abc12345",
        PoseDocument {
            frames: vec![PoseFrame::undetected(FrameIndex(0))],
            ..PoseDocument::default()
        },
    );
    let err = render_overlay_video("abc12345", &paths, &store, &OverlayOpts::default())
        .unwrap_err();
    assert!(matches!(err, OverlayError::NotFound(_)));
}
