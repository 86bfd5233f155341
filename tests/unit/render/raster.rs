use super::*;

fn black(size: FrameSize) -> FrameRGBA {
    FrameRGBA::solid(size, [0, 0, 0, 255])
}

#[test]
fn disc_covers_its_center_only() {
    let size = FrameSize::new(32, 32);
    let mut canvas = OverlayCanvas::new(size).unwrap();
    canvas.disc(Point::new(16.0, 16.0), 4.0, Rgb8::RED, 1.0);
    let out = canvas.composite_onto(&black(size)).unwrap();
    assert_eq!(out.pixel(16, 16), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel(2, 2), Some([0, 0, 0, 255]));
}

#[test]
fn segment_paints_between_endpoints() {
    let size = FrameSize::new(40, 20);
    let mut canvas = OverlayCanvas::new(size).unwrap();
    canvas.segment(
        Point::new(5.0, 10.0),
        Point::new(35.0, 10.0),
        4.0,
        Rgb8::WHITE,
        1.0,
    );
    assert_eq!(canvas.shape_count(), 1);
    let out = canvas.composite_onto(&black(size)).unwrap();
    assert_eq!(out.pixel(20, 10), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(20, 2), Some([0, 0, 0, 255]));
}

#[test]
fn partial_opacity_blends_and_zero_opacity_skips() {
    let size = FrameSize::new(16, 16);
    let mut canvas = OverlayCanvas::new(size).unwrap();
    canvas.disc(Point::new(8.0, 8.0), 5.0, Rgb8::WHITE, 0.5);
    canvas.disc(Point::new(8.0, 8.0), 5.0, Rgb8::RED, 0.0);
    assert_eq!(canvas.shape_count(), 1);
    let out = canvas.composite_onto(&black(size)).unwrap();
    let px = out.pixel(8, 8).unwrap();
    assert!(px[0] > 100 && px[0] < 160, "got {px:?}");
    assert_eq!(px[3], 255);
}

#[test]
fn empty_canvas_returns_identical_copy() {
    let size = FrameSize::new(8, 8);
    let frame = FrameRGBA::solid(size, [9, 8, 7, 255]);
    let out = OverlayCanvas::new(size)
        .unwrap()
        .composite_onto(&frame)
        .unwrap();
    assert_eq!(out, frame);
}

#[test]
fn mismatched_frame_is_a_render_error() {
    let canvas = OverlayCanvas::new(FrameSize::new(8, 8)).unwrap();
    let err = canvas
        .composite_onto(&black(FrameSize::new(4, 4)))
        .unwrap_err();
    assert!(matches!(err, OverlayError::Render(_)));
    assert!(OverlayCanvas::new(FrameSize::new(70_000, 4)).is_err());
}
