use super::*;

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn to_pixel_floors_and_bounds_checks() {
    let size = FrameSize::new(100, 50);
    let lm = Landmark::new(0.5, 0.5, 0.0, 1.0);
    assert_eq!(to_pixel(&lm, size), Some(Pixel { x: 50, y: 25 }));

    let edge = Landmark::new(0.999, 0.999, 0.0, 1.0);
    assert_eq!(to_pixel(&edge, size), Some(Pixel { x: 99, y: 49 }));

    assert_eq!(to_pixel(&Landmark::new(1.0, 0.5, 0.0, 1.0), size), None);
    assert_eq!(to_pixel(&Landmark::new(-0.001, 0.5, 0.0, 1.0), size), None);
    assert_eq!(to_pixel(&Landmark::new(0.5, 1.2, 0.0, 1.0), size), None);
    assert_eq!(to_pixel(&Landmark::new(f64::NAN, 0.5, 0.0, 1.0), size), None);
}

#[test]
fn compensation_matches_documented_remaps() {
    let pre = FrameSize::new(40, 30);
    let p = Point::new(10.0, 5.0);
    assert!(approx(compensate_point(p, Rotation::Deg0, pre), p));
    assert!(approx(
        compensate_point(p, Rotation::Deg90, pre),
        Point::new(30.0 - 5.0, 10.0)
    ));
    assert!(approx(
        compensate_point(p, Rotation::Deg180, pre),
        Point::new(40.0 - 10.0, 30.0 - 5.0)
    ));
    assert!(approx(
        compensate_point(p, Rotation::Deg270, pre),
        Point::new(5.0, 40.0 - 10.0)
    ));
}

#[test]
fn compensation_then_inverse_is_identity() {
    for pre in [FrameSize::new(1920, 1080), FrameSize::new(7, 13)] {
        for rotation in Rotation::ALL {
            for ix in 0..8 {
                for iy in 0..8 {
                    let p = Point::new(
                        f64::from(pre.width) * ix as f64 / 8.0,
                        f64::from(pre.height) * iy as f64 / 8.0,
                    );
                    let back =
                        uncompensate_point(compensate_point(p, rotation, pre), rotation, pre);
                    assert!(approx(p, back), "{rotation} {p:?} -> {back:?}");
                }
            }
        }
    }
}

#[test]
fn compensated_points_stay_inside_rotated_frame() {
    let pre = FrameSize::new(64, 36);
    for rotation in Rotation::ALL {
        let post = pre.rotated(rotation);
        for (x, y) in [(0.5, 0.5), (63.5, 0.5), (0.5, 35.5), (63.5, 35.5)] {
            let q = compensate_point(Point::new(x, y), rotation, pre);
            assert!(point_to_pixel(q, post).is_some(), "{rotation} ({x},{y}) -> {q:?}");
        }
    }
}

#[test]
fn reprojection_renormalizes_against_rotated_size() {
    let pre = FrameSize::new(200, 100);
    let lm = Landmark::new(0.25, 0.2, -0.3, 0.7);
    let out = reproject_landmarks(&[lm], Rotation::Deg90, pre);
    // raw pixel (50, 20) -> (100 - 20, 50) in a 100x200 frame
    assert!((out[0].x - 0.8).abs() < 1e-9);
    assert!((out[0].y - 0.25).abs() < 1e-9);
    assert_eq!(out[0].z, -0.3);
    assert_eq!(out[0].visibility, 0.7);

    assert_eq!(reproject_landmarks(&[lm], Rotation::Deg0, pre), vec![lm]);
}
