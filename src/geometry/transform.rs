//! Normalized landmark space to pixel space, and rotation compensation between raw and
//! upright frames.
//!
//! Compensation maps a continuous pixel coordinate of the raw frame (size `W x H`) into the
//! frame rotated clockwise by the given angle:
//!
//! | rotation | `(x, y)` maps to |
//! |----------|------------------|
//! | 90       | `(H - y, x)`     |
//! | 180      | `(W - x, H - y)` |
//! | 270      | `(y, W - x)`     |

use crate::foundation::core::{Affine, FrameSize, Point, Rotation};
use crate::pose::landmark::Landmark;

/// Integer pixel inside a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pixel {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Pixel {
    /// Pixel as a continuous point at its top-left corner.
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }

    /// Center of the pixel.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.x) + 0.5, f64::from(self.y) + 0.5)
    }
}

/// Continuous pixel position of a normalized landmark.
pub fn to_point(lm: &Landmark, size: FrameSize) -> Point {
    Point::new(lm.x * f64::from(size.width), lm.y * f64::from(size.height))
}

/// Integer pixel of a normalized landmark, or `None` when it falls outside the frame.
pub fn to_pixel(lm: &Landmark, size: FrameSize) -> Option<Pixel> {
    point_to_pixel(to_point(lm, size), size)
}

/// Floor a continuous point to a pixel, or `None` when outside `[0, W) x [0, H)`.
pub fn point_to_pixel(p: Point, size: FrameSize) -> Option<Pixel> {
    if !p.x.is_finite() || !p.y.is_finite() {
        return None;
    }
    let (x, y) = (p.x.floor() as i64, p.y.floor() as i64);
    if !size.contains(x, y) {
        return None;
    }
    Some(Pixel {
        x: x as u32,
        y: y as u32,
    })
}

/// Affine remap from raw-frame pixel space (size `pre`) into the frame rotated by `rotation`.
pub fn compensation_affine(rotation: Rotation, pre: FrameSize) -> Affine {
    let w = f64::from(pre.width);
    let h = f64::from(pre.height);
    // kurbo coefficients [a, b, c, d, e, f]: (x, y) -> (a*x + c*y + e, b*x + d*y + f)
    match rotation {
        Rotation::Deg0 => Affine::IDENTITY,
        Rotation::Deg90 => Affine::new([0.0, 1.0, -1.0, 0.0, h, 0.0]),
        Rotation::Deg180 => Affine::new([-1.0, 0.0, 0.0, -1.0, w, h]),
        Rotation::Deg270 => Affine::new([0.0, -1.0, 1.0, 0.0, 0.0, w]),
    }
}

/// Map a raw-frame point into rotated space.
pub fn compensate_point(p: Point, rotation: Rotation, pre: FrameSize) -> Point {
    compensation_affine(rotation, pre) * p
}

/// Map a rotated-space point back into raw-frame space.
pub fn uncompensate_point(p: Point, rotation: Rotation, pre: FrameSize) -> Point {
    compensation_affine(rotation, pre).inverse() * p
}

/// Re-normalize landmarks computed against the raw frame so they address the rotated frame.
///
/// `z` and `visibility` are carried over unchanged.
pub fn reproject_landmarks(
    landmarks: &[Landmark],
    rotation: Rotation,
    pre: FrameSize,
) -> Vec<Landmark> {
    if rotation == Rotation::Deg0 {
        return landmarks.to_vec();
    }
    let post = pre.rotated(rotation);
    let affine = compensation_affine(rotation, pre);
    let pw = f64::from(post.width);
    let ph = f64::from(post.height);
    landmarks
        .iter()
        .map(|lm| {
            let p = affine * to_point(lm, pre);
            Landmark {
                x: p.x / pw,
                y: p.y / ph,
                ..*lm
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;
