/// Coordinate transforms between normalized, raw-pixel and rotated-pixel space.
pub mod transform;
