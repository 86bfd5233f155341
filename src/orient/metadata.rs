use crate::foundation::core::Rotation;

/// Normalize a clockwise metadata angle to one of the four canonical rotations.
///
/// Angles are reduced modulo 360 first, so `-90` becomes `270`. Anything that is not a
/// multiple of 90 (or is not finite) is reported and treated as no rotation.
pub fn normalize_metadata_rotation(degrees: f64) -> Rotation {
    if !degrees.is_finite() {
        tracing::warn!("unexpected rotation angle {degrees}, defaulting to 0");
        return Rotation::Deg0;
    }
    let reduced = degrees.rem_euclid(360.0);
    let rounded = reduced.round();
    if (reduced - rounded).abs() > 1e-6 {
        tracing::warn!("unexpected rotation angle {degrees}, defaulting to 0");
        return Rotation::Deg0;
    }
    match Rotation::from_degrees((rounded as i64) % 360) {
        Some(r) => r,
        None => {
            tracing::warn!("unexpected rotation angle {degrees}, defaulting to 0");
            Rotation::Deg0
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/orient/metadata.rs"]
mod tests;
