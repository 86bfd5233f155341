//! Overlay rasterization: skeletons and motion trails.

/// `vello_cpu` canvas composited over frames.
pub mod raster;
/// Skeleton planning and drawing.
pub mod skeleton;
/// Colors, styles and confidence policy.
pub mod style;
/// Motion trail drawing.
pub mod trail;
