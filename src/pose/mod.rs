//! Landmark data: the per-frame detector output and how it reaches the pipeline.

/// Landmark-data document model and frame-index lookup.
pub mod document;
/// Landmark and PoseFrame types.
pub mod landmark;
/// Explicit landmark-source handles.
pub mod source;
