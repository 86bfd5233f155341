//! Rotation needed to bring raw frames upright.

/// Content heuristics.
pub mod heuristic;
/// Rotation metadata normalization.
pub mod metadata;
/// Metadata-then-heuristics resolver.
pub mod resolver;
