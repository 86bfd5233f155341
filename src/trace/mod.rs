//! Motion trail history.

/// Hip-anchored motion tracer.
pub mod motion;
