//! Output encoding sinks.

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
