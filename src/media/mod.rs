//! Source-video access through the system `ffprobe`/`ffmpeg` binaries.

/// Frame sources (ffmpeg subprocess and in-memory).
pub mod decode;
/// Raw RGBA8 frames and rotation.
pub mod frame;
/// `ffprobe` metadata.
pub mod probe;
