//! crux-overlay draws pose skeletons and a hip motion trail onto climbing videos.
//!
//! Landmark detections are produced elsewhere and arrive as a JSON document of per-frame
//! records. A run:
//!
//! - Resolves the rotation that turns the raw video upright (metadata, then content heuristics)
//! - Streams raw frames from `ffmpeg`, matches each to its landmark record by frame index
//! - Draws the skeleton and trail in upright space under one [`RotationStrategy`]
//! - Encodes the result to H.264 MP4 at the source frame rate
//!
//! Entry points: [`render_overlay_video`] for a whole analysis, [`OverlaySession`] for
//! arbitrary [`FrameSource`]/[`FrameSink`] pairs, and [`OverlayJob`] for background runs.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Output encoding sinks.
pub mod encode;
/// Coordinate transforms.
pub mod geometry;
/// Source-video probing and decoding.
pub mod media;
/// Orientation resolution.
pub mod orient;
/// Landmark data model and sources.
pub mod pose;
/// Skeleton and trail rasterization.
pub mod render;
/// Overlay runs.
pub mod session;
/// Motion trail history.
pub mod trace;

pub use crate::foundation::core::{
    Affine, Fps, FrameIndex, FrameSize, Point, Rotation, VideoProperties,
};
pub use crate::foundation::error::{OverlayError, OverlayResult};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::media::decode::{FfmpegFrameSource, FrameSource, InMemoryFrameSource};
pub use crate::media::frame::FrameRGBA;
pub use crate::media::probe::{SourceInfo, media_tools_available, probe_video};
pub use crate::orient::heuristic::HeuristicKind;
pub use crate::orient::resolver::{Orientation, OrientationOpts, OrientationResolver};
pub use crate::pose::document::{PoseDocument, PoseIndex};
pub use crate::pose::landmark::{Landmark, PoseFrame, QualityFlags};
pub use crate::pose::source::{InMemoryLandmarkSource, JsonLandmarkStore, LandmarkSource};
pub use crate::render::skeleton::SkeletonRenderer;
pub use crate::render::style::{RenderMode, RenderPolicy, RenderStyle, Rgb8, TrailStyle};
pub use crate::session::compositor::{
    FrameCompositor, OverlayReport, OverlaySession, SessionState, render_overlay_video,
};
pub use crate::session::config::{OverlayOpts, RotationStrategy, TrailOpts};
pub use crate::session::job::OverlayJob;
pub use crate::session::locate::AnalysisPaths;
pub use crate::session::preview::render_previews;
pub use crate::trace::motion::{MotionTracer, TrailPoint};
