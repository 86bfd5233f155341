//! The end-to-end overlay pass.
//!
//! A run moves through [`SessionState::Init`] (sink opened with the upright size and the
//! source frame rate), [`SessionState::Streaming`] (frames decoded in order, matched to
//! landmark records by frame index, annotated or passed through, written),
//! [`SessionState::Drained`] and finally [`SessionState::Closed`]. Decoder and encoder are
//! released on every exit path; a failed run aborts the sink, which discards partial output.

use std::path::PathBuf;

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameSize, Rotation, VideoProperties};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::geometry::transform::reproject_landmarks;
use crate::media::decode::{FfmpegFrameSource, FrameSource};
use crate::media::frame::FrameRGBA;
use crate::media::probe::probe_video;
use crate::orient::resolver::OrientationResolver;
use crate::pose::document::PoseIndex;
use crate::pose::landmark::{Landmark, PoseFrame};
use crate::pose::source::LandmarkSource;
use crate::render::raster::OverlayCanvas;
use crate::render::skeleton::SkeletonRenderer;
use crate::render::style::TrailStyle;
use crate::render::trail::draw_trail;
use crate::session::config::{OverlayOpts, RotationStrategy};
use crate::session::locate::{AnalysisPaths, validate_analysis_id};
use crate::trace::motion::{MotionTracer, hip_midpoint};

/// Lifecycle of an [`OverlaySession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing opened yet.
    Init,
    /// Frames are flowing.
    Streaming,
    /// The source reported end of stream.
    Drained,
    /// Source and sink released.
    Closed,
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OverlayReport {
    /// Output file, when the run wrote one.
    pub output_path: Option<PathBuf>,
    /// Upright output properties.
    pub properties: VideoProperties,
    /// Frames pushed to the sink.
    pub frames_written: u64,
    /// Frames that received a skeleton.
    pub frames_annotated: u64,
    /// Frames written unannotated because their landmarks were invalid or failed to render.
    pub frames_degraded: u64,
    /// State the session ended in.
    pub state: SessionState,
}

/// One output frame and how it was produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedFrame {
    /// Upright frame ready for the sink.
    pub frame: FrameRGBA,
    /// A skeleton was drawn.
    pub annotated: bool,
    /// Landmarks were present but unusable.
    pub degraded: bool,
}

/// Per-frame annotation under one rotation and strategy.
pub struct FrameCompositor {
    renderer: SkeletonRenderer,
    strategy: RotationStrategy,
    rotation: Rotation,
    raw: FrameSize,
    tracer: Option<MotionTracer>,
    trail_style: TrailStyle,
}

impl FrameCompositor {
    /// Compositor for raw frames of `raw` size, rotated by `rotation`.
    pub fn new(opts: &OverlayOpts, rotation: Rotation, raw: FrameSize, fps: Fps) -> Self {
        let tracer = opts
            .trail
            .enabled
            .then(|| MotionTracer::new(fps, opts.trail.persistence_secs));
        Self {
            renderer: SkeletonRenderer::new(opts.style, opts.policy),
            strategy: opts.strategy,
            rotation,
            raw,
            tracer,
            trail_style: opts.trail.style,
        }
    }

    /// Upright output size.
    pub fn output_size(&self) -> FrameSize {
        self.raw.rotated(self.rotation)
    }

    /// Motion tracer, when trails are enabled.
    pub fn tracer(&self) -> Option<&MotionTracer> {
        self.tracer.as_ref()
    }

    /// Produce the upright output for raw frame `idx`.
    ///
    /// Frames without a matching detected pose pass through (rotated only). Invalid landmark
    /// sets and render failures degrade to pass-through with a warning.
    pub fn compose(
        &mut self,
        idx: FrameIndex,
        raw_frame: &FrameRGBA,
        pose: Option<&PoseFrame>,
    ) -> ComposedFrame {
        let Some(pose) = pose.filter(|p| p.has_drawable_pose()) else {
            return self.pass_through(raw_frame, false);
        };
        if let Err(msg) = pose.validate_landmarks() {
            tracing::warn!("skipping overlay on frame {}: {msg}", idx.0);
            return self.pass_through(raw_frame, true);
        }
        match self.annotate(idx, raw_frame, &pose.landmarks) {
            Ok(frame) => ComposedFrame {
                frame,
                annotated: true,
                degraded: false,
            },
            Err(e) => {
                tracing::warn!("overlay render failed on frame {}: {e}", idx.0);
                self.pass_through(raw_frame, true)
            }
        }
    }

    fn pass_through(&self, raw_frame: &FrameRGBA, degraded: bool) -> ComposedFrame {
        ComposedFrame {
            frame: raw_frame.rotated(self.rotation),
            annotated: false,
            degraded,
        }
    }

    fn annotate(
        &mut self,
        idx: FrameIndex,
        raw_frame: &FrameRGBA,
        landmarks: &[Landmark],
    ) -> OverlayResult<FrameRGBA> {
        let (base, draw_landmarks) = match self.strategy {
            RotationStrategy::PreRotateFrame => {
                (raw_frame.rotated(self.rotation), landmarks.to_vec())
            }
            RotationStrategy::CompensateLandmarks => (
                raw_frame.rotated(self.rotation),
                reproject_landmarks(landmarks, self.rotation, self.raw),
            ),
            RotationStrategy::PostRotateOutput => (raw_frame.clone(), landmarks.to_vec()),
        };
        let post_rotate = self.strategy == RotationStrategy::PostRotateOutput;

        let mut canvas = OverlayCanvas::new(base.size())?;
        self.renderer.draw(&mut canvas, &draw_landmarks);

        if let Some(tracer) = self.tracer.as_mut() {
            // Trail points live in upright output space; map before flooring to a pixel.
            let anchor = if post_rotate {
                hip_midpoint(
                    &reproject_landmarks(&draw_landmarks, self.rotation, self.raw),
                    self.raw.rotated(self.rotation),
                )
            } else {
                hip_midpoint(&draw_landmarks, base.size())
            };
            match anchor {
                Some(p) => tracer.add_position(p.x, p.y, idx),
                None => tracing::trace!(frame = idx.0, "no hip anchor"),
            }
        }

        if !post_rotate {
            if let Some(tracer) = self.tracer.as_ref() {
                draw_trail(&mut canvas, tracer, idx, &self.trail_style);
            }
            return canvas.composite_onto(&base);
        }

        let upright = canvas.composite_onto(&base)?.rotated(self.rotation);
        match self.tracer.as_ref() {
            Some(tracer) => {
                let mut trail_canvas = OverlayCanvas::new(upright.size())?;
                draw_trail(&mut trail_canvas, tracer, idx, &self.trail_style);
                trail_canvas.composite_onto(&upright)
            }
            None => Ok(upright),
        }
    }
}

/// Drives one overlay run from a [`FrameSource`] into a [`FrameSink`].
pub struct OverlaySession {
    opts: OverlayOpts,
    state: SessionState,
}

impl OverlaySession {
    /// Create a session.
    pub fn new(opts: OverlayOpts) -> Self {
        Self {
            opts,
            state: SessionState::Init,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the pass. `frames` is the landmark sequence, `fps` the source frame rate and
    /// `rotation` the resolved upright rotation.
    pub fn run<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        frames: &[PoseFrame],
        fps: Fps,
        rotation: Rotation,
    ) -> OverlayResult<OverlayReport>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        if self.state != SessionState::Init {
            return Err(OverlayError::validation(
                "an overlay session can only run once",
            ));
        }
        let raw = source.frame_size();
        let properties = VideoProperties::from_raw(fps, raw, rotation);
        let mut report = OverlayReport {
            output_path: None,
            properties,
            frames_written: 0,
            frames_annotated: 0,
            frames_degraded: 0,
            state: SessionState::Init,
        };

        let streamed = self.stream(source, sink, frames, &mut report);
        let closed = source.close();
        let result = streamed.and_then(|()| {
            closed?;
            sink.end()
        });

        self.state = SessionState::Closed;
        report.state = SessionState::Closed;
        match result {
            Ok(()) => {
                tracing::info!(
                    "video processing completed: {} frames processed, {} frames with overlay",
                    report.frames_written,
                    report.frames_annotated
                );
                Ok(report)
            }
            Err(e) => {
                sink.abort();
                Err(e)
            }
        }
    }

    fn stream<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        frames: &[PoseFrame],
        report: &mut OverlayReport,
    ) -> OverlayResult<()>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        let props = report.properties;
        sink.begin(SinkConfig {
            width: props.width,
            height: props.height,
            fps: props.fps,
        })?;
        self.state = SessionState::Streaming;
        report.state = self.state;
        tracing::info!(
            "starting frame processing for {} pose frames ({}x{} @ {:.3} fps, rotation {})",
            frames.len(),
            props.width,
            props.height,
            props.fps.as_f64(),
            props.rotation
        );

        let index = PoseIndex::new(frames);
        let mut compositor =
            FrameCompositor::new(&self.opts, props.rotation, source.frame_size(), props.fps);
        let mut next = 0u64;
        while let Some(raw_frame) = source.next_frame()? {
            let idx = FrameIndex(next);
            let composed = compositor.compose(idx, &raw_frame, index.get(idx));
            sink.push_frame(idx, &composed.frame)?;

            report.frames_written += 1;
            report.frames_annotated += u64::from(composed.annotated);
            report.frames_degraded += u64::from(composed.degraded);
            next += 1;

            let interval = self.opts.progress_interval;
            if interval > 0 && next % interval == 0 {
                tracing::info!(
                    "processed frame {next}, overlay applied to {} frames",
                    report.frames_annotated
                );
            }
        }
        self.state = SessionState::Drained;
        report.state = self.state;

        if report.frames_written == 0 {
            return Err(OverlayError::resource("source video produced no frames"));
        }
        Ok(())
    }
}

/// Render the overlay video for `analysis_id`: locate inputs, resolve orientation, stream
/// every frame through `ffmpeg`, and write `overlay_{stem}_{id8}.mp4`.
#[tracing::instrument(skip(paths, landmarks, opts))]
pub fn render_overlay_video(
    analysis_id: &str,
    paths: &AnalysisPaths,
    landmarks: &dyn LandmarkSource,
    opts: &OverlayOpts,
) -> OverlayResult<OverlayReport> {
    opts.validate()?;
    validate_analysis_id(analysis_id)?;
    tracing::info!("starting overlay video generation");

    let doc = landmarks.load(analysis_id)?;
    if doc.frames.is_empty() {
        return Err(OverlayError::not_found(format!(
            "no frame data in pose data for analysis {analysis_id}"
        )));
    }

    let source_path = paths.find_source_video(analysis_id)?;
    let info = probe_video(&source_path)?;
    let orientation = OrientationResolver::new(opts.orientation.clone()).resolve(&info);
    let output_path = paths.output_path(analysis_id, &source_path);

    let mut source = FfmpegFrameSource::open(&info)?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: output_path.clone(),
        overwrite: opts.overwrite,
        crop_to_even: opts.crop_to_even,
    });

    let mut session = OverlaySession::new(opts.clone());
    let result = session.run(
        &mut source,
        &mut sink,
        &doc.frames,
        info.fps,
        orientation.rotation,
    );
    match result {
        Ok(mut report) => {
            tracing::info!("overlay video generation completed: {}", output_path.display());
            report.output_path = Some(output_path);
            Ok(report)
        }
        Err(e) => {
            tracing::error!("overlay video generation failed: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/compositor.rs"]
mod tests;
