use std::path::PathBuf;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::core::{Fps, FrameIndex, Rotation};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::media::decode::{FfmpegFrameSource, FrameSource};
use crate::media::frame::FrameRGBA;
use crate::media::probe::probe_video;
use crate::orient::resolver::OrientationResolver;
use crate::pose::landmark::PoseFrame;
use crate::pose::source::LandmarkSource;
use crate::session::compositor::FrameCompositor;
use crate::session::config::OverlayOpts;
use crate::session::locate::{AnalysisPaths, validate_analysis_id};

/// Evenly spaced records: positions `i * len / count` for `i` in `0..count`, deduplicated.
pub fn preview_targets(frames: &[PoseFrame], count: usize) -> Vec<&PoseFrame> {
    if frames.is_empty() || count == 0 {
        return Vec::new();
    }
    let mut picked: Vec<&PoseFrame> = Vec::with_capacity(count);
    for i in 0..count {
        let f = &frames[i * frames.len() / count];
        if !picked.iter().any(|p| p.frame_index == f.frame_index) {
            picked.push(f);
        }
    }
    picked.sort_by_key(|f| f.frame_index);
    picked
}

/// Decode `source` up to the last target and annotate every target with a detected pose.
///
/// Targets without a detected pose are skipped. Trails are never drawn on previews.
pub fn annotate_targets<S>(
    source: &mut S,
    targets: &[&PoseFrame],
    opts: &OverlayOpts,
    fps: Fps,
    rotation: Rotation,
) -> OverlayResult<Vec<(FrameIndex, FrameRGBA)>>
where
    S: FrameSource + ?Sized,
{
    let mut single = opts.clone();
    single.trail.enabled = false;
    let mut compositor = FrameCompositor::new(&single, rotation, source.frame_size(), fps);

    let mut out = Vec::new();
    let Some(last) = targets.iter().map(|t| t.frame_index).max() else {
        return Ok(out);
    };
    let mut idx = 0u64;
    while idx <= last.0 {
        let Some(raw) = source.next_frame()? else {
            tracing::warn!("video ended at frame {idx} before preview frame {}", last.0);
            break;
        };
        let here = FrameIndex(idx);
        if let Some(target) = targets.iter().find(|t| t.frame_index == here) {
            if target.pose_detected {
                let composed = compositor.compose(here, &raw, Some(*target));
                tracing::info!(
                    "frame {idx}: pose detected with confidence {:.3}",
                    target.overall_confidence
                );
                out.push((here, composed.frame));
            } else {
                tracing::info!("frame {idx}: no pose detected");
            }
        }
        idx += 1;
    }
    Ok(out)
}

/// Write `count` annotated sample frames of an analysis as PNG files.
#[tracing::instrument(skip(paths, landmarks, opts))]
pub fn render_previews(
    analysis_id: &str,
    paths: &AnalysisPaths,
    landmarks: &dyn LandmarkSource,
    opts: &OverlayOpts,
    count: usize,
) -> OverlayResult<Vec<PathBuf>> {
    opts.validate()?;
    validate_analysis_id(analysis_id)?;
    let doc = landmarks.load(analysis_id)?;
    if doc.frames.is_empty() {
        return Err(OverlayError::not_found(format!(
            "no frame data in pose data for analysis {analysis_id}"
        )));
    }
    let targets = preview_targets(&doc.frames, count);
    tracing::info!(
        "previewing {} sample frames: {:?}",
        targets.len(),
        targets.iter().map(|t| t.frame_index.0).collect::<Vec<_>>()
    );

    let source_path = paths.find_source_video(analysis_id)?;
    let info = probe_video(&source_path)?;
    let rotation = OrientationResolver::new(opts.orientation.clone())
        .resolve(&info)
        .rotation;

    let mut source = FfmpegFrameSource::open(&info)?;
    let annotated = annotate_targets(&mut source, &targets, opts, info.fps, rotation);
    let closed = source.close();
    let annotated = annotated?;
    closed?;

    let mut written = Vec::with_capacity(annotated.len());
    for (idx, frame) in annotated {
        let path = paths.preview_path(analysis_id, idx);
        save_png(&path, &frame)?;
        tracing::info!("saved overlay preview: {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Save a frame as PNG, creating parent directories.
pub fn save_png(path: &std::path::Path, frame: &FrameRGBA) -> OverlayResult<()> {
    use anyhow::Context as _;
    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
