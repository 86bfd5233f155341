use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{OverlayError, OverlayResult};

/// Metadata about a source video file as stored (before any rotation).
#[derive(Clone, Debug, PartialEq)]
pub struct SourceInfo {
    /// Path used for probing and decoding.
    pub source_path: PathBuf,
    /// Raw decoded frame size.
    pub raw_size: FrameSize,
    /// Stream frame rate.
    pub fps: Fps,
    /// Frame count when the container reports one.
    pub frame_count: Option<u64>,
    /// Clockwise display rotation from container metadata, unnormalized.
    pub metadata_rotation: Option<f64>,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    side_data_type: Option<String>,
    rotation: Option<f64>,
}

#[derive(serde::Deserialize, Default)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    #[serde(default)]
    tags: ProbeTags,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// Probe source video metadata through `ffprobe`.
pub fn probe_video(source_path: &Path) -> OverlayResult<SourceInfo> {
    if !source_path.is_file() {
        return Err(OverlayError::not_found(format!(
            "source video '{}'",
            source_path.display()
        )));
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| OverlayError::resource(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(OverlayError::resource(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(&out.stdout, source_path)
}

/// Parse `ffprobe -print_format json -show_streams` output.
pub fn parse_probe_json(bytes: &[u8], source_path: &Path) -> OverlayResult<SourceInfo> {
    let parsed: ProbeOut = serde_json::from_slice(bytes)
        .map_err(|e| OverlayError::resource(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            OverlayError::resource(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video
        .width
        .ok_or_else(|| OverlayError::resource("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| OverlayError::resource("missing video height from ffprobe"))?;

    // `r_frame_rate` can be `0/0` for some containers; fall back to the average rate.
    let fps = [video.r_frame_rate.as_deref(), video.avg_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|r| Fps::parse_ratio(r).ok())
        .ok_or_else(|| OverlayError::resource("missing or zero frame rate from ffprobe"))?;

    let frame_count = video.nb_frames.as_deref().and_then(|n| n.parse().ok());

    Ok(SourceInfo {
        source_path: source_path.to_path_buf(),
        raw_size: FrameSize::new(width, height),
        fps,
        frame_count,
        metadata_rotation: metadata_rotation_cw(video),
    })
}

fn metadata_rotation_cw(stream: &ProbeStream) -> Option<f64> {
    // The legacy `rotate` tag is clockwise.
    if let Some(tag) = stream.tags.rotate.as_deref()
        && let Ok(v) = tag.trim().parse::<f64>()
    {
        return Some(v);
    }
    // Display-matrix rotation is counter-clockwise.
    stream
        .side_data_list
        .iter()
        .filter(|sd| {
            sd.side_data_type
                .as_deref()
                .is_none_or(|t| t.eq_ignore_ascii_case("display matrix"))
        })
        .find_map(|sd| sd.rotation)
        .map(|r| -r)
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn media_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
