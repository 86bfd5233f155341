use std::collections::HashMap;
use std::path::Path;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::pose::landmark::PoseFrame;

/// Source-video metadata recorded by the detector.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    /// Frame rate as reported by the detector's decoder.
    pub fps: f64,
    /// Total frame count of the source.
    pub total_frames: u64,
    /// Raw width in pixels.
    pub width: u32,
    /// Raw height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration: f64,
    /// Sampling stride: every `sample_rate`-th source frame was analyzed.
    pub sample_rate: u32,
}

/// Aggregate detector statistics. Every field is optional in the document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProcessingStats {
    /// Frames analyzed by the detector.
    pub frames_processed: u64,
    /// Frames with a detected pose.
    pub poses_detected: u64,
    /// `poses_detected / frames_processed`.
    pub detection_rate: f64,
    /// Mean `overall_confidence` of detected frames.
    pub average_confidence: f64,
}

/// Landmark-data document for one analysis.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoseDocument {
    /// Analysis identifier, when recorded.
    #[serde(default)]
    pub analysis_id: Option<String>,
    /// Source-video metadata.
    #[serde(default)]
    pub video_info: VideoInfo,
    /// Aggregate detector statistics.
    #[serde(default, alias = "processing_info")]
    pub processing_stats: ProcessingStats,
    /// Per-frame records in detector order.
    pub frames: Vec<PoseFrame>,
}

impl PoseDocument {
    /// Read and parse a document. A missing file is [`OverlayError::NotFound`]; unreadable
    /// JSON is [`OverlayError::Malformed`].
    pub fn from_path(path: &Path) -> OverlayResult<Self> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OverlayError::not_found(format!(
                    "pose data file '{}'",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to read pose data '{}'", path.display()))
                    .into());
            }
        };
        Self::from_json_slice(&bytes).map_err(|e| match e {
            OverlayError::Malformed(msg) => {
                OverlayError::malformed(format!("'{}': {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse a document from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> OverlayResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| OverlayError::malformed(format!("pose data json parse failed: {e}")))
    }
}

/// Frame-index lookup over a borrowed PoseFrame sequence.
///
/// Duplicate indices resolve to the first record, matching a forward linear scan.
#[derive(Debug)]
pub struct PoseIndex<'a> {
    by_frame: HashMap<FrameIndex, &'a PoseFrame>,
}

impl<'a> PoseIndex<'a> {
    /// Index `frames` by `frame_index`.
    pub fn new(frames: &'a [PoseFrame]) -> Self {
        let mut by_frame = HashMap::with_capacity(frames.len());
        for f in frames {
            by_frame.entry(f.frame_index).or_insert(f);
        }
        Self { by_frame }
    }

    /// Record for `idx`, if the detector produced one.
    pub fn get(&self, idx: FrameIndex) -> Option<&'a PoseFrame> {
        self.by_frame.get(&idx).copied()
    }

    /// Number of distinct indexed frames.
    pub fn len(&self) -> usize {
        self.by_frame.len()
    }

    /// Return `true` when no frames are indexed.
    pub fn is_empty(&self) -> bool {
        self.by_frame.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/document.rs"]
mod tests;
