use crate::foundation::core::Rotation;
use crate::foundation::error::OverlayResult;
use crate::media::decode::{FfmpegFrameSource, FrameSource, take_frames};
use crate::media::frame::FrameRGBA;
use crate::media::probe::SourceInfo;
use crate::orient::heuristic::{Detection, HeuristicKind, detect};
use crate::orient::metadata::normalize_metadata_rotation;

/// Orientation detection options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OrientationOpts {
    /// Heuristics tried in order when metadata reports no rotation. Empty disables them.
    pub heuristics: Vec<HeuristicKind>,
    /// Leading frames sampled for content analysis.
    pub sample_frames: u32,
    /// Longest side of the downscaled analysis image.
    pub analysis_max_side: u32,
}

impl Default for OrientationOpts {
    fn default() -> Self {
        Self {
            heuristics: vec![HeuristicKind::PortraitPrior, HeuristicKind::EdgeBalance],
            sample_frames: 3,
            analysis_max_side: 320,
        }
    }
}

/// Where a resolved rotation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationOrigin {
    /// Container metadata.
    Metadata,
    /// A content heuristic.
    Heuristic(HeuristicKind),
    /// Nothing conclusive; upright as stored.
    Default,
}

/// Resolved rotation plus provenance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Orientation {
    /// Clockwise rotation to apply to raw frames.
    pub rotation: Rotation,
    /// Provenance of `rotation`.
    pub origin: RotationOrigin,
}

impl Orientation {
    fn unrotated() -> Self {
        Self {
            rotation: Rotation::Deg0,
            origin: RotationOrigin::Default,
        }
    }
}

/// Combines rotation metadata with ranked content heuristics.
#[derive(Clone, Debug, Default)]
pub struct OrientationResolver {
    opts: OrientationOpts,
}

impl OrientationResolver {
    /// Create a resolver.
    pub fn new(opts: OrientationOpts) -> Self {
        Self { opts }
    }

    /// Options in use.
    pub fn opts(&self) -> &OrientationOpts {
        &self.opts
    }

    /// Resolve the rotation of a probed video. Never fails: problems degrade to 0°.
    #[tracing::instrument(skip_all, fields(path = %source.source_path.display()))]
    pub fn resolve(&self, source: &SourceInfo) -> Orientation {
        if let Some(found) = self.from_metadata(source.metadata_rotation) {
            return found;
        }
        if self.opts.heuristics.is_empty() {
            return Orientation::unrotated();
        }
        match self.sample(source) {
            Ok(samples) if !samples.is_empty() => self.from_samples(&samples),
            Ok(_) => {
                tracing::warn!("no frames could be sampled for orientation, defaulting to 0");
                Orientation::unrotated()
            }
            Err(e) => {
                tracing::warn!("orientation sampling failed: {e}, defaulting to 0");
                Orientation::unrotated()
            }
        }
    }

    /// Resolve from already-decoded raw samples.
    pub fn resolve_with_samples(
        &self,
        metadata_rotation: Option<f64>,
        samples: &[FrameRGBA],
    ) -> Orientation {
        if let Some(found) = self.from_metadata(metadata_rotation) {
            return found;
        }
        self.from_samples(samples)
    }

    fn from_metadata(&self, metadata_rotation: Option<f64>) -> Option<Orientation> {
        let rotation = normalize_metadata_rotation(metadata_rotation?);
        if rotation == Rotation::Deg0 {
            return None;
        }
        tracing::info!("video rotation from metadata: {rotation}");
        Some(Orientation {
            rotation,
            origin: RotationOrigin::Metadata,
        })
    }

    fn from_samples(&self, samples: &[FrameRGBA]) -> Orientation {
        let luma: Vec<image::GrayImage> = samples
            .iter()
            .map(|f| analysis_luma(f, self.opts.analysis_max_side))
            .collect();
        for &kind in &self.opts.heuristics {
            let Detection { rotation, .. } = detect(kind, &luma);
            if rotation != Rotation::Deg0 {
                tracing::info!("metadata shows 0° but {kind} heuristic suggests {rotation}");
                return Orientation {
                    rotation,
                    origin: RotationOrigin::Heuristic(kind),
                };
            }
        }
        tracing::info!("video rotation detected: 0°");
        Orientation::unrotated()
    }

    fn sample(&self, source: &SourceInfo) -> OverlayResult<Vec<FrameRGBA>> {
        let mut decoder = FfmpegFrameSource::open_leading(source, self.opts.sample_frames)?;
        let frames = take_frames(&mut decoder, self.opts.sample_frames as usize);
        let closed = decoder.close();
        let frames = frames?;
        closed?;
        Ok(frames)
    }
}

/// Downscale a frame so its longest side is at most `max_side`, as luma.
pub fn analysis_luma(frame: &FrameRGBA, max_side: u32) -> image::GrayImage {
    let luma = frame.to_luma();
    let (w, h) = luma.dimensions();
    let longest = w.max(h);
    if max_side == 0 || longest <= max_side {
        return luma;
    }
    let scale = f64::from(max_side) / f64::from(longest);
    let nw = ((f64::from(w) * scale).round() as u32).max(1);
    let nh = ((f64::from(h) * scale).round() as u32).max(1);
    image::imageops::resize(&luma, nw, nh, image::imageops::FilterType::Triangle)
}

#[cfg(test)]
#[path = "../../tests/unit/orient/resolver.rs"]
mod tests;
