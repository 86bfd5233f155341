use std::path::Path;

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::orient::resolver::OrientationOpts;
use crate::render::style::{RenderPolicy, RenderStyle, TrailStyle};

/// How raw-frame rotation is reconciled with landmark coordinates. One value per run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Rotate the frame upright; landmarks are already normalized to the upright frame.
    PreRotateFrame,
    /// Rotate the frame upright and remap landmarks out of raw-frame space.
    #[default]
    CompensateLandmarks,
    /// Draw on the raw frame with raw landmarks, then rotate the finished frame.
    PostRotateOutput,
}

impl std::str::FromStr for RotationStrategy {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pre_rotate_frame" | "pre" => Ok(Self::PreRotateFrame),
            "compensate_landmarks" | "compensate" => Ok(Self::CompensateLandmarks),
            "post_rotate_output" | "post" => Ok(Self::PostRotateOutput),
            other => Err(OverlayError::validation(format!(
                "unknown rotation strategy '{other}'"
            ))),
        }
    }
}

/// Motion trail options.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrailOpts {
    /// Draw the hip trail at all.
    pub enabled: bool,
    /// How long a recorded position stays visible.
    pub persistence_secs: f64,
    /// Trail appearance.
    pub style: TrailStyle,
}

impl Default for TrailOpts {
    fn default() -> Self {
        Self {
            enabled: true,
            persistence_secs: 2.0,
            style: TrailStyle::default(),
        }
    }
}

/// Everything that shapes one overlay run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayOpts {
    /// Skeleton appearance.
    pub style: RenderStyle,
    /// Confidence gating.
    pub policy: RenderPolicy,
    /// Motion trail.
    pub trail: TrailOpts,
    /// Rotation reconciliation.
    pub strategy: RotationStrategy,
    /// Orientation detection.
    pub orientation: OrientationOpts,
    /// Log progress every this many frames; 0 disables progress logs.
    pub progress_interval: u64,
    /// Replace an existing output file.
    pub overwrite: bool,
    /// Encode odd-sized output by dropping its last column and/or row.
    pub crop_to_even: bool,
}

impl Default for OverlayOpts {
    fn default() -> Self {
        Self {
            style: RenderStyle::default(),
            policy: RenderPolicy::default(),
            trail: TrailOpts::default(),
            strategy: RotationStrategy::default(),
            orientation: OrientationOpts::default(),
            progress_interval: 50,
            overwrite: true,
            crop_to_even: false,
        }
    }
}

impl OverlayOpts {
    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> OverlayResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| OverlayError::malformed(format!("overlay options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read options from a JSON file.
    pub fn from_path(path: &Path) -> OverlayResult<Self> {
        use anyhow::Context as _;
        if !path.is_file() {
            return Err(OverlayError::not_found(format!(
                "options file '{}'",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read options '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> OverlayResult<()> {
        self.policy.validate()?;
        if !self.trail.persistence_secs.is_finite() || self.trail.persistence_secs < 0.0 {
            return Err(OverlayError::validation(
                "trail persistence_secs must be a non-negative number",
            ));
        }
        if !(self.style.connection_thickness > 0.0 && self.style.landmark_radius > 0.0) {
            return Err(OverlayError::validation(
                "connection_thickness and landmark_radius must be positive",
            ));
        }
        if self.orientation.sample_frames == 0 && !self.orientation.heuristics.is_empty() {
            return Err(OverlayError::validation(
                "orientation sample_frames must be at least 1 when heuristics are enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
