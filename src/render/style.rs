/// Opaque RGB color, serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb8 {
    /// Create a color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// High-confidence green.
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Medium-confidence yellow.
    pub const YELLOW: Self = Self::new(255, 255, 0);
    /// Low-confidence red.
    pub const RED: Self = Self::new(255, 0, 0);
    /// Trail cyan.
    pub const CYAN: Self = Self::new(0, 255, 255);
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Visual parameters of the skeleton.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Segment color.
    pub connection_color: Rgb8,
    /// Segment width in pixels.
    pub connection_thickness: f64,
    /// Joint dot radius in pixels.
    pub landmark_radius: f64,
    /// Joint color when confidence coloring is off.
    pub landmark_color: Rgb8,
    /// Color joints by confidence band instead of `landmark_color`.
    pub confidence_coloring: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            connection_color: Rgb8::WHITE,
            connection_thickness: 2.0,
            landmark_radius: 4.0,
            landmark_color: Rgb8::GREEN,
            confidence_coloring: true,
        }
    }
}

/// Which joints are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Only joints that clear the threshold.
    #[default]
    Gated,
    /// Every in-bounds joint, to inspect what the detector saw.
    Debug,
}

/// Confidence band of a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfidenceBand {
    /// Above the high band.
    High,
    /// Above the medium band.
    Medium,
    /// Everything else.
    Low,
}

impl ConfidenceBand {
    /// Color used when confidence coloring is on.
    pub fn color(self) -> Rgb8 {
        match self {
            Self::High => Rgb8::GREEN,
            Self::Medium => Rgb8::YELLOW,
            Self::Low => Rgb8::RED,
        }
    }
}

/// Confidence gating, passed per render call.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderPolicy {
    /// Minimum visibility for a joint or both ends of a connection.
    pub threshold: f64,
    /// Visibility strictly above this is [`ConfidenceBand::High`].
    pub high_band: f64,
    /// Visibility strictly above this is [`ConfidenceBand::Medium`].
    pub medium_band: f64,
    /// Joint gating mode.
    pub mode: RenderMode,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            high_band: 0.8,
            medium_band: 0.5,
            mode: RenderMode::Gated,
        }
    }
}

impl RenderPolicy {
    /// Return `true` when `visibility` clears the threshold.
    pub fn passes(&self, visibility: f64) -> bool {
        visibility >= self.threshold
    }

    /// Band for `visibility`.
    pub fn band(&self, visibility: f64) -> ConfidenceBand {
        if visibility > self.high_band {
            ConfidenceBand::High
        } else if visibility > self.medium_band {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    /// Reject thresholds outside `[0, 1]`.
    pub fn validate(&self) -> crate::foundation::error::OverlayResult<()> {
        for (name, v) in [
            ("threshold", self.threshold),
            ("high_band", self.high_band),
            ("medium_band", self.medium_band),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(crate::foundation::error::OverlayError::validation(format!(
                    "render policy {name} must be within [0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Visual parameters of the motion trail.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrailStyle {
    /// Trail color; opacity fades with age.
    pub color: Rgb8,
    /// Segment width in pixels.
    pub thickness: f64,
    /// Radius of the dot at the current anchor.
    pub anchor_radius: f64,
}

impl Default for TrailStyle {
    fn default() -> Self {
        Self {
            color: Rgb8::CYAN,
            thickness: 3.0,
            anchor_radius: 6.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/style.rs"]
mod tests;
