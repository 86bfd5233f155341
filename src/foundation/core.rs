use crate::foundation::error::{OverlayError, OverlayResult};

pub use kurbo::{Affine, Point};

/// Absolute 0-based frame position in the source video.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Frames elapsed since `earlier`, saturating at zero.
    pub fn age_since(self, earlier: FrameIndex) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> OverlayResult<Self> {
        if den == 0 {
            return Err(OverlayError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(OverlayError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse an ffprobe-style rate such as `30000/1001` or `25`.
    pub fn parse_ratio(s: &str) -> OverlayResult<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let num: u32 = num
            .parse()
            .map_err(|_| OverlayError::malformed(format!("invalid frame rate '{s}'")))?;
        let den: u32 = den
            .parse()
            .map_err(|_| OverlayError::malformed(format!("invalid frame rate '{s}'")))?;
        Self::new(num, den)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Number of whole frames covering `secs`, rounded to nearest.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Clockwise rotation needed to turn a raw decoded frame upright.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// 90 degrees clockwise.
    Deg90,
    /// 180 degrees.
    Deg180,
    /// 270 degrees clockwise (90 counter-clockwise).
    Deg270,
}

impl Rotation {
    /// All candidates in tie-break order.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Map an exact canonical angle in degrees.
    pub fn from_degrees(deg: i64) -> Option<Self> {
        match deg {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Angle in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Return `true` when width and height trade places.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg0,
            Self::Deg90 => Self::Deg270,
            Self::Deg180 => Self::Deg180,
            Self::Deg270 => Self::Deg90,
        }
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> u16 {
        r.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(v: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(i64::from(v))
            .ok_or_else(|| format!("rotation must be one of 0, 90, 180, 270 (got {v})"))
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Create a size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size after applying `rotation`.
    pub fn rotated(self, rotation: Rotation) -> Self {
        if rotation.swaps_axes() {
            Self::new(self.height, self.width)
        } else {
            self
        }
    }

    /// Byte length of one RGBA8 frame of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Return `true` for portrait geometry.
    pub fn is_portrait(self) -> bool {
        self.width < self.height
    }

    /// Return `true` when `(x, y)` lies in `[0, width) x [0, height)`.
    pub fn contains(self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }
}

/// Properties of the corrected (upright) video a run produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoProperties {
    /// Frame rate copied from the source.
    pub fps: Fps,
    /// Width after rotation.
    pub width: u32,
    /// Height after rotation.
    pub height: u32,
    /// Rotation applied to raw frames.
    pub rotation: Rotation,
}

impl VideoProperties {
    /// Derive upright properties from raw source dimensions and the resolved rotation.
    pub fn from_raw(fps: Fps, raw: FrameSize, rotation: Rotation) -> Self {
        let size = raw.rotated(rotation);
        Self {
            fps,
            width: size.width,
            height: size.height,
            rotation,
        }
    }

    /// Upright output size.
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
