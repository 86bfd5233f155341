use crate::foundation::core::FrameIndex;

/// Number of landmarks in a complete body set.
pub const LANDMARK_COUNT: usize = 33;

/// Canonical landmark names in index order.
pub const LANDMARK_NAMES: [&str; LANDMARK_COUNT] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

/// Index of the nose landmark.
pub const NOSE: usize = 0;
/// Index of the left hip landmark.
pub const LEFT_HIP: usize = 23;
/// Index of the right hip landmark.
pub const RIGHT_HIP: usize = 24;

/// Return `true` for facial detail landmarks (eyes, ears, mouth) that are never drawn as joints.
pub fn is_face_detail(index: usize) -> bool {
    (1..=10).contains(&index)
}

/// One detected body keypoint.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Landmark {
    /// Normalized horizontal position, roughly `[0, 1]`.
    pub x: f64,
    /// Normalized vertical position, roughly `[0, 1]`.
    pub y: f64,
    /// Relative depth; sign is unbounded.
    #[serde(default)]
    pub z: f64,
    /// Detector confidence in `[0, 1]`.
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    /// Create a landmark.
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Return `true` when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.z.is_finite()
            && self.visibility.is_finite()
    }
}

/// Occlusion/lighting heuristics reported by the detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QualityFlags {
    /// Too few landmarks were visible.
    pub low_visibility: bool,
    /// Part of the body was occluded.
    pub partial_occlusion: bool,
    /// The frame was too dark or too bright.
    pub poor_lighting: bool,
}

/// Landmark set (or detection failure) for one sampled source frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoseFrame {
    /// Source-video frame position this record belongs to.
    pub frame_index: FrameIndex,
    /// Whether the detector found a body.
    #[serde(default)]
    pub pose_detected: bool,
    /// Mean visibility of the visible landmarks.
    #[serde(default)]
    pub overall_confidence: f64,
    /// Empty, or exactly [`LANDMARK_COUNT`] entries in canonical order.
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    /// Detector quality heuristics.
    #[serde(default)]
    pub quality_flags: QualityFlags,
}

impl PoseFrame {
    /// A frame with no detection.
    pub fn undetected(frame_index: FrameIndex) -> Self {
        Self {
            frame_index,
            pose_detected: false,
            overall_confidence: 0.0,
            landmarks: Vec::new(),
            quality_flags: QualityFlags::default(),
        }
    }

    /// A detected frame; `overall_confidence` is derived from `landmarks`.
    pub fn detected(frame_index: FrameIndex, landmarks: Vec<Landmark>) -> Self {
        let overall_confidence = mean_visibility(&landmarks, 0.5);
        Self {
            frame_index,
            pose_detected: true,
            overall_confidence,
            landmarks,
            quality_flags: QualityFlags::default(),
        }
    }

    /// Check the landmark-set invariant: empty, or 33 finite entries.
    pub fn validate_landmarks(&self) -> Result<(), String> {
        if self.landmarks.is_empty() {
            return Ok(());
        }
        if self.landmarks.len() != LANDMARK_COUNT {
            return Err(format!(
                "frame {} has {} landmarks, expected {LANDMARK_COUNT}",
                self.frame_index.0,
                self.landmarks.len()
            ));
        }
        if let Some(i) = self.landmarks.iter().position(|l| !l.is_finite()) {
            return Err(format!(
                "frame {} landmark {} ({}) has non-finite values",
                self.frame_index.0, i, LANDMARK_NAMES[i]
            ));
        }
        Ok(())
    }

    /// Return `true` when this frame should be drawn.
    pub fn has_drawable_pose(&self) -> bool {
        self.pose_detected && !self.landmarks.is_empty()
    }
}

/// Mean visibility of landmarks whose visibility exceeds `min_visible`.
pub fn mean_visibility(landmarks: &[Landmark], min_visible: f64) -> f64 {
    let (sum, n) = landmarks
        .iter()
        .filter(|l| l.visibility > min_visible)
        .fold((0.0, 0usize), |(s, n), l| (s + l.visibility, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/landmark.rs"]
mod tests;
