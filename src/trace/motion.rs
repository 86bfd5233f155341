use std::collections::VecDeque;

use crate::foundation::core::{Fps, FrameIndex, FrameSize, Point};
use crate::geometry::transform::point_to_pixel;
use crate::pose::landmark::{LEFT_HIP, Landmark, RIGHT_HIP};

/// Minimum visibility both hips need before a midpoint is trusted.
pub const HIP_MIN_VISIBILITY: f64 = 0.3;

/// One recorded anchor position in output pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    /// Column in pixels.
    pub x: f64,
    /// Row in pixels.
    pub y: f64,
    /// Source frame the position was recorded on.
    pub frame_index: FrameIndex,
}

impl TrailPoint {
    /// Position as a point.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Frame-age-bounded history of one anchor point.
///
/// Ages are measured in frames, never wall-clock time, so a trail covers the same span of
/// video regardless of how fast the render runs.
#[derive(Clone, Debug)]
pub struct MotionTracer {
    max_age_frames: u64,
    history: VecDeque<TrailPoint>,
}

impl MotionTracer {
    /// Create a tracer keeping `persistence_secs` worth of frames at `fps`.
    pub fn new(fps: Fps, persistence_secs: f64) -> Self {
        let max_age_frames = fps.secs_to_frames_round(persistence_secs).max(1);
        tracing::debug!(
            fps = fps.as_f64(),
            persistence_secs,
            max_age_frames,
            "motion tracer initialized"
        );
        Self {
            max_age_frames,
            history: VecDeque::new(),
        }
    }

    /// Window length in frames.
    pub fn max_age_frames(&self) -> u64 {
        self.max_age_frames
    }

    /// Record a position, then evict everything older than the window.
    pub fn add_position(&mut self, x: f64, y: f64, frame_index: FrameIndex) {
        self.history.push_back(TrailPoint { x, y, frame_index });
        let max_age = self.max_age_frames;
        self.history
            .retain(|p| frame_index.age_since(p.frame_index) <= max_age);
    }

    /// Recorded points still within the window at `current`, oldest first.
    pub fn active_trail(&self, current: FrameIndex) -> Vec<TrailPoint> {
        self.history
            .iter()
            .filter(|p| current.age_since(p.frame_index) <= self.max_age_frames)
            .copied()
            .collect()
    }

    /// Linear fade: `1` at age 0, `0` at (and beyond) the window boundary.
    pub fn fade_opacity(&self, age: u64) -> f64 {
        if age >= self.max_age_frames {
            return 0.0;
        }
        (1.0 - age as f64 / self.max_age_frames as f64).max(0.0)
    }

    /// Most recent recorded point.
    pub fn current_anchor(&self) -> Option<TrailPoint> {
        self.history.back().copied()
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Return `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Midpoint of the two hips in pixel space of a `size` frame.
///
/// `None` when either hip is missing or below [`HIP_MIN_VISIBILITY`], or the midpoint falls
/// outside the frame. Gaps are expected; the trail simply skips those frames.
pub fn hip_midpoint(landmarks: &[Landmark], size: FrameSize) -> Option<Point> {
    let (Some(left), Some(right)) = (landmarks.get(LEFT_HIP), landmarks.get(RIGHT_HIP)) else {
        return None;
    };
    if left.visibility < HIP_MIN_VISIBILITY || right.visibility < HIP_MIN_VISIBILITY {
        tracing::trace!(
            left = left.visibility,
            right = right.visibility,
            "hip confidence too low"
        );
        return None;
    }
    let mid = Point::new(
        (left.x + right.x) / 2.0 * f64::from(size.width),
        (left.y + right.y) / 2.0 * f64::from(size.height),
    );
    point_to_pixel(mid, size).map(|px| px.to_point())
}

#[cfg(test)]
#[path = "../../tests/unit/trace/motion.rs"]
mod tests;
