//! Skeleton drawing for one frame.
//!
//! Rendering is split into a pure planning step ([`plan_skeleton`]), which decides what is
//! drawn where and in which color, and rasterization onto an [`OverlayCanvas`]. Connections
//! are drawn before joints so joints sit on top.

use crate::foundation::core::FrameSize;
use crate::foundation::error::OverlayResult;
use crate::geometry::transform::{Pixel, to_pixel};
use crate::media::frame::FrameRGBA;
use crate::pose::landmark::{Landmark, is_face_detail};
use crate::render::raster::OverlayCanvas;
use crate::render::style::{RenderMode, RenderPolicy, RenderStyle, Rgb8};

/// Landmark index pairs joined by a segment.
pub const CONNECTIONS: [(usize, usize); 26] = [
    // head to shoulders
    (0, 11),
    (0, 12),
    // shoulders and arms
    (11, 12),
    (11, 13),
    (12, 14),
    (13, 15),
    (14, 16),
    // torso
    (11, 23),
    (12, 24),
    // hips and legs
    (23, 24),
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    // left hand
    (15, 17),
    (17, 19),
    (19, 21),
    (21, 15),
    // right hand
    (16, 18),
    (18, 20),
    (20, 22),
    (22, 16),
];

/// A connection that passed gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedSegment {
    /// Landmark pair.
    pub pair: (usize, usize),
    /// First endpoint.
    pub a: Pixel,
    /// Second endpoint.
    pub b: Pixel,
}

/// A joint that passed gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedJoint {
    /// Landmark index.
    pub index: usize,
    /// Position.
    pub at: Pixel,
    /// Fill color.
    pub color: Rgb8,
}

/// What one frame's skeleton consists of.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkeletonPlan {
    /// Segments in [`CONNECTIONS`] order.
    pub segments: Vec<PlannedSegment>,
    /// Joints in landmark order.
    pub joints: Vec<PlannedJoint>,
}

impl SkeletonPlan {
    /// Return `true` when nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.joints.is_empty()
    }
}

/// Decide which connections and joints to draw for `landmarks` on a `size` frame.
///
/// Missing landmarks (short sets) simply produce no segment or joint.
pub fn plan_skeleton(
    landmarks: &[Landmark],
    size: FrameSize,
    style: &RenderStyle,
    policy: &RenderPolicy,
) -> SkeletonPlan {
    let mut plan = SkeletonPlan::default();

    for &(i, j) in &CONNECTIONS {
        let (Some(li), Some(lj)) = (landmarks.get(i), landmarks.get(j)) else {
            continue;
        };
        if !policy.passes(li.visibility) || !policy.passes(lj.visibility) {
            continue;
        }
        if let (Some(a), Some(b)) = (to_pixel(li, size), to_pixel(lj, size)) {
            plan.segments.push(PlannedSegment { pair: (i, j), a, b });
        }
    }

    for (index, lm) in landmarks.iter().enumerate() {
        if is_face_detail(index) {
            continue;
        }
        if policy.mode == RenderMode::Gated && !policy.passes(lm.visibility) {
            continue;
        }
        let Some(at) = to_pixel(lm, size) else {
            continue;
        };
        let color = if style.confidence_coloring {
            policy.band(lm.visibility).color()
        } else {
            style.landmark_color
        };
        plan.joints.push(PlannedJoint { index, at, color });
    }

    plan
}

/// Draws skeletons with a fixed style and policy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SkeletonRenderer {
    style: RenderStyle,
    policy: RenderPolicy,
}

impl SkeletonRenderer {
    /// Create a renderer.
    pub fn new(style: RenderStyle, policy: RenderPolicy) -> Self {
        Self { style, policy }
    }

    /// Style in use.
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Policy in use.
    pub fn policy(&self) -> &RenderPolicy {
        &self.policy
    }

    /// Plan for a frame of `size`.
    pub fn plan(&self, landmarks: &[Landmark], size: FrameSize) -> SkeletonPlan {
        plan_skeleton(landmarks, size, &self.style, &self.policy)
    }

    /// Add the skeleton to `canvas`.
    pub fn draw(&self, canvas: &mut OverlayCanvas, landmarks: &[Landmark]) {
        let plan = self.plan(landmarks, canvas.size());
        for seg in &plan.segments {
            canvas.segment(
                seg.a.center(),
                seg.b.center(),
                self.style.connection_thickness,
                self.style.connection_color,
                1.0,
            );
        }
        for joint in &plan.joints {
            canvas.disc(joint.at.center(), self.style.landmark_radius, joint.color, 1.0);
        }
    }

    /// Annotated copy of `frame`; `frame` itself is left untouched.
    pub fn render(&self, frame: &FrameRGBA, landmarks: &[Landmark]) -> OverlayResult<FrameRGBA> {
        let mut canvas = OverlayCanvas::new(frame.size())?;
        self.draw(&mut canvas, landmarks);
        canvas.composite_onto(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/skeleton.rs"]
mod tests;
