use crate::foundation::core::FrameIndex;
use crate::render::raster::OverlayCanvas;
use crate::render::style::TrailStyle;
use crate::trace::motion::MotionTracer;

/// Draw the active trail at `current` as fading segments plus a dot at the anchor.
///
/// Each segment takes the opacity of its newer endpoint. Returns the number of segments drawn.
pub fn draw_trail(
    canvas: &mut OverlayCanvas,
    tracer: &MotionTracer,
    current: FrameIndex,
    style: &TrailStyle,
) -> usize {
    let trail = tracer.active_trail(current);
    let mut drawn = 0;
    for pair in trail.windows(2) {
        let opacity = tracer.fade_opacity(current.age_since(pair[1].frame_index)) as f32;
        if opacity <= 0.0 {
            continue;
        }
        canvas.segment(
            pair[0].point(),
            pair[1].point(),
            style.thickness,
            style.color,
            opacity,
        );
        drawn += 1;
    }
    if let Some(anchor) = trail.last() {
        let opacity = tracer.fade_opacity(current.age_since(anchor.frame_index)) as f32;
        canvas.disc(anchor.point(), style.anchor_radius, style.color, opacity);
    }
    drawn
}

#[cfg(test)]
#[path = "../../tests/unit/render/trail.rs"]
mod tests;
