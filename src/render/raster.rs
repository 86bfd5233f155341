use kurbo::{BezPath, Circle, PathEl, Point, Shape};

use crate::foundation::core::FrameSize;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::foundation::math::composite_premul_over_opaque;
use crate::media::frame::FrameRGBA;
use crate::render::style::Rgb8;

const CIRCLE_TOLERANCE: f64 = 0.1;

/// Anti-aliased vector drawing onto a transparent layer the size of one frame.
pub struct OverlayCanvas {
    size: FrameSize,
    ctx: vello_cpu::RenderContext,
    shapes: usize,
}

impl OverlayCanvas {
    /// Create an empty canvas.
    pub fn new(size: FrameSize) -> OverlayResult<Self> {
        let (w, h) = surface_dims(size)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(Self {
            size,
            ctx,
            shapes: 0,
        })
    }

    /// Canvas size.
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Number of shapes drawn so far.
    pub fn shape_count(&self) -> usize {
        self.shapes
    }

    /// Stroke a segment with round caps.
    pub fn segment(&mut self, a: Point, b: Point, thickness: f64, color: Rgb8, opacity: f32) {
        let half = (thickness / 2.0).max(0.5);
        let mut paths = vec![circle_path(a, half), circle_path(b, half)];
        let d = b - a;
        let len = d.hypot();
        if len > f64::EPSILON {
            let n = kurbo::Vec2::new(-d.y, d.x) * (half / len);
            let mut quad = BezPath::new();
            quad.move_to(a + n);
            quad.line_to(b + n);
            quad.line_to(b - n);
            quad.line_to(a - n);
            quad.close_path();
            paths.push(quad);
        }
        self.fill(&paths, color, opacity);
    }

    /// Fill a disc.
    pub fn disc(&mut self, center: Point, radius: f64, color: Rgb8, opacity: f32) {
        self.fill(&[circle_path(center, radius.max(0.5))], color, opacity);
    }

    fn fill(&mut self, paths: &[BezPath], color: Rgb8, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, 255,
        ));
        // One layer per shape so overlapping parts of the same shape do not double up.
        let layered = opacity < 1.0;
        if layered {
            self.ctx.push_opacity_layer(opacity);
        }
        for path in paths {
            self.ctx.fill_path(&bezpath_to_cpu(path));
        }
        if layered {
            self.ctx.pop_layer();
        }
        self.shapes += 1;
    }

    /// Rasterize and composite over a copy of `frame`.
    pub fn composite_onto(mut self, frame: &FrameRGBA) -> OverlayResult<FrameRGBA> {
        if frame.size() != self.size {
            return Err(OverlayError::render(format!(
                "canvas is {}x{} but frame is {}x{}",
                self.size.width, self.size.height, frame.width, frame.height
            )));
        }
        let mut out = frame.clone();
        if self.shapes == 0 {
            return Ok(out);
        }
        let (w, h) = surface_dims(self.size)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        composite_premul_over_opaque(&mut out.data, pixmap.data_as_u8_slice());
        Ok(out)
    }
}

fn surface_dims(size: FrameSize) -> OverlayResult<(u16, u16)> {
    let w = u16::try_from(size.width)
        .map_err(|_| OverlayError::render("frame width exceeds the rasterizer limit (65535)"))?;
    let h = u16::try_from(size.height)
        .map_err(|_| OverlayError::render("frame height exceeds the rasterizer limit (65535)"))?;
    if w == 0 || h == 0 {
        return Err(OverlayError::render("frame width/height must be non-zero"));
    }
    Ok((w, h))
}

fn circle_path(center: Point, radius: f64) -> BezPath {
    Circle::new(center, radius).to_path(CIRCLE_TOLERANCE)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
