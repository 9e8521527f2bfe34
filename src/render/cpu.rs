use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{BezPath, Point, Rgb8};
use crate::foundation::error::{BeatError, BeatResult};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::text::{TextRaster, rasterize_line, system_fontdb};
use crate::visual::draw::{DrawList, DrawOp};

/// CPU raster backend powered by `vello_cpu`.
///
/// Text lines are rasterized once through `resvg` and cached as image paints.
pub struct CpuBackend {
    fontdb: Arc<usvg::fontdb::Database>,
    text_cache: HashMap<TextKey, TextPaint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    size_bits: u32,
    color: Rgb8,
    strip_width: u32,
}

#[derive(Clone)]
struct TextPaint {
    image: vello_cpu::Image,
    width: f64,
    height: f64,
}

impl CpuBackend {
    /// Create a backend with the system font database loaded.
    pub fn new() -> Self {
        Self::with_fontdb(system_fontdb())
    }

    /// Create a backend sharing an already loaded font database.
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            fontdb,
            text_cache: HashMap::new(),
        }
    }

    fn text_paint_for(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgb8,
        strip_width: u32,
    ) -> BeatResult<TextPaint> {
        let key = TextKey {
            text: text.to_string(),
            size_bits: size_px.to_bits(),
            color,
            strip_width,
        };
        if let Some(paint) = self.text_cache.get(&key) {
            return Ok(paint.clone());
        }

        let raster = rasterize_line(&self.fontdb, text, size_px, color, strip_width)?;
        let paint = TextPaint {
            width: f64::from(raster.width),
            height: f64::from(raster.height),
            image: raster_to_image(&raster)?,
        };
        self.text_cache.insert(key, paint.clone());
        Ok(paint)
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for CpuBackend {
    fn render(&mut self, list: &DrawList) -> BeatResult<FrameRGBA> {
        let width: u16 = list
            .canvas
            .width
            .try_into()
            .map_err(|_| BeatError::validation("canvas width exceeds u16"))?;
        let height: u16 = list
            .canvas
            .height
            .try_into()
            .map_err(|_| BeatError::validation("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint(color_to_cpu(list.background, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        for op in &list.ops {
            draw_op(self, &mut ctx, op, list.canvas.width)?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: list.canvas.width,
            height: list.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn fork(&self) -> Box<dyn RenderBackend> {
        Box::new(Self::with_fontdb(self.fontdb.clone()))
    }
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    strip_width: u32,
) -> BeatResult<()> {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::FillPath {
            path,
            color,
            opacity,
        } => {
            ctx.set_paint(color_to_cpu(*color, 255));
            with_opacity(ctx, *opacity, |ctx| ctx.fill_path(&bezpath_to_cpu(path)));
            Ok(())
        }
        DrawOp::StrokePath {
            path,
            width,
            color,
            opacity,
        } => {
            ctx.set_paint(color_to_cpu(*color, 255));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
            with_opacity(ctx, *opacity, |ctx| ctx.stroke_path(&bezpath_to_cpu(path)));
            Ok(())
        }
        DrawOp::Text {
            text,
            center,
            size_px,
            color,
            opacity,
        } => {
            let paint = backend.text_paint_for(text, *size_px, *color, strip_width)?;
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                center.x - paint.width / 2.0,
                center.y - paint.height / 2.0,
            )));
            ctx.set_paint(paint.image);
            with_opacity(ctx, *opacity, |ctx| {
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, paint.width, paint.height));
            });
            Ok(())
        }
    }
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if opacity <= 0.0 {
        return;
    }
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
        draw(ctx);
        ctx.pop_layer();
    } else {
        draw(ctx);
    }
}

fn color_to_cpu(c: Rgb8, a: u8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

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

fn raster_to_image(raster: &TextRaster) -> BeatResult<vello_cpu::Image> {
    let w: u16 = raster
        .width
        .try_into()
        .map_err(|_| BeatError::validation("text raster width exceeds u16"))?;
    let h: u16 = raster
        .height
        .try_into()
        .map_err(|_| BeatError::validation("text raster height exceeds u16"))?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(raster.rgba8_premul.len() / 4);
    for px in raster.rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
