use kurbo::Shape as _;

use crate::foundation::core::{BezPath, Canvas, Point, Rect, Rgb8};
use crate::genre::registry::VisualStyle;
use crate::visual::frame::{BAR_COUNT, Ring, SceneDescription};
use crate::visual::title::TitleCardDescription;

const BAR_GAP_PX: f64 = 2.0;
const BAR_OPACITY: f32 = 0.85;
const PROGRESS_STRIP_PX: f64 = 4.0;
const PROGRESS_OPACITY: f32 = 0.5;
const RING_STROKE_PX: f64 = 3.0;
const TITLE_SIZE_PX: f32 = 96.0;
const SUBTITLE_SIZE_PX: f32 = 40.0;
const SUBTITLE_COLOR: Rgb8 = Rgb8::new(230, 230, 230);
const CURVE_TOLERANCE: f64 = 0.1;

/// One backend-agnostic draw instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill a closed path.
    FillPath {
        /// Path in canvas pixels.
        path: BezPath,
        /// Fill color.
        color: Rgb8,
        /// Layer opacity.
        opacity: f32,
    },
    /// Stroke a path outline.
    StrokePath {
        /// Path in canvas pixels.
        path: BezPath,
        /// Stroke width in pixels.
        width: f64,
        /// Stroke color.
        color: Rgb8,
        /// Layer opacity.
        opacity: f32,
    },
    /// A single centered line of text.
    Text {
        /// Text content.
        text: String,
        /// Anchor: horizontal and vertical center of the line.
        center: Point,
        /// Font size in pixels.
        size_px: f32,
        /// Fill color.
        color: Rgb8,
        /// Layer opacity.
        opacity: f32,
    },
}

/// Draw instructions for one frame, painted in order over a solid background.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawList {
    /// Output size.
    pub canvas: Canvas,
    /// Opaque background fill.
    pub background: Rgb8,
    /// Ops in paint order.
    pub ops: Vec<DrawOp>,
}

/// Lower a main-segment scene into draw instructions.
///
/// Paint order: bars, progress strip, particles, rings.
pub fn compile_scene(scene: &SceneDescription, style: &VisualStyle, canvas: Canvas) -> DrawList {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let bar_w = w / BAR_COUNT as f64;
    let mut ops = Vec::with_capacity(scene.bars.len() + scene.particles.len() + scene.rings.len() + 1);

    for (i, bar) in scene.bars.iter().enumerate() {
        if bar.height <= 0.0 {
            continue;
        }
        let x0 = i as f64 * bar_w + BAR_GAP_PX / 2.0;
        let x1 = (i + 1) as f64 * bar_w - BAR_GAP_PX / 2.0;
        ops.push(DrawOp::FillPath {
            path: Rect::new(x0, h - bar.height, x1, h).to_path(CURVE_TOLERANCE),
            color: bar.color,
            opacity: BAR_OPACITY,
        });
    }

    if scene.progress > 0.0 {
        ops.push(DrawOp::FillPath {
            path: Rect::new(0.0, 0.0, w * scene.progress, PROGRESS_STRIP_PX).to_path(CURVE_TOLERANCE),
            color: style.palette[0],
            opacity: PROGRESS_OPACITY,
        });
    }

    for p in &scene.particles {
        if p.size <= 0.0 {
            continue;
        }
        ops.push(DrawOp::FillPath {
            path: kurbo::Circle::new(p.center, p.size).to_path(CURVE_TOLERANCE),
            color: p.color,
            opacity: p.alpha,
        });
    }

    let center = canvas.center();
    for ring in &scene.rings {
        ops.push(DrawOp::StrokePath {
            path: ring_path(center, ring),
            width: RING_STROKE_PX,
            color: ring.color,
            opacity: ring.alpha,
        });
    }

    DrawList {
        canvas,
        background: scene.background,
        ops,
    }
}

/// Lower an intro/outro title card into draw instructions.
pub fn compile_title_card(
    card: &TitleCardDescription,
    style: &VisualStyle,
    canvas: Canvas,
) -> DrawList {
    let center = canvas.center();
    let opacity = card.opacity as f32;
    let mut ops = Vec::with_capacity(2);

    if opacity > 0.0 {
        ops.push(DrawOp::Text {
            text: card.title.to_string(),
            center: Point::new(center.x, center.y - 40.0),
            size_px: TITLE_SIZE_PX,
            color: style.palette[0],
            opacity,
        });
        ops.push(DrawOp::Text {
            text: card.subtitle.to_string(),
            center: Point::new(center.x, center.y + 60.0),
            size_px: SUBTITLE_SIZE_PX,
            color: SUBTITLE_COLOR,
            opacity: opacity * 0.8,
        });
    }

    DrawList {
        canvas,
        background: style.background,
        ops,
    }
}

/// Closed polygon outline for `ring`, rotated about `center`.
pub fn ring_path(center: Point, ring: &Ring) -> BezPath {
    let n = ring.vertices.max(3);
    let mut path = BezPath::new();
    for j in 0..n {
        let a = ring.rotation + (j as f64 / n as f64) * std::f64::consts::TAU;
        let p = Point::new(center.x + a.cos() * ring.radius, center.y + a.sin() * ring.radius);
        if j == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

#[cfg(test)]
#[path = "../../tests/unit/visual/draw.rs"]
mod tests;
