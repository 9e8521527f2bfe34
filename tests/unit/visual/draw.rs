use super::*;

use kurbo::Shape as _;

use crate::foundation::core::{Fps, FrameIndex};
use crate::genre::registry::visual_style;
use crate::visual::frame::{FrameContext, frame_state};
use crate::visual::title::{EdgeMode, edge_frame_state};

fn ctx() -> FrameContext {
    FrameContext {
        fps: Fps::integer(30),
        tempo: 128,
        duration_secs: 10.0,
        canvas: Canvas::FULL_HD,
    }
}

fn count(list: &DrawList) -> (usize, usize, usize) {
    let mut fills = 0;
    let mut strokes = 0;
    let mut texts = 0;
    for op in &list.ops {
        match op {
            DrawOp::FillPath { .. } => fills += 1,
            DrawOp::StrokePath { .. } => strokes += 1,
            DrawOp::Text { .. } => texts += 1,
        }
    }
    (fills, strokes, texts)
}

#[test]
fn scene_compiles_bars_particles_and_rings() {
    let style = visual_style("electronic");
    let scene = frame_state(FrameIndex(10), &ctx(), style);
    let list = compile_scene(&scene, style, Canvas::FULL_HD);

    let visible_bars = scene.bars.iter().filter(|b| b.height > 0.0).count();
    let (fills, strokes, texts) = count(&list);
    assert_eq!(fills, visible_bars + 1 + scene.particles.len());
    assert_eq!(strokes, 3);
    assert_eq!(texts, 0);
    assert_eq!(list.background, style.background);
}

#[test]
fn frame_zero_has_no_progress_strip() {
    let style = visual_style("electronic");
    let scene = frame_state(FrameIndex(0), &ctx(), style);
    let list = compile_scene(&scene, style, Canvas::FULL_HD);
    let visible_bars = scene.bars.iter().filter(|b| b.height > 0.0).count();
    let (fills, _, _) = count(&list);
    assert_eq!(fills, visible_bars + scene.particles.len());
}

#[test]
fn bars_grow_up_from_the_bottom_edge() {
    let style = visual_style("rock");
    let scene = frame_state(FrameIndex(3), &ctx(), style);
    let list = compile_scene(&scene, style, Canvas::FULL_HD);
    let DrawOp::FillPath { path, .. } = &list.ops[0] else {
        panic!("first op must be a bar fill");
    };
    let bbox = path.bounding_box();
    assert!((bbox.y1 - 1080.0).abs() < 1e-9);
    assert!(bbox.x0 >= 0.0 && bbox.x1 <= 1920.0 / 64.0);
}

#[test]
fn hexagon_ring_path_has_six_vertices() {
    let ring = Ring {
        radius: 150.0,
        rotation: 0.0,
        vertices: 6,
        color: Rgb8::new(1, 2, 3),
        alpha: 0.4,
    };
    let path = ring_path(Point::new(0.0, 0.0), &ring);
    // move + 5 lines + close
    assert_eq!(path.elements().len(), 7);
    let bbox = path.bounding_box();
    assert!((bbox.x1 - 150.0).abs() < 1e-9);
}

#[test]
fn title_card_fades_text_and_hides_when_transparent() {
    let style = visual_style("electronic");
    let visible = edge_frame_state(FrameIndex(30), 90, EdgeMode::Intro);
    let list = compile_title_card(&visible, style, Canvas::FULL_HD);
    assert_eq!(count(&list), (0, 0, 2));
    let DrawOp::Text { text, opacity, .. } = &list.ops[0] else {
        panic!("title op must be text");
    };
    assert_eq!(text, EdgeMode::Intro.title());
    assert!((*opacity as f64 - visible.opacity).abs() < 1e-6);

    let hidden = edge_frame_state(FrameIndex(0), 90, EdgeMode::Intro);
    assert!(compile_title_card(&hidden, style, Canvas::FULL_HD).ops.is_empty());
}
