use super::*;

use crate::genre::registry::{ShapeFamily, visual_style};

fn ctx() -> FrameContext {
    FrameContext {
        fps: Fps::integer(30),
        tempo: 128,
        duration_secs: 10.0,
        canvas: Canvas::FULL_HD,
    }
}

#[test]
fn frame_zero_boundary_values() {
    let style = visual_style("electronic");
    let s = frame_state(FrameIndex(0), &ctx(), style);
    assert_eq!(s.beat, 0.0);
    assert_eq!(s.intensity, 0.5);
    assert_eq!(s.bars[0].phase, 0.0);
    assert_eq!(s.progress, 0.0);
    assert_eq!(s.bars.len(), BAR_COUNT);
    assert_eq!(s.particles.len(), style.particle_count as usize);
    assert_eq!(s.rings.len(), SHAPE_COUNT);
}

#[test]
fn frame_state_is_bit_identical_across_calls() {
    let style = visual_style("electronic");
    for f in [0, 1, 17, 299] {
        let a = frame_state(FrameIndex(f), &ctx(), style);
        let b = frame_state(FrameIndex(f), &ctx(), style);
        for (x, y) in a.bars.iter().zip(&b.bars) {
            assert_eq!(x.height.to_bits(), y.height.to_bits());
        }
        for (x, y) in a.particles.iter().zip(&b.particles) {
            assert_eq!(x.center.x.to_bits(), y.center.x.to_bits());
            assert_eq!(x.center.y.to_bits(), y.center.y.to_bits());
            assert_eq!(x.size.to_bits(), y.size.to_bits());
        }
        for (x, y) in a.rings.iter().zip(&b.rings) {
            assert_eq!(x.rotation.to_bits(), y.rotation.to_bits());
        }
    }
}

#[test]
fn beat_follows_tempo() {
    let style = visual_style("electronic");
    // 15 frames at 30fps = 0.5s; 0.5s at 128bpm = 1.0666.. beats.
    let s = frame_state(FrameIndex(15), &ctx(), style);
    assert!((s.time_secs - 0.5).abs() < 1e-12);
    assert!((s.beat - 0.5 * 128.0 / 60.0).abs() < 1e-12);
    assert!((s.intensity - ((s.beat * PI).sin() * 0.5 + 0.5)).abs() < 1e-12);
}

#[test]
fn bar_heights_follow_phase_envelope_and_palette_bands() {
    let style = visual_style("electronic");
    let s = frame_state(FrameIndex(7), &ctx(), style);
    for (i, bar) in s.bars.iter().enumerate() {
        let phase = s.beat + (i as f64 / 64.0) * 4.0;
        let expected = ((phase * PI).sin() * 0.5 + 0.5) * style.wave_amplitude * s.intensity;
        assert!((bar.height - expected).abs() < 1e-9);
        assert!(bar.height >= 0.0 && bar.height <= style.wave_amplitude);
        let band = (i as f64 / 64.0 * style.palette.len() as f64).floor() as usize;
        assert_eq!(bar.color, style.palette[band]);
    }
}

#[test]
fn particles_orbit_the_canvas_center() {
    let style = visual_style("ambient");
    let s = frame_state(FrameIndex(42), &ctx(), style);
    let c = Canvas::FULL_HD.center();
    for (i, p) in s.particles.iter().enumerate() {
        let dist = ((p.center.x - c.x).powi(2) + (p.center.y - c.y).powi(2)).sqrt();
        assert!((200.0 - 1e-9..=400.0 + 1e-9).contains(&dist));
        assert!(p.size >= 2.0 - 1e-9 && p.size <= 8.0 + 1e-9);
        assert_eq!(p.color, style.palette[i % style.palette.len()]);
        assert_eq!(p.alpha, PARTICLE_ALPHA);
    }
}

#[test]
fn rings_rotate_with_beat_and_use_family_vertices() {
    let geometric = visual_style("electronic");
    assert_eq!(geometric.shape_family, ShapeFamily::Geometric);
    let s = frame_state(FrameIndex(30), &ctx(), geometric);
    for (k, r) in s.rings.iter().enumerate() {
        assert_eq!(r.radius, SHAPE_RADII[k]);
        assert_eq!(r.vertices, 6);
        assert_eq!(r.alpha, SHAPE_ALPHA);
        let expected = s.beat * 0.5 + (k as f64 / 3.0) * TAU;
        assert!((r.rotation - expected).abs() < 1e-12);
    }

    let round = visual_style("jazz");
    let s = frame_state(FrameIndex(30), &ctx(), round);
    assert!(s.rings.iter().all(|r| r.vertices > 6));
}

#[test]
fn progress_clamps_past_the_end() {
    let style = visual_style("electronic");
    let s = frame_state(FrameIndex(600), &ctx(), style);
    assert_eq!(s.progress, 1.0);
}
