use std::f64::consts::{PI, TAU};

use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rgb8};
use crate::genre::registry::VisualStyle;
use crate::schedule::timeline::beat_phase;

/// Visualizer bars across the bottom of the frame.
pub const BAR_COUNT: usize = 64;
/// Concentric rotating rings.
pub const SHAPE_COUNT: usize = 3;
/// Ring radii, innermost first.
pub const SHAPE_RADII: [f64; SHAPE_COUNT] = [150.0, 200.0, 250.0];
/// Fixed particle alpha.
pub const PARTICLE_ALPHA: f32 = 0.6;
/// Fixed ring stroke alpha.
pub const SHAPE_ALPHA: f32 = 0.4;

const PARTICLE_BASE_RADIUS: f64 = 300.0;
const PARTICLE_RADIUS_SWING: f64 = 100.0;
const PARTICLE_BASE_SIZE: f64 = 5.0;
const PARTICLE_SIZE_SWING: f64 = 3.0;

/// Playback parameters shared by every frame of the main segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Frame rate of the segment.
    pub fps: Fps,
    /// Tempo in BPM.
    pub tempo: u32,
    /// Length of the main segment in seconds.
    pub duration_secs: f64,
    /// Output size; particles and rings are centered on it.
    pub canvas: Canvas,
}

/// One visualizer bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    /// Oscillator phase in beats.
    pub phase: f64,
    /// Height in pixels.
    pub height: f64,
    /// Fill color.
    pub color: Rgb8,
}

/// One orbiting particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Center in canvas pixels.
    pub center: Point,
    /// Radius in pixels.
    pub size: f64,
    /// Fill color.
    pub color: Rgb8,
    /// Fill alpha.
    pub alpha: f32,
}

/// One rotating ring outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    /// Distance from canvas center to the vertices.
    pub radius: f64,
    /// Rotation in radians.
    pub rotation: f64,
    /// Outline vertex count (6 for hexagons, more for circles).
    pub vertices: usize,
    /// Stroke color.
    pub color: Rgb8,
    /// Stroke alpha.
    pub alpha: f32,
}

/// Everything drawable for one main-segment frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescription {
    /// Playback time in seconds.
    pub time_secs: f64,
    /// Continuous beat position.
    pub beat: f64,
    /// Global envelope shared by all bars, in `[0, 1]`.
    pub intensity: f64,
    /// Fraction of the main segment elapsed, in `[0, 1]`.
    pub progress: f64,
    /// Background fill.
    pub background: Rgb8,
    /// Visualizer bars, left to right.
    pub bars: Vec<Bar>,
    /// Orbiting particles.
    pub particles: Vec<Particle>,
    /// Rotating rings, innermost first.
    pub rings: Vec<Ring>,
}

/// Compute the scene for `frame` of the main segment.
///
/// Pure: identical inputs always produce bit-identical output.
pub fn frame_state(frame: FrameIndex, ctx: &FrameContext, style: &VisualStyle) -> SceneDescription {
    let time = ctx.fps.frame_time_secs(frame);
    let beat = beat_phase(time, ctx.tempo);
    let intensity = unit_sine(beat * PI);
    let progress = if ctx.duration_secs > 0.0 {
        (time / ctx.duration_secs).clamp(0.0, 1.0)
    } else {
        1.0
    };

    SceneDescription {
        time_secs: time,
        beat,
        intensity,
        progress,
        background: style.background,
        bars: bars(beat, intensity, style),
        particles: particles(time, beat, ctx.canvas, style),
        rings: rings(beat, style),
    }
}

fn unit_sine(x: f64) -> f64 {
    x.sin() * 0.5 + 0.5
}

fn bars(beat: f64, intensity: f64, style: &VisualStyle) -> Vec<Bar> {
    let palette = style.palette;
    (0..BAR_COUNT)
        .map(|i| {
            let frac = i as f64 / BAR_COUNT as f64;
            let phase = beat + frac * 4.0;
            let height = unit_sine(phase * PI) * style.wave_amplitude * intensity;
            let color_idx = ((frac * palette.len() as f64).floor() as usize).min(palette.len() - 1);
            Bar {
                phase,
                height,
                color: palette[color_idx],
            }
        })
        .collect()
}

fn particles(time: f64, beat: f64, canvas: Canvas, style: &VisualStyle) -> Vec<Particle> {
    let palette = style.palette;
    let n = style.particle_count as usize;
    let center = canvas.center();
    (0..n)
        .map(|i| {
            let fi = i as f64;
            let angle = (fi / n as f64) * TAU + time * 0.5;
            let radius = PARTICLE_BASE_RADIUS + (beat + fi).sin() * PARTICLE_RADIUS_SWING;
            Particle {
                center: Point::new(
                    center.x + angle.cos() * radius,
                    center.y + angle.sin() * radius,
                ),
                size: PARTICLE_BASE_SIZE + (beat * 2.0 + fi).sin() * PARTICLE_SIZE_SWING,
                color: palette[i % palette.len()],
                alpha: PARTICLE_ALPHA,
            }
        })
        .collect()
}

fn rings(beat: f64, style: &VisualStyle) -> Vec<Ring> {
    let palette = style.palette;
    SHAPE_RADII
        .iter()
        .enumerate()
        .map(|(k, &radius)| Ring {
            radius,
            rotation: beat * 0.5 + (k as f64 / SHAPE_COUNT as f64) * TAU,
            vertices: style.shape_family.vertex_count(),
            color: palette[k % palette.len()],
            alpha: SHAPE_ALPHA,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/visual/frame.rs"]
mod tests;
