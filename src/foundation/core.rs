use crate::foundation::error::{BeatError, BeatResult};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Absolute 0-based frame index within one segment.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> BeatResult<Self> {
        if den == 0 {
            return Err(BeatError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(BeatError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number frame rate.
    pub const fn integer(num: u32) -> Self {
        Self { num, den: 1 }
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Playback time of `frame` in seconds.
    pub fn frame_time_secs(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) / self.as_f64()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// 1920x1080 output.
    pub const FULL_HD: Canvas = Canvas {
        width: 1920,
        height: 1080,
    };

    /// Center point of the canvas.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Reject sizes the raster backend or a yuv420p encode cannot handle.
    pub fn validate(self) -> BeatResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BeatError::validation("canvas width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(BeatError::validation(
                "canvas width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(BeatError::validation("canvas width/height must fit in u16"));
        }
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::FULL_HD
    }
}

/// Straight (non-premultiplied) RGB8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form used in generated SVG.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Straight RGBA8 with the given alpha.
    pub fn with_alpha(self, a: u8) -> [u8; 4] {
        [self.r, self.g, self.b, a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
