use crate::foundation::core::FrameIndex;

/// Which edge of the video a title card belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeMode {
    /// Fades in at the start.
    Intro,
    /// Fades out at the end.
    Outro,
}

impl EdgeMode {
    /// Headline text.
    pub fn title(self) -> &'static str {
        match self {
            EdgeMode::Intro => "GENERATED MUSIC",
            EdgeMode::Outro => "THANKS FOR WATCHING",
        }
    }

    /// Secondary line under the headline.
    pub fn subtitle(self) -> &'static str {
        match self {
            EdgeMode::Intro => "procedural audio + visuals",
            EdgeMode::Outro => "made with beatframe",
        }
    }
}

/// Everything drawable for one intro/outro frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleCardDescription {
    /// Intro or outro.
    pub mode: EdgeMode,
    /// `frame / total_frames`.
    pub progress: f64,
    /// Text opacity in `[0, 1]`.
    pub opacity: f64,
    /// Headline text.
    pub title: &'static str,
    /// Secondary text.
    pub subtitle: &'static str,
}

/// Title card state for `frame` of an edge segment with `total_frames` frames.
///
/// Intro text reaches full opacity halfway through; outro text is gone by then.
pub fn edge_frame_state(frame: FrameIndex, total_frames: u64, mode: EdgeMode) -> TitleCardDescription {
    let progress = frame.0 as f64 / total_frames.max(1) as f64;
    let opacity = match mode {
        EdgeMode::Intro => (progress * 2.0).min(1.0),
        EdgeMode::Outro => (1.0 - progress * 2.0).max(0.0),
    };
    TitleCardDescription {
        mode,
        progress,
        opacity,
        title: mode.title(),
        subtitle: mode.subtitle(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visual/title.rs"]
mod tests;
