use crate::foundation::core::Rgb8;
use crate::foundation::error::{BeatError, BeatResult};
use crate::genre::pitch::parse_all;

/// Genre used when a visual-style lookup misses.
pub const DEFAULT_GENRE: &str = "electronic";

/// Declarative musical parameters for one genre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenreTemplate {
    /// Registry key.
    pub name: &'static str,
    /// Beats per minute.
    pub tempo: u32,
    /// Pitch pool for melody notes.
    pub scale: &'static [&'static str],
    /// Bass line, cycled one note per bar.
    pub bass_notes: &'static [&'static str],
    /// Chords, cycled one per two bars.
    pub chord_progression: &'static [&'static [&'static str]],
    /// Inclusive `[min, max]` length in whole seconds.
    pub duration_range: (u32, u32),
}

impl GenreTemplate {
    /// Check the structural invariants the scheduler relies on.
    pub fn validate(&self) -> BeatResult<()> {
        if self.tempo == 0 {
            return Err(BeatError::invalid_template(format!(
                "genre '{}' has zero tempo",
                self.name
            )));
        }
        if self.scale.is_empty() {
            return Err(BeatError::invalid_template(format!(
                "genre '{}' has an empty scale",
                self.name
            )));
        }
        if self.bass_notes.is_empty() {
            return Err(BeatError::invalid_template(format!(
                "genre '{}' has no bass notes",
                self.name
            )));
        }
        if self.chord_progression.is_empty() {
            return Err(BeatError::invalid_template(format!(
                "genre '{}' has an empty chord progression",
                self.name
            )));
        }
        if let Some(i) = self.chord_progression.iter().position(|c| c.is_empty()) {
            return Err(BeatError::invalid_template(format!(
                "genre '{}' chord {i} is empty",
                self.name
            )));
        }
        let (min, max) = self.duration_range;
        if min == 0 || min > max {
            return Err(BeatError::invalid_template(format!(
                "genre '{}' has invalid duration range [{min}, {max}]",
                self.name
            )));
        }

        parse_all(self.scale)?;
        parse_all(self.bass_notes)?;
        for chord in self.chord_progression {
            parse_all(chord)?;
        }
        Ok(())
    }

    /// Length of one beat in seconds.
    pub fn beat_duration_secs(&self) -> f64 {
        60.0 / f64::from(self.tempo)
    }

    /// `true` when `secs` lies inside the inclusive duration range.
    pub fn accepts_duration(&self, secs: f64) -> bool {
        let (min, max) = self.duration_range;
        secs >= f64::from(min) && secs <= f64::from(max)
    }
}

/// Shape drawn by the rotating ring layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeFamily {
    /// Hexagons.
    Geometric,
    /// Circles.
    Organic,
    /// Circles.
    Sharp,
    /// Circles.
    Round,
}

impl ShapeFamily {
    /// Vertex count of the outline for this family.
    pub fn vertex_count(self) -> usize {
        match self {
            ShapeFamily::Geometric => 6,
            ShapeFamily::Organic | ShapeFamily::Sharp | ShapeFamily::Round => CIRCLE_VERTICES,
        }
    }
}

/// Segments used to approximate a circle outline.
pub const CIRCLE_VERTICES: usize = 48;

/// Declarative rendering parameters for one genre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualStyle {
    /// Registry key.
    pub name: &'static str,
    /// Foreground colors, indexed by bar position, particle and ring.
    pub palette: &'static [Rgb8],
    /// Solid frame background.
    pub background: Rgb8,
    /// Ring outline family.
    pub shape_family: ShapeFamily,
    /// Number of orbiting particles.
    pub particle_count: u32,
    /// Peak bar height in pixels.
    pub wave_amplitude: f64,
}

impl VisualStyle {
    /// Check the structural invariants the frame generator relies on.
    pub fn validate(&self) -> BeatResult<()> {
        if self.palette.is_empty() {
            return Err(BeatError::invalid_template(format!(
                "style '{}' has an empty palette",
                self.name
            )));
        }
        if self.particle_count == 0 {
            return Err(BeatError::invalid_template(format!(
                "style '{}' has no particles",
                self.name
            )));
        }
        if !(self.wave_amplitude.is_finite() && self.wave_amplitude > 0.0) {
            return Err(BeatError::invalid_template(format!(
                "style '{}' wave amplitude must be positive",
                self.name
            )));
        }
        Ok(())
    }
}

static TEMPLATES: &[GenreTemplate] = &[
    GenreTemplate {
        name: "electronic",
        tempo: 128,
        scale: &["C4", "D4", "Eb4", "F4", "G4", "Ab4", "Bb4", "C5"],
        bass_notes: &["C2", "C2", "Ab1", "Bb1"],
        chord_progression: &[
            &["C4", "Eb4", "G4"],
            &["Ab3", "C4", "Eb4"],
            &["Bb3", "D4", "F4"],
            &["G3", "Bb3", "D4"],
        ],
        duration_range: (10, 45),
    },
    GenreTemplate {
        name: "ambient",
        tempo: 72,
        scale: &["D4", "E4", "F#4", "A4", "B4", "D5"],
        bass_notes: &["D2", "B1", "G1", "A1"],
        chord_progression: &[
            &["D4", "F#4", "A4", "C#5"],
            &["B3", "D4", "F#4", "A4"],
            &["G3", "B3", "D4", "F#4"],
            &["A3", "C#4", "E4"],
        ],
        duration_range: (20, 60),
    },
    GenreTemplate {
        name: "rock",
        tempo: 120,
        scale: &["E4", "G4", "A4", "B4", "D5", "E5"],
        bass_notes: &["E2", "E2", "C2", "D2"],
        chord_progression: &[
            &["E3", "B3", "E4"],
            &["C3", "G3", "C4"],
            &["D3", "A3", "D4"],
            &["A2", "E3", "A3"],
        ],
        duration_range: (15, 45),
    },
    GenreTemplate {
        name: "jazz",
        tempo: 96,
        scale: &["F4", "G4", "A4", "Bb4", "C5", "D5", "E5"],
        bass_notes: &["F2", "D2", "G2", "C2"],
        chord_progression: &[
            &["F3", "A3", "C4", "E4"],
            &["D3", "F3", "A3", "C4"],
            &["G3", "Bb3", "D4", "F4"],
            &["C3", "E3", "G3", "Bb3"],
        ],
        duration_range: (20, 50),
    },
    GenreTemplate {
        name: "hiphop",
        tempo: 90,
        scale: &["A3", "C4", "D4", "E4", "G4", "A4"],
        bass_notes: &["A1", "A1", "F1", "G1"],
        chord_progression: &[
            &["A3", "C4", "E4"],
            &["F3", "A3", "C4"],
            &["G3", "B3", "D4"],
        ],
        duration_range: (15, 45),
    },
    GenreTemplate {
        name: "lofi",
        tempo: 80,
        scale: &["Eb4", "F4", "G4", "Bb4", "C5"],
        bass_notes: &["Eb2", "C2", "Ab1", "Bb1"],
        chord_progression: &[
            &["Eb3", "G3", "Bb3", "D4"],
            &["C3", "Eb3", "G3", "Bb3"],
            &["Ab2", "C3", "Eb3", "G3"],
            &["Bb2", "D3", "F3", "Ab3"],
        ],
        duration_range: (20, 60),
    },
];

static STYLES: &[VisualStyle] = &[
    VisualStyle {
        name: "electronic",
        palette: &[
            Rgb8::new(0, 255, 255),
            Rgb8::new(255, 0, 255),
            Rgb8::new(0, 128, 255),
            Rgb8::new(255, 255, 0),
        ],
        background: Rgb8::new(10, 10, 30),
        shape_family: ShapeFamily::Geometric,
        particle_count: 100,
        wave_amplitude: 200.0,
    },
    VisualStyle {
        name: "ambient",
        palette: &[
            Rgb8::new(100, 150, 200),
            Rgb8::new(150, 200, 220),
            Rgb8::new(200, 220, 240),
        ],
        background: Rgb8::new(20, 30, 50),
        shape_family: ShapeFamily::Organic,
        particle_count: 50,
        wave_amplitude: 100.0,
    },
    VisualStyle {
        name: "rock",
        palette: &[
            Rgb8::new(255, 50, 50),
            Rgb8::new(255, 150, 0),
            Rgb8::new(200, 200, 200),
        ],
        background: Rgb8::new(20, 10, 10),
        shape_family: ShapeFamily::Sharp,
        particle_count: 80,
        wave_amplitude: 250.0,
    },
    VisualStyle {
        name: "jazz",
        palette: &[
            Rgb8::new(200, 150, 50),
            Rgb8::new(150, 100, 50),
            Rgb8::new(255, 200, 100),
        ],
        background: Rgb8::new(30, 20, 10),
        shape_family: ShapeFamily::Round,
        particle_count: 60,
        wave_amplitude: 150.0,
    },
    VisualStyle {
        name: "hiphop",
        palette: &[
            Rgb8::new(255, 215, 0),
            Rgb8::new(255, 255, 255),
            Rgb8::new(180, 0, 255),
        ],
        background: Rgb8::new(15, 15, 15),
        shape_family: ShapeFamily::Geometric,
        particle_count: 70,
        wave_amplitude: 220.0,
    },
    VisualStyle {
        name: "lofi",
        palette: &[
            Rgb8::new(255, 180, 160),
            Rgb8::new(180, 160, 255),
            Rgb8::new(160, 220, 200),
        ],
        background: Rgb8::new(35, 30, 45),
        shape_family: ShapeFamily::Round,
        particle_count: 40,
        wave_amplitude: 120.0,
    },
];

/// Registered genre names, in table order.
pub fn genre_names() -> impl Iterator<Item = &'static str> {
    TEMPLATES.iter().map(|t| t.name)
}

/// Look up the musical template for `name`.
///
/// Unregistered names are rejected rather than coerced to [`DEFAULT_GENRE`].
pub fn genre_template(name: &str) -> BeatResult<&'static GenreTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| BeatError::UnknownGenre(name.to_string()))
}

/// Look up the visual style for `name`, falling back to [`DEFAULT_GENRE`].
pub fn visual_style(name: &str) -> &'static VisualStyle {
    if let Some(style) = STYLES.iter().find(|s| s.name == name) {
        return style;
    }
    tracing::warn!(genre = name, fallback = DEFAULT_GENRE, "no visual style for genre");
    default_style()
}

fn default_style() -> &'static VisualStyle {
    // The registry test pins DEFAULT_GENRE into STYLES.
    STYLES
        .iter()
        .find(|s| s.name == DEFAULT_GENRE)
        .unwrap_or(&STYLES[0])
}

/// Resolve both tables for a generation request.
///
/// Both lookups must hit; the visual fallback never applies here.
pub fn resolve(name: &str) -> BeatResult<(&'static GenreTemplate, &'static VisualStyle)> {
    let template = genre_template(name)?;
    let style = STYLES
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| BeatError::invalid_template(format!("genre '{name}' has no visual style")))?;
    Ok((template, style))
}

/// Validate every entry and the one-to-one key correspondence of both tables.
pub fn validate_registry() -> BeatResult<()> {
    for t in TEMPLATES {
        t.validate()?;
        if !STYLES.iter().any(|s| s.name == t.name) {
            return Err(BeatError::invalid_template(format!(
                "genre '{}' has no visual style",
                t.name
            )));
        }
    }
    for s in STYLES {
        s.validate()?;
        if !TEMPLATES.iter().any(|t| t.name == s.name) {
            return Err(BeatError::invalid_template(format!(
                "style '{}' has no genre template",
                s.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/genre/registry.rs"]
mod tests;
