use crate::foundation::error::{BeatError, BeatResult};

/// An equal-tempered pitch, stored as a MIDI note number (`C4 = 60`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(pub u8);

impl Pitch {
    /// Parse scientific pitch notation: a letter, an optional `#`/`b`, and an octave
    /// (`C4`, `F#3`, `Bb2`, `A-1` is not supported).
    pub fn parse(name: &str) -> BeatResult<Self> {
        let bad = || BeatError::invalid_template(format!("unparseable pitch name '{name}'"));

        let mut chars = name.chars();
        let letter = chars.next().ok_or_else(bad)?;
        let base: i32 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(bad()),
        };

        let rest = chars.as_str();
        let (accidental, octave_str) = match rest.as_bytes().first() {
            Some(b'#') => (1, &rest[1..]),
            Some(b'b') => (-1, &rest[1..]),
            _ => (0, rest),
        };
        if octave_str.is_empty() || !octave_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let octave: i32 = octave_str.parse().map_err(|_| bad())?;

        let midi = (octave + 1) * 12 + base + accidental;
        u8::try_from(midi)
            .ok()
            .filter(|m| *m <= 127)
            .map(Pitch)
            .ok_or_else(bad)
    }

    /// MIDI note number.
    pub fn midi(self) -> u8 {
        self.0
    }

    /// Frequency in Hz (`A4 = 440`).
    pub fn frequency_hz(self) -> f64 {
        440.0 * 2f64.powf((f64::from(self.0) - 69.0) / 12.0)
    }
}

/// Parse every name in `names`, failing on the first bad one.
pub fn parse_all(names: &[&str]) -> BeatResult<Vec<Pitch>> {
    names.iter().map(|n| Pitch::parse(n)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/genre/pitch.rs"]
mod tests;
