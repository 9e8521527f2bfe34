use rand::Rng;

use crate::foundation::error::{BeatError, BeatResult};
use crate::genre::pitch::{Pitch, parse_all};
use crate::genre::registry::GenreTemplate;
use crate::schedule::timeline::{EventTimeline, NoteEvent, Role, Voicing};

/// Pulse period: every other beat.
pub const PULSE_PERIOD_BEATS: u64 = 2;
/// Bass period: one bar of 4/4.
pub const BASS_PERIOD_BEATS: u64 = 4;
/// Chord period: two bars.
pub const HARMONY_PERIOD_BEATS: u64 = 8;
/// Melody onsets inside each chord cycle, in beats from the chord hit.
pub const MELODY_OFFSETS_BEATS: [u64; 4] = [1, 3, 5, 7];
/// Texture velocity bounds, half-open.
pub const TEXTURE_VELOCITY: std::ops::Range<f32> = 0.1..0.4;

const PULSE_VELOCITY: f32 = 1.0;
const PULSE_LENGTH_SECS: f64 = 0.1;
const TEXTURE_LENGTH_SECS: f64 = 0.05;
const BASS_VELOCITY: f32 = 0.8;
const HARMONY_VELOCITY: f32 = 0.5;
const MELODY_VELOCITY: f32 = 0.6;

/// Draw a whole-second duration uniformly from the template's inclusive range.
pub fn pick_duration<R: Rng + ?Sized>(template: &GenreTemplate, rng: &mut R) -> u32 {
    let (min, max) = template.duration_range;
    rng.gen_range(min..=max.max(min))
}

/// Lay out the four rhythmic layers of `template` over `duration_secs`.
///
/// Layers are generated independently over a shared grid of
/// `floor(duration / beat)` beats; each emits only whole periods, so every onset is
/// strictly before `duration_secs`. The result is concatenated layer by layer and is not
/// globally sorted.
#[tracing::instrument(skip(template, rng), fields(genre = template.name))]
pub fn schedule<R: Rng + ?Sized>(
    template: &GenreTemplate,
    duration_secs: f64,
    rng: &mut R,
) -> BeatResult<EventTimeline> {
    template.validate()?;
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(BeatError::invalid_duration(format!(
            "duration must be a positive number of seconds, got {duration_secs}"
        )));
    }
    if !template.accepts_duration(duration_secs) {
        let (min, max) = template.duration_range;
        return Err(BeatError::invalid_duration(format!(
            "{duration_secs}s is outside '{}' range [{min}, {max}]",
            template.name
        )));
    }

    let scale = parse_all(template.scale)?;
    let bass = parse_all(template.bass_notes)?;
    let chords = template
        .chord_progression
        .iter()
        .map(|c| parse_all(c))
        .collect::<BeatResult<Vec<_>>>()?;

    let beat = template.beat_duration_secs();
    let total_beats = (duration_secs / beat).floor() as u64;
    let mut events = Vec::new();

    push_pulse(&mut events, total_beats, beat);
    push_texture(&mut events, total_beats, beat, rng);
    push_bass(&mut events, total_beats, beat, &bass);
    push_harmony(&mut events, total_beats, beat, &chords, &scale, rng);

    tracing::debug!(
        total_beats,
        events = events.len(),
        "scheduled event timeline"
    );

    Ok(EventTimeline {
        tempo: template.tempo,
        duration_secs,
        events,
    })
}

fn push_pulse(events: &mut Vec<NoteEvent>, total_beats: u64, beat: f64) {
    for i in 0..total_beats / PULSE_PERIOD_BEATS {
        events.push(NoteEvent {
            time_secs: (i * PULSE_PERIOD_BEATS) as f64 * beat,
            role: Role::Pulse,
            voicing: Voicing::Unpitched,
            velocity: PULSE_VELOCITY,
            length_secs: PULSE_LENGTH_SECS,
        });
    }
}

fn push_texture<R: Rng + ?Sized>(
    events: &mut Vec<NoteEvent>,
    total_beats: u64,
    beat: f64,
    rng: &mut R,
) {
    let half = beat / 2.0;
    for i in 0..total_beats * 2 {
        events.push(NoteEvent {
            time_secs: i as f64 * half,
            role: Role::Texture,
            voicing: Voicing::Unpitched,
            velocity: rng.gen_range(TEXTURE_VELOCITY),
            length_secs: TEXTURE_LENGTH_SECS,
        });
    }
}

fn push_bass(events: &mut Vec<NoteEvent>, total_beats: u64, beat: f64, bass: &[Pitch]) {
    for i in 0..total_beats / BASS_PERIOD_BEATS {
        events.push(NoteEvent {
            time_secs: (i * BASS_PERIOD_BEATS) as f64 * beat,
            role: Role::Bass,
            voicing: Voicing::Note(bass[i as usize % bass.len()]),
            velocity: BASS_VELOCITY,
            length_secs: BASS_PERIOD_BEATS as f64 * beat,
        });
    }
}

fn push_harmony<R: Rng + ?Sized>(
    events: &mut Vec<NoteEvent>,
    total_beats: u64,
    beat: f64,
    chords: &[Vec<Pitch>],
    scale: &[Pitch],
    rng: &mut R,
) {
    for i in 0..total_beats / HARMONY_PERIOD_BEATS {
        let start = i * HARMONY_PERIOD_BEATS;
        events.push(NoteEvent {
            time_secs: start as f64 * beat,
            role: Role::Harmony,
            voicing: Voicing::Chord(chords[i as usize % chords.len()].clone()),
            velocity: HARMONY_VELOCITY,
            length_secs: HARMONY_PERIOD_BEATS as f64 * beat,
        });
        for offset in MELODY_OFFSETS_BEATS {
            let pitch = scale[rng.gen_range(0..scale.len())];
            events.push(NoteEvent {
                time_secs: (start + offset) as f64 * beat,
                role: Role::Melody,
                voicing: Voicing::Note(pitch),
                velocity: MELODY_VELOCITY,
                length_secs: beat,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
