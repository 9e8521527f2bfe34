use crate::genre::pitch::Pitch;

/// Rhythmic layer an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Half-time kick pulse on even beats.
    Pulse,
    /// Half-beat hat texture with randomized velocity.
    Texture,
    /// Bass note once per bar.
    Bass,
    /// Full chord once per two bars.
    Harmony,
    /// Single melody notes between chord hits.
    Melody,
}

/// What an event sounds.
#[derive(Clone, Debug, PartialEq)]
pub enum Voicing {
    /// Percussion, no pitch.
    Unpitched,
    /// One pitch.
    Note(Pitch),
    /// Several simultaneous pitches.
    Chord(Vec<Pitch>),
}

impl Voicing {
    /// Pitches sounded by this voicing (empty for percussion).
    pub fn pitches(&self) -> &[Pitch] {
        match self {
            Voicing::Unpitched => &[],
            Voicing::Note(p) => std::slice::from_ref(p),
            Voicing::Chord(ps) => ps,
        }
    }
}

/// One time-stamped trigger.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteEvent {
    /// Onset in seconds from the start of the track.
    pub time_secs: f64,
    /// Layer that produced the event.
    pub role: Role,
    /// Pitch content.
    pub voicing: Voicing,
    /// Velocity in `[0, 1]`.
    pub velocity: f32,
    /// Nominal sounding length in seconds.
    pub length_secs: f64,
}

/// Events for one render, in generation order (layer by layer).
#[derive(Clone, Debug, PartialEq)]
pub struct EventTimeline {
    /// Beats per minute the events were laid out at.
    pub tempo: u32,
    /// Track length; every event starts strictly before it.
    pub duration_secs: f64,
    /// Events, not globally sorted.
    pub events: Vec<NoteEvent>,
}

impl EventTimeline {
    /// Chronologically sorted copy; ties keep generation order.
    pub fn sorted(&self) -> Vec<NoteEvent> {
        let mut out = self.events.clone();
        out.sort_by(|a, b| a.time_secs.total_cmp(&b.time_secs));
        out
    }

    /// Events produced by `role`, in generation order.
    pub fn events_for(&self, role: Role) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(move |e| e.role == role)
    }

    /// Number of events produced by `role`.
    pub fn count(&self, role: Role) -> usize {
        self.events_for(role).count()
    }

    /// Continuous beat position at `time_secs`.
    pub fn beat_at(&self, time_secs: f64) -> f64 {
        beat_phase(time_secs, self.tempo)
    }
}

/// Elapsed musical beats at `time_secs` for `tempo` BPM.
pub fn beat_phase(time_secs: f64, tempo: u32) -> f64 {
    time_secs * (f64::from(tempo) / 60.0)
}
