use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::audio::pcm::{AudioFormat, AudioSynth, PcmBuffer};
use crate::audio::voice::{AdsrEnvelope, Waveform, hihat, kick, pan_gains, soft_clip, tone};
use crate::foundation::error::{BeatError, BeatResult};
use crate::schedule::timeline::{EventTimeline, NoteEvent, Role};

const BASS_ENV: AdsrEnvelope = AdsrEnvelope {
    attack: 0.01,
    decay: 0.2,
    sustain: 0.6,
    release: 0.15,
};

const PAD_ENV: AdsrEnvelope = AdsrEnvelope {
    attack: 0.4,
    decay: 0.5,
    sustain: 0.7,
    release: 0.8,
};

const PLUCK_ENV: AdsrEnvelope = AdsrEnvelope {
    attack: 0.005,
    decay: 0.25,
    sustain: 0.15,
    release: 0.2,
};

/// In-process oscillator synthesizer.
///
/// Every role maps to a fixed voice: kick for pulse, noise hat for texture, saw bass, sine pad
/// chords and a triangle pluck melody. Noise is seeded, so equal timelines and seeds give
/// identical buffers.
#[derive(Clone, Debug)]
pub struct OscillatorSynth {
    /// Seed for the hat noise.
    pub seed: u64,
    /// Master gain applied before soft clipping.
    pub gain: f32,
}

impl OscillatorSynth {
    /// Synth with the default master gain.
    pub fn new(seed: u64) -> Self {
        Self { seed, gain: 0.8 }
    }
}

impl Default for OscillatorSynth {
    fn default() -> Self {
        Self::new(0)
    }
}

impl AudioSynth for OscillatorSynth {
    #[tracing::instrument(skip_all, fields(events = timeline.events.len()))]
    fn synthesize(&self, timeline: &EventTimeline, format: AudioFormat) -> BeatResult<PcmBuffer> {
        format.validate()?;
        if !timeline.duration_secs.is_finite() || timeline.duration_secs <= 0.0 {
            return Err(BeatError::invalid_duration(format!(
                "cannot synthesize a {}s timeline",
                timeline.duration_secs
            )));
        }

        let sr = format.sample_rate;
        let frames = (timeline.duration_secs * f64::from(sr)).round() as usize;
        let mut left = vec![0.0f32; frames];
        let mut right = vec![0.0f32; frames];
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        for event in &timeline.events {
            let voice = render_event(event, sr, &mut rng);
            let (gl, gr) = pan_gains(role_pan(event.role));
            let gain = event.velocity * role_level(event.role);
            let start = (event.time_secs * f64::from(sr)).round() as usize;
            if start >= frames {
                continue;
            }
            for (i, s) in voice.iter().enumerate() {
                let Some(idx) = start.checked_add(i).filter(|idx| *idx < frames) else {
                    break;
                };
                left[idx] += s * gain * gl;
                right[idx] += s * gain * gr;
            }
        }

        let channels = usize::from(format.channels);
        let mut out = PcmBuffer::silence(format, frames);
        for (f, (l, r)) in left.iter().zip(&right).enumerate() {
            let l = soft_clip(l * self.gain);
            let r = soft_clip(r * self.gain);
            if channels == 1 {
                out.samples[f] = (l + r) * 0.5;
            } else {
                out.samples[f * 2] = l;
                out.samples[f * 2 + 1] = r;
            }
        }

        tracing::debug!(frames, peak = out.peak(), "synthesized track");
        Ok(out)
    }
}

fn render_event(event: &NoteEvent, sample_rate: u32, rng: &mut ChaCha8Rng) -> Vec<f32> {
    match event.role {
        Role::Pulse => kick(sample_rate, event.length_secs),
        Role::Texture => hihat(sample_rate, event.length_secs, rng),
        Role::Bass => mix_pitches(event, sample_rate, Waveform::Saw, &BASS_ENV),
        Role::Harmony => mix_pitches(event, sample_rate, Waveform::Sine, &PAD_ENV),
        Role::Melody => mix_pitches(event, sample_rate, Waveform::Triangle, &PLUCK_ENV),
    }
}

fn mix_pitches(
    event: &NoteEvent,
    sample_rate: u32,
    waveform: Waveform,
    env: &AdsrEnvelope,
) -> Vec<f32> {
    let pitches = event.voicing.pitches();
    if pitches.is_empty() {
        return Vec::new();
    }
    let norm = 1.0 / pitches.len() as f32;
    let mut out: Vec<f32> = Vec::new();
    for p in pitches {
        let voice = tone(sample_rate, waveform, p.frequency_hz(), event.length_secs, env);
        if out.len() < voice.len() {
            out.resize(voice.len(), 0.0);
        }
        for (o, s) in out.iter_mut().zip(voice) {
            *o += s * norm;
        }
    }
    out
}

fn role_pan(role: Role) -> f32 {
    match role {
        Role::Pulse | Role::Bass => 0.0,
        Role::Texture => 0.35,
        Role::Harmony => -0.2,
        Role::Melody => 0.2,
    }
}

fn role_level(role: Role) -> f32 {
    match role {
        Role::Pulse => 0.9,
        Role::Texture => 0.35,
        Role::Bass => 0.5,
        Role::Harmony => 0.3,
        Role::Melody => 0.4,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/synth.rs"]
mod tests;
