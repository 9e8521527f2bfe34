//! Oscillator, envelope and percussion primitives.

use std::f64::consts::PI;

use rand::Rng;

/// Waveform shapes used by the pitched voices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    /// Pure sine.
    Sine,
    /// Rising ramp.
    Saw,
    /// Symmetric triangle.
    Triangle,
}

/// One sample of `waveform` at `phase` in `[0, 1)`.
pub fn oscillator(waveform: Waveform, phase: f64) -> f64 {
    match waveform {
        Waveform::Sine => (phase * 2.0 * PI).sin(),
        Waveform::Saw => 2.0 * phase - 1.0,
        Waveform::Triangle => {
            if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            }
        }
    }
}

/// Attack-decay-sustain-release envelope; times in seconds, sustain a level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrEnvelope {
    /// Ramp from 0 to 1.
    pub attack: f64,
    /// Ramp from 1 to `sustain`.
    pub decay: f64,
    /// Level held until the note ends.
    pub sustain: f64,
    /// Ramp from `sustain` to 0 after the note ends.
    pub release: f64,
}

impl AdsrEnvelope {
    /// Amplitude at `t` seconds into a note held for `note_duration` seconds.
    pub fn amplitude(&self, t: f64, note_duration: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }

        if t < self.attack {
            if self.attack <= 0.0 { 1.0 } else { t / self.attack }
        } else if t < self.attack + self.decay {
            if self.decay <= 0.0 {
                self.sustain
            } else {
                let decay_t = (t - self.attack) / self.decay;
                1.0 - decay_t * (1.0 - self.sustain)
            }
        } else if t < note_duration {
            self.sustain
        } else if t < note_duration + self.release {
            if self.release <= 0.0 {
                0.0
            } else {
                let release_t = (t - note_duration) / self.release;
                self.sustain * (1.0 - release_t)
            }
        } else {
            0.0
        }
    }

    /// Sounding length including the release tail.
    pub fn total_duration(&self, note_duration: f64) -> f64 {
        note_duration + self.release
    }
}

/// Sine kick with an exponential 150 Hz -> 50 Hz sweep, at least a quarter second long.
pub fn kick(sample_rate: u32, length_secs: f64) -> Vec<f32> {
    let sr = f64::from(sample_rate);
    let duration = length_secs.max(0.25);
    let n = (sr * duration) as usize;
    let mut out = Vec::with_capacity(n);
    let mut phase = 0.0_f64;

    for i in 0..n {
        let norm = (i as f64 / sr) / duration;
        let freq = 50.0 + 100.0 * (-norm * 8.0).exp();
        let amp = (-norm * 10.0).exp();
        phase += freq / sr;
        out.push(((phase * 2.0 * PI).sin() * amp) as f32);
    }
    out
}

/// High-passed noise burst, `length_secs` long.
pub fn hihat<R: Rng + ?Sized>(sample_rate: u32, length_secs: f64, rng: &mut R) -> Vec<f32> {
    let sr = f64::from(sample_rate);
    let n = (sr * length_secs) as usize;
    let mut out = Vec::with_capacity(n);

    // one-pole high-pass
    let mut prev_input = 0.0_f64;
    let mut prev_output = 0.0_f64;
    let alpha = 0.85;

    for i in 0..n {
        let norm = (i as f64 / sr) / length_secs;
        let amp = (-norm * 6.0).exp();
        let noise: f64 = rng.gen_range(-1.0..1.0);
        let filtered = alpha * (prev_output + noise - prev_input);
        prev_input = noise;
        prev_output = filtered;
        out.push((filtered * amp) as f32);
    }
    out
}

/// Enveloped oscillator tone at `freq_hz`, held for `hold_secs` plus the release.
pub fn tone(
    sample_rate: u32,
    waveform: Waveform,
    freq_hz: f64,
    hold_secs: f64,
    env: &AdsrEnvelope,
) -> Vec<f32> {
    let sr = f64::from(sample_rate);
    let n = (sr * env.total_duration(hold_secs)) as usize;
    let step = freq_hz / sr;
    let mut out = Vec::with_capacity(n);
    let mut phase = 0.0_f64;

    for i in 0..n {
        let t = i as f64 / sr;
        out.push((oscillator(waveform, phase) * env.amplitude(t, hold_secs)) as f32);
        phase = (phase + step).fract();
    }
    out
}

/// Smooth saturation into `(-1, 1)`.
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Equal-power gains for `pan` in `[-1, 1]`, left first.
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * std::f32::consts::FRAC_PI_4;
    (angle.cos(), angle.sin())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/voice.rs"]
mod tests;
