use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{BeatError, BeatResult, Stage};
use crate::schedule::timeline::EventTimeline;

/// Output sample format shared by the synthesizer and the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AudioFormat {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl AudioFormat {
    /// 44.1 kHz stereo.
    pub const CD: AudioFormat = AudioFormat {
        sample_rate: 44_100,
        channels: 2,
    };

    /// Reject formats the synthesizer cannot produce.
    pub fn validate(self) -> BeatResult<()> {
        if self.sample_rate == 0 {
            return Err(BeatError::validation("audio sample_rate must be > 0"));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(BeatError::validation(format!(
                "audio channels must be 1 or 2, got {}",
                self.channels
            )));
        }
        Ok(())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::CD
    }
}

/// Interleaved `f32` PCM in `[-1, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmBuffer {
    /// Layout of `samples`.
    pub format: AudioFormat,
    /// Interleaved samples, `frames * channels` long.
    pub samples: Vec<f32>,
}

impl PcmBuffer {
    /// Silent buffer holding `frames` sample frames.
    pub fn silence(format: AudioFormat, frames: usize) -> Self {
        Self {
            format,
            samples: vec![0.0; frames * usize::from(format.channels)],
        }
    }

    /// Sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.format.channels.max(1))
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.format.sample_rate)
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    /// Write the buffer as a 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> BeatResult<()> {
        let spec = hound::WavSpec {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let write = || -> anyhow::Result<()> {
            let mut writer = hound::WavWriter::create(path, spec)
                .with_context(|| format!("create wav '{}'", path.display()))?;
            for &s in &self.samples {
                let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
                writer.write_sample(v).context("write wav sample")?;
            }
            writer.finalize().context("finalize wav")?;
            Ok(())
        };
        write().map_err(|e| BeatError::from(e).at_stage(Stage::Synthesize))
    }
}

/// Audio synthesis collaborator: events in, PCM out.
pub trait AudioSynth: Send + Sync {
    /// Render `timeline` into a buffer exactly `timeline.duration_secs` long.
    fn synthesize(&self, timeline: &EventTimeline, format: AudioFormat) -> BeatResult<PcmBuffer>;
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;
