use crate::audio::pcm::AudioFormat;
use crate::foundation::error::{BeatError, BeatResult};

const PRESETS: [&str; 9] = [
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

/// Codec settings shared by every segment of one request.
///
/// Segments are joined without re-encoding, so they must all be produced with the same
/// values.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeParams {
    /// ffmpeg video encoder name.
    pub video_codec: String,
    /// x264 preset.
    pub preset: String,
    /// Constant rate factor, `0..=51`.
    pub crf: u8,
    /// Output pixel format.
    pub pix_fmt: String,
    /// ffmpeg audio encoder name.
    pub audio_codec: String,
    /// Audio bitrate in ffmpeg notation (`192k`).
    pub audio_bitrate: String,
    /// Output sample rate.
    pub sample_rate: u32,
    /// Output channel count.
    pub channels: u16,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            pix_fmt: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            sample_rate: 44_100,
            channels: 2,
        }
    }
}

impl EncodeParams {
    /// Reject values ffmpeg would choke on late in the pipeline.
    pub fn validate(&self) -> BeatResult<()> {
        for (name, v) in [
            ("video_codec", &self.video_codec),
            ("pix_fmt", &self.pix_fmt),
            ("audio_codec", &self.audio_codec),
            ("audio_bitrate", &self.audio_bitrate),
        ] {
            if v.trim().is_empty() {
                return Err(BeatError::validation(format!(
                    "encode param '{name}' must be non-empty"
                )));
            }
        }
        if !PRESETS.contains(&self.preset.as_str()) {
            return Err(BeatError::validation(format!(
                "unknown x264 preset '{}'",
                self.preset
            )));
        }
        if self.crf > 51 {
            return Err(BeatError::validation(format!(
                "crf must be in 0..=51, got {}",
                self.crf
            )));
        }
        self.audio_format().validate()
    }

    /// Sample format the synthesizer should produce for these params.
    pub fn audio_format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Output video codec arguments.
    pub fn video_args(&self) -> Vec<String> {
        vec![
            "-c:v".into(),
            self.video_codec.clone(),
            "-preset".into(),
            self.preset.clone(),
            "-crf".into(),
            self.crf.to_string(),
            "-pix_fmt".into(),
            self.pix_fmt.clone(),
        ]
    }

    /// Output audio codec arguments.
    pub fn audio_args(&self) -> Vec<String> {
        vec![
            "-c:a".into(),
            self.audio_codec.clone(),
            "-b:a".into(),
            self.audio_bitrate.clone(),
            "-ar".into(),
            self.sample_rate.to_string(),
            "-ac".into(),
            self.channels.to_string(),
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/params.rs"]
mod tests;
