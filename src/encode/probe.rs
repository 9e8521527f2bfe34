use std::path::{Path, PathBuf};

use crate::foundation::error::{BeatError, BeatResult, Stage};

/// Stream parameters of an encoded segment, as reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentProbe {
    /// Video width in pixels.
    pub width: u32,
    /// Video height in pixels.
    pub height: u32,
    /// Frame rate numerator.
    pub fps_num: u32,
    /// Frame rate denominator.
    pub fps_den: u32,
    /// Video pixel format.
    pub pix_fmt: String,
    /// Video codec short name (`h264`).
    pub video_codec: String,
    /// Audio codec short name, if an audio stream exists.
    pub audio_codec: Option<String>,
    /// Audio sample rate, if an audio stream exists.
    pub sample_rate: Option<u32>,
    /// Audio channel count, if an audio stream exists.
    pub channels: Option<u16>,
    /// Container duration in seconds.
    pub duration_secs: f64,
}

impl SegmentProbe {
    fn fields(&self) -> [(&'static str, String); 8] {
        [
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("frame rate", format!("{}/{}", self.fps_num, self.fps_den)),
            ("pixel format", self.pix_fmt.clone()),
            ("video codec", self.video_codec.clone()),
            ("audio codec", opt(&self.audio_codec)),
            ("sample rate", opt(&self.sample_rate)),
            ("channels", opt(&self.channels)),
        ]
    }
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string())
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(bytes: &[u8]) -> BeatResult<SegmentProbe> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        codec_name: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        pix_fmt: Option<String>,
        sample_rate: Option<String>,
        channels: Option<u16>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let bad = |msg: String| BeatError::collaborator(Stage::Concat, msg);

    let parsed: ProbeOut = serde_json::from_slice(bytes)
        .map_err(|e| bad(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| bad("no video stream found".to_string()))?;
    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let width = video
        .width
        .ok_or_else(|| bad("missing video width from ffprobe".to_string()))?;
    let height = video
        .height
        .ok_or_else(|| bad("missing video height from ffprobe".to_string()))?;
    let (fps_num, fps_den) = parse_ff_ratio(video.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| bad("invalid video r_frame_rate".to_string()))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(SegmentProbe {
        width,
        height,
        fps_num,
        fps_den,
        pix_fmt: video.pix_fmt.clone().unwrap_or_default(),
        video_codec: video.codec_name.clone().unwrap_or_default(),
        audio_codec: audio.and_then(|a| a.codec_name.clone()),
        sample_rate: audio
            .and_then(|a| a.sample_rate.as_deref())
            .and_then(|s| s.parse().ok()),
        channels: audio.and_then(|a| a.channels),
        duration_secs,
    })
}

/// Require every probe to match the first one's codec parameters.
pub fn verify_matching_params(probes: &[(PathBuf, SegmentProbe)]) -> BeatResult<()> {
    let Some((first_path, first)) = probes.first() else {
        return Err(BeatError::validation("no segments to concatenate"));
    };
    let reference = first.fields();

    for (path, probe) in &probes[1..] {
        for ((name, want), (_, got)) in reference.iter().zip(probe.fields()) {
            if *want != got {
                return Err(BeatError::mismatch(format!(
                    "{name} of '{}' is {got}, but '{}' has {want}",
                    display_name(path),
                    display_name(first_path),
                )));
            }
        }
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/probe.rs"]
mod tests;
