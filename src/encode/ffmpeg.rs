use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::Context as _;

use crate::encode::encoder::{MediaEncoder, SegmentAudio, SegmentJob};
use crate::encode::params::EncodeParams;
use crate::encode::probe::{SegmentProbe, parse_probe_json};
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Fps;
use crate::foundation::error::{BeatError, BeatResult, Stage};

/// Encoder driving the system `ffmpeg` and `ffprobe` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    /// `ffmpeg` executable.
    pub ffmpeg: PathBuf,
    /// `ffprobe` executable.
    pub ffprobe: PathBuf,
    /// How often a running child is checked for exit or cancellation.
    pub poll_interval: Duration,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            poll_interval: Duration::from_millis(20),
        }
    }
}

impl FfmpegEncoder {
    /// Default encoder, failing early when either binary is missing from `PATH`.
    pub fn detect() -> BeatResult<Self> {
        if !is_ffmpeg_on_path() {
            return Err(BeatError::collaborator(
                Stage::Encode,
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }
        if !is_ffprobe_on_path() {
            return Err(BeatError::collaborator(
                Stage::Concat,
                "ffprobe is required to verify segments, but was not found on PATH",
            ));
        }
        Ok(Self::default())
    }

    /// Full argument list for encoding `job`.
    pub fn segment_args(&self, job: &SegmentJob, params: &EncodeParams) -> BeatResult<Vec<String>> {
        if job.frame_count == 0 {
            return Err(BeatError::validation("segment must contain at least one frame"));
        }
        job.canvas.validate()?;
        params.validate()?;

        let pattern = job.frames_dir.join("frame_%06d.png");
        let mut args: Vec<String> = vec!["-y".into(), "-loglevel".into(), "error".into()];
        push_input_fps(&mut args, job.fps);
        args.extend(["-i".into(), pattern.to_string_lossy().into_owned()]);

        let clip = match &job.audio {
            SegmentAudio::Silence { secs } => {
                args.extend([
                    "-f".into(),
                    "lavfi".into(),
                    "-t".into(),
                    format_secs(*secs),
                    "-i".into(),
                    format!(
                        "anullsrc=r={}:cl={}",
                        params.sample_rate,
                        channel_layout(params.channels)
                    ),
                ]);
                None
            }
            SegmentAudio::Track(path) => {
                args.extend(["-i".into(), path.to_string_lossy().into_owned()]);
                Some("-shortest")
            }
        };

        args.extend([
            "-map".into(),
            "0:v:0".into(),
            "-map".into(),
            "1:a:0".into(),
            "-frames:v".into(),
            job.frame_count.to_string(),
            "-r".into(),
            format!("{}/{}", job.fps.num, job.fps.den),
            "-s".into(),
            format!("{}x{}", job.canvas.width, job.canvas.height),
        ]);
        args.extend(params.video_args());
        args.extend(params.audio_args());
        if let Some(flag) = clip {
            args.push(flag.into());
        }
        args.extend(["-movflags".into(), "+faststart".into()]);
        args.push(job.out_path.to_string_lossy().into_owned());
        Ok(args)
    }

    /// Full argument list for joining the segments listed in `list_path` into `out`.
    pub fn concat_args(list_path: &Path, out: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            list_path.to_string_lossy().into_owned(),
            "-c".into(),
            "copy".into(),
            "-movflags".into(),
            "+faststart".into(),
            out.to_string_lossy().into_owned(),
        ]
    }

    fn run(&self, args: &[String], stage: Stage, cancel: &CancelToken) -> BeatResult<()> {
        tracing::debug!(stage = %stage, args = %args.join(" "), "running ffmpeg");

        let mut child = Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BeatError::collaborator(
                    stage,
                    format!("failed to spawn ffmpeg (is it installed and on PATH?): {e}"),
                )
            })?;

        let mut stderr = child.stderr.take().ok_or_else(|| {
            BeatError::collaborator(stage, "failed to open ffmpeg stderr (unexpected)")
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok::<_, std::io::Error>(stderr_bytes)
        });

        let status = loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                let _ = stderr_drain.join();
                return Err(BeatError::Cancelled(stage));
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => std::thread::sleep(self.poll_interval),
                Err(e) => {
                    let _ = child.kill();
                    return Err(BeatError::collaborator(
                        stage,
                        format!("failed to wait for ffmpeg: {e}"),
                    ));
                }
            }
        };

        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| BeatError::collaborator(stage, "ffmpeg stderr drain thread panicked"))?
            .map_err(|e| BeatError::collaborator(stage, format!("ffmpeg stderr read failed: {e}")))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(BeatError::collaborator(
                stage,
                format!("ffmpeg exited with status {status}: {}", stderr.trim()),
            ));
        }
        Ok(())
    }
}

impl MediaEncoder for FfmpegEncoder {
    #[tracing::instrument(skip_all, fields(out = %job.out_path.display(), frames = job.frame_count))]
    fn encode_segment(
        &self,
        job: &SegmentJob,
        params: &EncodeParams,
        cancel: &CancelToken,
    ) -> BeatResult<()> {
        let args = self.segment_args(job, params)?;
        ensure_parent_dir(&job.out_path).map_err(|e| e.at_stage(Stage::Encode))?;
        self.run(&args, Stage::Encode, cancel)
    }

    #[tracing::instrument(skip_all, fields(out = %out.display(), segments = segments.len()))]
    fn concat(&self, segments: &[PathBuf], out: &Path, cancel: &CancelToken) -> BeatResult<()> {
        if segments.is_empty() {
            return Err(BeatError::validation("no segments to concatenate"));
        }
        ensure_parent_dir(out).map_err(|e| e.at_stage(Stage::Concat))?;

        let list_path = out.with_file_name("concat.txt");
        std::fs::write(&list_path, concat_list(segments))
            .with_context(|| format!("write concat list '{}'", list_path.display()))
            .map_err(|e| BeatError::from(e).at_stage(Stage::Concat))?;

        self.run(&Self::concat_args(&list_path, out), Stage::Concat, cancel)
    }

    fn probe(&self, path: &Path) -> BeatResult<SegmentProbe> {
        let out = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| {
                BeatError::collaborator(Stage::Concat, format!("failed to run ffprobe: {e}"))
            })?;
        if !out.status.success() {
            return Err(BeatError::collaborator(
                Stage::Concat,
                format!(
                    "ffprobe failed for '{}': {}",
                    path.display(),
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            ));
        }
        parse_probe_json(&out.stdout)
    }
}

/// Concat demuxer list for `segments`, one `file '…'` line each.
pub fn concat_list(segments: &[PathBuf]) -> String {
    let mut s = String::new();
    for seg in segments {
        let escaped = seg.to_string_lossy().replace('\'', "'\\''");
        s.push_str(&format!("file '{escaped}'\n"));
    }
    s
}

fn push_input_fps(args: &mut Vec<String>, fps: Fps) {
    args.extend(["-framerate".into(), format!("{}/{}", fps.num, fps.den)]);
}

fn format_secs(secs: f64) -> String {
    format!("{secs:.6}")
}

fn channel_layout(channels: u16) -> &'static str {
    if channels == 1 { "mono" } else { "stereo" }
}

/// Create `path`'s parent directory if needed.
pub fn ensure_parent_dir(path: &Path) -> BeatResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `true` when `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    tool_runs("ffmpeg")
}

/// `true` when `ffprobe -version` runs successfully.
pub fn is_ffprobe_on_path() -> bool {
    tool_runs("ffprobe")
}

fn tool_runs(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
