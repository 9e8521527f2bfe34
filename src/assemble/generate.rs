use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::assemble::segment::SegmentPlan;
use crate::assemble::workdir::WorkDir;
use crate::audio::pcm::AudioSynth;
use crate::audio::synth::OscillatorSynth;
use crate::encode::encoder::MediaEncoder;
use crate::encode::ffmpeg::{FfmpegEncoder, ensure_parent_dir};
use crate::encode::params::EncodeParams;
use crate::encode::probe::verify_matching_params;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{BeatError, BeatResult, Stage};
use crate::genre::registry::{DEFAULT_GENRE, resolve};
use crate::render::backend::{BackendKind, RenderBackend, create_backend};
use crate::render::pipeline::{FrameSource, RenderThreading, write_segment_frames};
use crate::schedule::scheduler::{pick_duration, schedule};
use crate::schedule::timeline::Role;
use crate::visual::frame::FrameContext;

/// Options for one generation request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GenerateOpts {
    /// Registered genre name.
    pub genre: String,
    /// Seed for duration sampling, texture velocities, melody notes and synth noise.
    pub seed: u64,
    /// Fixed main-segment length in whole seconds; sampled from the genre range when unset.
    pub duration_secs: Option<u32>,
    /// Frame rate of every segment.
    pub fps: Fps,
    /// Output size.
    pub canvas: Canvas,
    /// Codec settings shared by all segments.
    pub encode: EncodeParams,
    /// Frame generation threading.
    pub threading: RenderThreading,
    /// Raster backend.
    pub backend: BackendKind,
    /// Parent of the per-request work dir; the system temp dir when unset.
    pub work_root: Option<PathBuf>,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self {
            genre: DEFAULT_GENRE.to_string(),
            seed: 0,
            duration_secs: None,
            fps: Fps::integer(30),
            canvas: Canvas::FULL_HD,
            encode: EncodeParams::default(),
            threading: RenderThreading::default(),
            backend: BackendKind::Cpu,
            work_root: None,
        }
    }
}

impl GenerateOpts {
    /// Reject option combinations before any work starts.
    pub fn validate(&self) -> BeatResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        self.canvas.validate()?;
        self.encode.validate()?;
        if self.threading.threads == Some(0) {
            return Err(BeatError::validation(
                "render threading 'threads' must be >= 1 when set",
            ));
        }
        if self.duration_secs == Some(0) {
            return Err(BeatError::invalid_duration("duration must be > 0 seconds"));
        }
        Ok(())
    }
}

/// The three external collaborators a request drives.
pub struct Collaborators {
    /// Audio synthesis engine.
    pub synth: Box<dyn AudioSynth>,
    /// Drawing surface; forked per worker when frames render in parallel.
    pub backend: Box<dyn RenderBackend>,
    /// Segment encoder and prober.
    pub encoder: Box<dyn MediaEncoder>,
}

impl Collaborators {
    /// Built-in oscillator synth, raster backend and system `ffmpeg`.
    pub fn system(opts: &GenerateOpts) -> BeatResult<Self> {
        Ok(Self {
            synth: Box::new(OscillatorSynth::new(opts.seed)),
            backend: create_backend(opts.backend)?,
            encoder: Box::new(FfmpegEncoder::detect()?),
        })
    }
}

/// Summary of a finished request.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationReport {
    /// Genre rendered.
    pub genre: String,
    /// Seed used.
    pub seed: u64,
    /// Tempo in BPM.
    pub tempo: u32,
    /// Main-segment length in seconds.
    pub duration_secs: u32,
    /// Scheduled events.
    pub events: usize,
    /// Pulse-layer events.
    pub pulse_events: usize,
    /// Frames per segment, in concatenation order.
    pub frames: [u64; 3],
    /// Sum of the planned segment durations.
    pub expected_duration_secs: f64,
    /// Duration the encoder reported for the joined file.
    pub probed_duration_secs: f64,
    /// Where the video was published.
    pub output: PathBuf,
}

/// Run every stage of a request and publish the joined video at `out_path`.
///
/// Stages run in order: schedule, synthesize, frames, encode, concat, publish. All
/// intermediates live in a per-request [`WorkDir`] that is removed whether the request
/// succeeds, fails or is cancelled. `out_path` is only written once every earlier stage
/// succeeded.
#[tracing::instrument(skip_all, fields(genre = %opts.genre, seed = opts.seed))]
pub fn generate(
    opts: &GenerateOpts,
    out_path: &Path,
    collab: &mut Collaborators,
    cancel: &CancelToken,
) -> BeatResult<GenerationReport> {
    opts.validate()?;
    let work = WorkDir::create(opts.work_root.as_deref())?;

    cancel.check(Stage::Schedule)?;
    let (template, style) = resolve(&opts.genre)?;
    let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
    let duration = match opts.duration_secs {
        Some(d) => d,
        None => pick_duration(template, &mut rng),
    };
    let timeline = schedule(template, f64::from(duration), &mut rng)?;
    tracing::info!(
        tempo = template.tempo,
        duration,
        events = timeline.events.len(),
        "scheduled events"
    );

    cancel.check(Stage::Synthesize)?;
    let audio_path = work.audio_path();
    let pcm = collab
        .synth
        .synthesize(&timeline, opts.encode.audio_format())
        .map_err(|e| e.at_stage(Stage::Synthesize))?;
    pcm.write_wav(&audio_path)?;
    tracing::info!(secs = pcm.duration_secs(), "synthesized audio");

    let plan = SegmentPlan::new(f64::from(duration), opts.fps, &audio_path, &work)?;
    for seg in &plan.segments {
        cancel.check(Stage::Frames)?;
        let source = match seg.kind.edge_mode() {
            Some(mode) => FrameSource::Edge {
                mode,
                total_frames: seg.frame_count,
                style,
                canvas: opts.canvas,
            },
            None => FrameSource::Main {
                ctx: FrameContext {
                    fps: opts.fps,
                    tempo: template.tempo,
                    duration_secs: f64::from(duration),
                    canvas: opts.canvas,
                },
                style,
            },
        };
        let stats = write_segment_frames(
            &source,
            &seg.frames_dir,
            collab.backend.as_mut(),
            &opts.threading,
            cancel,
        )?;
        tracing::info!(segment = seg.kind.name(), frames = stats.frames_written, "rendered frames");
    }

    for seg in &plan.segments {
        cancel.check(Stage::Encode)?;
        seg.check_inputs()?;
        collab
            .encoder
            .encode_segment(&seg.job(opts.canvas), &opts.encode, cancel)
            .map_err(|e| e.at_stage(Stage::Encode))?;
        tracing::info!(segment = seg.kind.name(), "encoded segment");
    }

    cancel.check(Stage::Concat)?;
    let mut probes = Vec::with_capacity(plan.segments.len());
    for seg in &plan.segments {
        seg.check_output()?;
        let probe = collab
            .encoder
            .probe(&seg.out_path)
            .map_err(|e| e.at_stage(Stage::Concat))?;
        probes.push((seg.out_path.clone(), probe));
    }
    verify_matching_params(&probes)?;

    let joined = work.output_path();
    collab
        .encoder
        .concat(&plan.segment_paths(), &joined, cancel)
        .map_err(|e| e.at_stage(Stage::Concat))?;
    if !joined.is_file() {
        return Err(BeatError::PartialWriteDetected(joined));
    }
    let probed = collab
        .encoder
        .probe(&joined)
        .map_err(|e| e.at_stage(Stage::Concat))?;
    let expected = plan.expected_duration_secs();
    if (probed.duration_secs - expected).abs() > opts.fps.frame_duration_secs() {
        tracing::warn!(
            expected,
            probed = probed.duration_secs,
            "joined duration drifts by more than one frame"
        );
    }

    cancel.check(Stage::Publish)?;
    publish(&joined, out_path).map_err(|e| e.at_stage(Stage::Publish))?;
    tracing::info!(out = %out_path.display(), secs = probed.duration_secs, "published video");

    let frames = plan.segments.each_ref().map(|s| s.frame_count);

    Ok(GenerationReport {
        genre: template.name.to_string(),
        seed: opts.seed,
        tempo: template.tempo,
        duration_secs: duration,
        events: timeline.events.len(),
        pulse_events: timeline.count(Role::Pulse),
        frames,
        expected_duration_secs: expected,
        probed_duration_secs: probed.duration_secs,
        output: out_path.to_path_buf(),
    })
}

/// Move `src` to `dst`, falling back to copy-then-rename across filesystems.
///
/// `dst` either ends up complete or untouched.
pub fn publish(src: &Path, dst: &Path) -> BeatResult<()> {
    ensure_parent_dir(dst)?;
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let staging = dst.with_file_name(format!(".{name}.partial"));
    let result = std::fs::copy(src, &staging)
        .with_context(|| format!("copy '{}' to '{}'", src.display(), staging.display()))
        .and_then(|_| {
            std::fs::rename(&staging, dst)
                .with_context(|| format!("rename '{}' to '{}'", staging.display(), dst.display()))
        });
    if result.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    Ok(result?)
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/generate.rs"]
mod tests;
