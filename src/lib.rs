//! Beatframe procedurally generates short music videos.
//!
//! A request picks a genre, schedules tempo-locked note events, synthesizes a track, renders
//! beat-synchronized frames and joins intro, main and outro segments into one MP4:
//!
//! - Look up a [`GenreTemplate`] and [`VisualStyle`] with [`resolve`]
//! - Lay out an [`EventTimeline`] with [`schedule`]
//! - Derive per-frame visuals with [`frame_state`] and [`edge_frame_state`]
//! - Run the whole pipeline with [`generate`]
//!
//! Audio synthesis, drawing and encoding sit behind the [`AudioSynth`], [`RenderBackend`] and
//! [`MediaEncoder`] traits. The built-in implementations are an oscillator synth, a
//! `vello_cpu` raster backend and the system `ffmpeg`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Segment planning, work directory and the staged generation pipeline.
pub mod assemble;
/// Audio synthesis collaborator.
pub mod audio;
/// Media encoder collaborator.
pub mod encode;
/// Genre template registry.
pub mod genre;
/// Drawing surface collaborator and frame writer.
pub mod render;
/// Event scheduler.
pub mod schedule;
/// Frame state generator.
pub mod visual;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{BezPath, Canvas, Fps, FrameIndex, Point, Rect, Rgb8, Vec2};
pub use crate::foundation::error::{BeatError, BeatResult, Stage};

pub use crate::assemble::generate::{
    Collaborators, GenerateOpts, GenerationReport, generate, publish,
};
pub use crate::assemble::segment::{EDGE_SECS, Segment, SegmentKind, SegmentPlan};
pub use crate::assemble::workdir::WorkDir;
pub use crate::audio::pcm::{AudioFormat, AudioSynth, PcmBuffer};
pub use crate::audio::synth::OscillatorSynth;
pub use crate::encode::encoder::{MediaEncoder, SegmentAudio, SegmentJob};
pub use crate::encode::ffmpeg::{FfmpegEncoder, is_ffmpeg_on_path, is_ffprobe_on_path};
pub use crate::encode::params::EncodeParams;
pub use crate::encode::probe::{SegmentProbe, parse_probe_json, verify_matching_params};
pub use crate::genre::pitch::Pitch;
pub use crate::genre::registry::{
    DEFAULT_GENRE, GenreTemplate, ShapeFamily, VisualStyle, genre_names, genre_template, resolve,
    validate_registry, visual_style,
};
pub use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::pipeline::{
    FrameSource, RenderStats, RenderThreading, frame_file_name, write_segment_frames,
};
pub use crate::schedule::scheduler::{pick_duration, schedule};
pub use crate::schedule::timeline::{EventTimeline, NoteEvent, Role, Voicing, beat_phase};
pub use crate::visual::draw::{DrawList, DrawOp, compile_scene, compile_title_card};
pub use crate::visual::frame::{FrameContext, SceneDescription, frame_state};
pub use crate::visual::title::{EdgeMode, TitleCardDescription, edge_frame_state};
