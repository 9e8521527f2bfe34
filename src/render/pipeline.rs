use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{BeatError, BeatResult, Stage};
use crate::foundation::math::flatten_premul_over_bg_to_opaque_rgba8;
use crate::genre::registry::VisualStyle;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::visual::draw::{DrawList, compile_scene, compile_title_card};
use crate::visual::frame::{FrameContext, frame_state};
use crate::visual::title::{EdgeMode, edge_frame_state};

/// Threading and chunking for frame generation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Render frames on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Frames handed to the pool per batch; cancellation is checked between batches.
    pub chunk_size: usize,
    /// Worker count; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Counters reported after a segment's frames were written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the segment.
    pub frames_total: u64,
    /// Frames rendered and saved.
    pub frames_written: u64,
    /// Batches dispatched.
    pub chunks: u64,
}

/// What a segment's frames depict.
#[derive(Clone, Copy, Debug)]
pub enum FrameSource<'a> {
    /// Beat-synchronized visualizer for the main segment.
    Main {
        /// Playback parameters.
        ctx: FrameContext,
        /// Genre palette and shape settings.
        style: &'a VisualStyle,
    },
    /// Fading title card for the intro or outro.
    Edge {
        /// Intro or outro.
        mode: EdgeMode,
        /// Frames in the edge segment.
        total_frames: u64,
        /// Supplies background and title color.
        style: &'a VisualStyle,
        /// Output size.
        canvas: Canvas,
    },
}

impl FrameSource<'_> {
    /// Number of frames in the segment.
    pub fn frame_count(&self) -> u64 {
        match self {
            Self::Main { ctx, .. } => ctx.fps.secs_to_frames_floor(ctx.duration_secs),
            Self::Edge { total_frames, .. } => *total_frames,
        }
    }

    /// Draw instructions for `frame`.
    pub fn draw_list(&self, frame: FrameIndex) -> DrawList {
        match self {
            Self::Main { ctx, style } => {
                let scene = frame_state(frame, ctx, style);
                compile_scene(&scene, style, ctx.canvas)
            }
            Self::Edge {
                mode,
                total_frames,
                style,
                canvas,
            } => {
                let card = edge_frame_state(frame, *total_frames, *mode);
                compile_title_card(&card, style, *canvas)
            }
        }
    }
}

/// File name of frame `idx` inside a segment directory.
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("frame_{:06}.png", idx.0)
}

/// Path of frame `idx` inside `dir`.
pub fn frame_path(dir: &Path, idx: FrameIndex) -> PathBuf {
    dir.join(frame_file_name(idx))
}

/// Render every frame of `source` and write it as a PNG into `dir`.
///
/// Frame N always lands in `frame_{N:06}.png`, whatever order workers finish in. The first
/// failing frame aborts the segment.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_segment_frames(
    source: &FrameSource<'_>,
    dir: &Path,
    backend: &mut dyn RenderBackend,
    threading: &RenderThreading,
    cancel: &CancelToken,
) -> BeatResult<RenderStats> {
    let total = source.frame_count();
    if total == 0 {
        return Err(BeatError::validation("segment must contain at least one frame"));
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("create frame dir '{}'", dir.display()))
        .map_err(|e| BeatError::from(e).at_stage(Stage::Frames))?;

    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };

    let mut stats = RenderStats {
        frames_total: total,
        ..RenderStats::default()
    };

    let mut chunk_start = 0u64;
    while chunk_start < total {
        cancel.check(Stage::Frames)?;
        let chunk_end = (chunk_start + chunk_size).min(total);

        match &pool {
            Some(pool) => write_chunk_parallel(
                source,
                dir,
                &*backend,
                pool,
                chunk_start..chunk_end,
                cancel,
            )?,
            None => {
                for f in chunk_start..chunk_end {
                    cancel.check(Stage::Frames)?;
                    write_one(source, dir, backend, FrameIndex(f))?;
                }
            }
        }

        stats.frames_written += chunk_end - chunk_start;
        stats.chunks += 1;
        chunk_start = chunk_end;
    }

    tracing::debug!(frames = stats.frames_written, chunks = stats.chunks, "segment frames written");
    Ok(stats)
}

fn write_chunk_parallel(
    source: &FrameSource<'_>,
    dir: &Path,
    prototype: &dyn RenderBackend,
    pool: &rayon::ThreadPool,
    range: std::ops::Range<u64>,
    cancel: &CancelToken,
) -> BeatResult<()> {
    pool.install(|| {
        range.into_par_iter().try_for_each_init(
            || prototype.fork(),
            |worker, f| -> BeatResult<()> {
                cancel.check(Stage::Frames)?;
                write_one(source, dir, worker.as_mut(), FrameIndex(f))
            },
        )
    })
}

fn write_one(
    source: &FrameSource<'_>,
    dir: &Path,
    backend: &mut dyn RenderBackend,
    frame: FrameIndex,
) -> BeatResult<()> {
    let list = source.draw_list(frame);
    let rendered = backend
        .render(&list)
        .map_err(|e| e.at_stage(Stage::Frames))?;
    let bg = [list.background.r, list.background.g, list.background.b];
    save_png(&rendered, bg, &frame_path(dir, frame))
}

/// Flatten `frame` over `bg` and write it as an opaque RGBA PNG.
pub fn save_png(frame: &FrameRGBA, bg: [u8; 3], path: &Path) -> BeatResult<()> {
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.data.len() != expected {
        return Err(BeatError::collaborator(
            Stage::Frames,
            format!(
                "frame buffer is {} bytes, expected {expected} for {}x{}",
                frame.data.len(),
                frame.width,
                frame.height
            ),
        ));
    }

    let mut opaque = vec![0u8; frame.data.len()];
    if frame.premultiplied {
        flatten_premul_over_bg_to_opaque_rgba8(&mut opaque, &frame.data, bg)?;
    } else {
        opaque.copy_from_slice(&frame.data);
    }

    image::save_buffer_with_format(
        path,
        &opaque,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| {
        BeatError::collaborator(
            Stage::Frames,
            format!("write frame '{}': {e}", path.display()),
        )
    })
}

fn build_thread_pool(threads: Option<usize>) -> BeatResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BeatError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        BeatError::collaborator(Stage::Frames, format!("failed to build rayon thread pool: {e}"))
    })
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
