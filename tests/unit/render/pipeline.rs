use super::*;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::core::Fps;
use crate::genre::registry::visual_style;

/// Paints the background only and counts calls across forks.
struct FlatBackend {
    calls: Arc<AtomicU64>,
    fail_at: Option<u64>,
}

impl RenderBackend for FlatBackend {
    fn render(&mut self, list: &DrawList) -> BeatResult<FrameRGBA> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(n) {
            return Err(BeatError::collaborator(Stage::Frames, "surface lost"));
        }
        let px = list.background.with_alpha(255);
        let count = (list.canvas.width * list.canvas.height) as usize;
        Ok(FrameRGBA {
            width: list.canvas.width,
            height: list.canvas.height,
            data: px.repeat(count),
            premultiplied: true,
        })
    }

    fn fork(&self) -> Box<dyn RenderBackend> {
        Box::new(FlatBackend {
            calls: self.calls.clone(),
            fail_at: self.fail_at,
        })
    }
}

fn small_canvas() -> Canvas {
    Canvas {
        width: 32,
        height: 18,
    }
}

fn main_source() -> FrameSource<'static> {
    FrameSource::Main {
        ctx: FrameContext {
            fps: Fps::integer(10),
            tempo: 128,
            duration_secs: 2.0,
            canvas: small_canvas(),
        },
        style: visual_style("electronic"),
    }
}

#[test]
fn frame_file_names_are_zero_padded() {
    assert_eq!(frame_file_name(FrameIndex(0)), "frame_000000.png");
    assert_eq!(frame_file_name(FrameIndex(1234)), "frame_001234.png");
}

#[test]
fn main_source_counts_whole_frames() {
    assert_eq!(main_source().frame_count(), 20);
}

#[test]
fn edge_source_draw_list_uses_style_background() {
    let style = visual_style("electronic");
    let src = FrameSource::Edge {
        mode: EdgeMode::Intro,
        total_frames: 30,
        style,
        canvas: small_canvas(),
    };
    let list = src.draw_list(FrameIndex(0));
    assert_eq!(list.background, style.background);
    assert!(list.ops.is_empty());
    assert!(!src.draw_list(FrameIndex(15)).ops.is_empty());
}

#[test]
fn parallel_writes_every_frame_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicU64::new(0));
    let mut backend = FlatBackend {
        calls: calls.clone(),
        fail_at: None,
    };
    let threading = RenderThreading {
        parallel: true,
        chunk_size: 7,
        threads: Some(3),
    };

    let stats = write_segment_frames(
        &main_source(),
        dir.path(),
        &mut backend,
        &threading,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(stats.frames_total, 20);
    assert_eq!(stats.frames_written, 20);
    assert_eq!(stats.chunks, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 20);
    for f in 0..20 {
        assert!(frame_path(dir.path(), FrameIndex(f)).is_file());
    }
    assert!(!frame_path(dir.path(), FrameIndex(20)).exists());

    let img = image::open(frame_path(dir.path(), FrameIndex(0)))
        .unwrap()
        .to_rgba8();
    assert_eq!(img.dimensions(), (32, 18));
    let bg = visual_style("electronic").background;
    assert_eq!(img.get_pixel(0, 0).0, [bg.r, bg.g, bg.b, 255]);
}

#[test]
fn sequential_matches_parallel_output() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let mut backend = FlatBackend {
        calls: Arc::new(AtomicU64::new(0)),
        fail_at: None,
    };
    let seq = RenderThreading {
        parallel: false,
        ..RenderThreading::default()
    };
    write_segment_frames(&main_source(), a.path(), &mut backend, &seq, &CancelToken::new())
        .unwrap();
    write_segment_frames(
        &main_source(),
        b.path(),
        &mut backend,
        &RenderThreading::default(),
        &CancelToken::new(),
    )
    .unwrap();

    for f in [0u64, 9, 19] {
        let x = std::fs::read(frame_path(a.path(), FrameIndex(f))).unwrap();
        let y = std::fs::read(frame_path(b.path(), FrameIndex(f))).unwrap();
        assert_eq!(x, y);
    }
}

#[test]
fn backend_failure_aborts_with_frames_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = FlatBackend {
        calls: Arc::new(AtomicU64::new(0)),
        fail_at: Some(5),
    };
    let err = write_segment_frames(
        &main_source(),
        dir.path(),
        &mut backend,
        &RenderThreading::default(),
        &CancelToken::new(),
    )
    .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Frames));
}

#[test]
fn cancelled_token_stops_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicU64::new(0));
    let mut backend = FlatBackend {
        calls: calls.clone(),
        fail_at: None,
    };
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = write_segment_frames(
        &main_source(),
        dir.path(),
        &mut backend,
        &RenderThreading::default(),
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, BeatError::Cancelled(Stage::Frames)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn zero_threads_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = FlatBackend {
        calls: Arc::new(AtomicU64::new(0)),
        fail_at: None,
    };
    let threading = RenderThreading {
        threads: Some(0),
        ..RenderThreading::default()
    };
    let err = write_segment_frames(
        &main_source(),
        dir.path(),
        &mut backend,
        &threading,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, BeatError::Validation(_)));
}

#[test]
fn empty_edge_segment_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = FlatBackend {
        calls: Arc::new(AtomicU64::new(0)),
        fail_at: None,
    };
    let src = FrameSource::Edge {
        mode: EdgeMode::Outro,
        total_frames: 0,
        style: visual_style("electronic"),
        canvas: small_canvas(),
    };
    assert!(
        write_segment_frames(
            &src,
            dir.path(),
            &mut backend,
            &RenderThreading::default(),
            &CancelToken::new()
        )
        .is_err()
    );
}
