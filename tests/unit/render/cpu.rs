use super::*;

use kurbo::Shape as _;

use crate::foundation::core::{Canvas, Rect};

fn backend() -> CpuBackend {
    CpuBackend::with_fontdb(Arc::new(usvg::fontdb::Database::new()))
}

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn background_fills_the_whole_frame() {
    let list = DrawList {
        canvas: Canvas {
            width: 16,
            height: 8,
        },
        background: Rgb8::new(10, 20, 30),
        ops: vec![],
    };
    let frame = backend().render(&list).unwrap();
    assert_eq!(frame.data.len(), 16 * 8 * 4);
    assert!(frame.premultiplied);
    assert_eq!(pixel(&frame, 0, 0), [10, 20, 30, 255]);
    assert_eq!(pixel(&frame, 15, 7), [10, 20, 30, 255]);
}

#[test]
fn opaque_fill_covers_its_rect_only() {
    let list = DrawList {
        canvas: Canvas {
            width: 16,
            height: 16,
        },
        background: Rgb8::new(0, 0, 0),
        ops: vec![DrawOp::FillPath {
            path: Rect::new(0.0, 0.0, 8.0, 8.0).to_path(0.1),
            color: Rgb8::new(255, 0, 0),
            opacity: 1.0,
        }],
    };
    let frame = backend().render(&list).unwrap();
    assert_eq!(pixel(&frame, 2, 2), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame, 12, 12), [0, 0, 0, 255]);
}

#[test]
fn zero_opacity_ops_are_skipped() {
    let list = DrawList {
        canvas: Canvas {
            width: 8,
            height: 8,
        },
        background: Rgb8::new(5, 5, 5),
        ops: vec![DrawOp::FillPath {
            path: Rect::new(0.0, 0.0, 8.0, 8.0).to_path(0.1),
            color: Rgb8::new(255, 255, 255),
            opacity: 0.0,
        }],
    };
    let frame = backend().render(&list).unwrap();
    assert_eq!(pixel(&frame, 4, 4), [5, 5, 5, 255]);
}

#[test]
fn forked_backend_renders_identically() {
    let list = DrawList {
        canvas: Canvas {
            width: 8,
            height: 8,
        },
        background: Rgb8::new(1, 2, 3),
        ops: vec![DrawOp::StrokePath {
            path: Rect::new(1.0, 1.0, 7.0, 7.0).to_path(0.1),
            width: 1.0,
            color: Rgb8::new(200, 100, 50),
            opacity: 0.5,
        }],
    };
    let original = backend();
    let mut worker = original.fork();
    let a = backend().render(&list).unwrap();
    let b = worker.render(&list).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn oversized_canvas_is_rejected() {
    let list = DrawList {
        canvas: Canvas {
            width: 70_000,
            height: 2,
        },
        background: Rgb8::new(0, 0, 0),
        ops: vec![],
    };
    assert!(backend().render(&list).is_err());
}
