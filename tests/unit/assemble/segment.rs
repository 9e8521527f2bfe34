use super::*;

fn plan(work: &WorkDir, secs: f64, fps: Fps) -> SegmentPlan {
    SegmentPlan::new(secs, fps, &work.audio_path(), work).unwrap()
}

#[test]
fn segments_are_ordered_intro_main_outro() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    let p = plan(&work, 10.0, Fps::integer(30));
    let kinds: Vec<_> = p.segments.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, SegmentKind::ORDER);
    assert_eq!(p.main().kind, SegmentKind::Main);
    assert_eq!(
        p.segment_paths(),
        vec![
            work.segment_path(SegmentKind::Intro),
            work.segment_path(SegmentKind::Main),
            work.segment_path(SegmentKind::Outro),
        ]
    );
}

#[test]
fn frame_counts_and_expected_duration() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    let p = plan(&work, 10.0, Fps::integer(30));
    let counts: Vec<_> = p.segments.iter().map(|s| s.frame_count).collect();
    assert_eq!(counts, vec![90, 300, 90]);
    assert!((p.expected_duration_secs() - 16.0).abs() < 1e-9);
}

#[test]
fn edge_silence_matches_edge_video() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    let fps = Fps::new(30_000, 1001).unwrap();
    let p = plan(&work, 12.0, fps);
    for seg in [&p.segments[0], &p.segments[2]] {
        match &seg.audio {
            SegmentAudio::Silence { secs } => {
                assert!((secs - seg.duration_secs()).abs() < 1e-12);
                assert!(*secs <= EDGE_SECS);
            }
            other => panic!("edge segment has {other:?}"),
        }
    }
    assert_eq!(p.main().audio, SegmentAudio::Track(work.audio_path()));
}

#[test]
fn bad_inputs_are_rejected() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    let audio = work.audio_path();
    assert!(SegmentPlan::new(0.0, Fps::integer(30), &audio, &work).is_err());
    assert!(SegmentPlan::new(f64::NAN, Fps::integer(30), &audio, &work).is_err());
    assert!(
        SegmentPlan::new(
            10.0,
            Fps {
                num: 30,
                den: 0
            },
            &audio,
            &work
        )
        .is_err()
    );
}

#[test]
fn missing_frame_is_a_partial_write() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    let p = plan(&work, 10.0, Fps::integer(2));
    let intro = &p.segments[0];
    std::fs::create_dir_all(&intro.frames_dir).unwrap();
    for f in [0u64, 1, 2, 4, 5] {
        std::fs::write(frame_path(&intro.frames_dir, FrameIndex(f)), b"png").unwrap();
    }
    match intro.check_inputs() {
        Err(BeatError::PartialWriteDetected(path)) => {
            assert_eq!(path, frame_path(&intro.frames_dir, FrameIndex(3)));
        }
        other => panic!("expected partial write, got {other:?}"),
    }
    std::fs::write(frame_path(&intro.frames_dir, FrameIndex(3)), b"png").unwrap();
    assert!(intro.check_inputs().is_ok());
    assert!(matches!(
        intro.check_output(),
        Err(BeatError::PartialWriteDetected(_))
    ));
}

#[test]
fn main_segment_needs_its_track() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    let p = plan(&work, 10.0, Fps::integer(1));
    let main = p.main();
    std::fs::create_dir_all(&main.frames_dir).unwrap();
    for f in 0..main.frame_count {
        std::fs::write(frame_path(&main.frames_dir, FrameIndex(f)), b"png").unwrap();
    }
    assert!(matches!(
        main.check_inputs(),
        Err(BeatError::PartialWriteDetected(path)) if path == work.audio_path()
    ));
}

#[test]
fn job_carries_segment_settings() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    let p = plan(&work, 10.0, Fps::integer(30));
    let job = p.segments[2].job(Canvas::FULL_HD);
    assert_eq!(job.frame_count, 90);
    assert_eq!(job.out_path, work.segment_path(SegmentKind::Outro));
    assert!((job.duration_secs() - 3.0).abs() < 1e-9);
}
