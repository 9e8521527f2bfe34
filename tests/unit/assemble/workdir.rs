use super::*;

#[test]
fn layout_lives_under_the_root() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    let root = work.path().to_path_buf();

    assert!(root.is_dir());
    assert!(root.starts_with(parent.path()));
    assert_eq!(work.audio_path(), root.join("audio.wav"));
    assert_eq!(
        work.frames_dir(SegmentKind::Outro),
        root.join("frames").join("outro")
    );
    assert_eq!(
        work.segment_path(SegmentKind::Main),
        root.join("segments").join("main.mp4")
    );
    assert_eq!(work.output_path(), root.join("output.mp4"));
}

#[test]
fn drop_removes_everything() {
    let parent = tempfile::tempdir().unwrap();
    let root = {
        let work = WorkDir::create(Some(parent.path())).unwrap();
        let frames = work.frames_dir(SegmentKind::Intro);
        std::fs::create_dir_all(&frames).unwrap();
        std::fs::write(frames.join("frame_000000.png"), b"x").unwrap();
        std::fs::write(work.audio_path(), b"y").unwrap();
        work.path().to_path_buf()
    };
    assert!(!root.exists());
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
}

#[test]
fn drop_survives_an_already_removed_dir() {
    let parent = tempfile::tempdir().unwrap();
    let work = WorkDir::create(Some(parent.path())).unwrap();
    std::fs::remove_dir_all(work.path()).unwrap();
    drop(work);
}

#[test]
fn back_to_back_requests_get_distinct_roots() {
    let parent = tempfile::tempdir().unwrap();
    let a = WorkDir::create(Some(parent.path())).unwrap();
    let b = WorkDir::create(Some(parent.path())).unwrap();
    assert_ne!(a.path(), b.path());
    drop(a);
    assert!(b.path().is_dir());
}

#[test]
fn taken_name_is_never_adopted() {
    let parent = tempfile::tempdir().unwrap();
    let taken = parent.path().join("beatframe_1_2");
    std::fs::create_dir(&taken).unwrap();
    std::fs::write(taken.join("audio.wav"), b"other request").unwrap();

    let root = claim_dir(parent.path(), "beatframe_1_2").unwrap();
    assert_eq!(root, parent.path().join("beatframe_1_2_1"));

    let next = claim_dir(parent.path(), "beatframe_1_2").unwrap();
    assert_eq!(next, parent.path().join("beatframe_1_2_2"));
    assert_eq!(
        std::fs::read(taken.join("audio.wav")).unwrap(),
        b"other request"
    );
}

#[test]
fn missing_parent_is_created() {
    let parent = tempfile::tempdir().unwrap();
    let nested = parent.path().join("a").join("b");
    let work = WorkDir::create(Some(&nested)).unwrap();
    assert!(work.path().starts_with(&nested));
    assert!(work.path().is_dir());
}
