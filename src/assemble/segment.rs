use std::path::{Path, PathBuf};

use crate::assemble::workdir::WorkDir;
use crate::encode::encoder::{SegmentAudio, SegmentJob};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{BeatError, BeatResult};
use crate::render::pipeline::frame_path;
use crate::visual::title::EdgeMode;

/// Intro and outro length in seconds.
pub const EDGE_SECS: f64 = 3.0;

/// Position of a segment in the final video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Opening title card.
    Intro,
    /// Visualizer over the synthesized track.
    Main,
    /// Closing title card.
    Outro,
}

impl SegmentKind {
    /// Concatenation order.
    pub const ORDER: [SegmentKind; 3] = [SegmentKind::Intro, SegmentKind::Main, SegmentKind::Outro];

    /// Lowercase name used for directories and files.
    pub fn name(self) -> &'static str {
        match self {
            SegmentKind::Intro => "intro",
            SegmentKind::Main => "main",
            SegmentKind::Outro => "outro",
        }
    }

    /// Title card mode, `None` for the main segment.
    pub fn edge_mode(self) -> Option<EdgeMode> {
        match self {
            SegmentKind::Intro => Some(EdgeMode::Intro),
            SegmentKind::Main => None,
            SegmentKind::Outro => Some(EdgeMode::Outro),
        }
    }
}

/// One independently rendered and encoded piece of the timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Position in the video.
    pub kind: SegmentKind,
    /// Frames rendered for the segment.
    pub frame_count: u64,
    /// Frame rate shared by all segments.
    pub fps: Fps,
    /// Where the frame images go.
    pub frames_dir: PathBuf,
    /// Audio muxed into the segment.
    pub audio: SegmentAudio,
    /// Encoded output.
    pub out_path: PathBuf,
}

impl Segment {
    /// Video length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count)
    }

    /// Encoder job for this segment.
    pub fn job(&self, canvas: Canvas) -> SegmentJob {
        SegmentJob {
            frames_dir: self.frames_dir.clone(),
            frame_count: self.frame_count,
            fps: self.fps,
            canvas,
            audio: self.audio.clone(),
            out_path: self.out_path.clone(),
        }
    }

    /// Fail with [`BeatError::PartialWriteDetected`] unless every frame and the audio track exist.
    pub fn check_inputs(&self) -> BeatResult<()> {
        for f in 0..self.frame_count {
            let path = frame_path(&self.frames_dir, FrameIndex(f));
            if !path.is_file() {
                return Err(BeatError::PartialWriteDetected(path));
            }
        }
        if let SegmentAudio::Track(path) = &self.audio
            && !path.is_file()
        {
            return Err(BeatError::PartialWriteDetected(path.clone()));
        }
        Ok(())
    }

    /// Fail with [`BeatError::PartialWriteDetected`] unless the encoded file exists.
    pub fn check_output(&self) -> BeatResult<()> {
        if self.out_path.is_file() {
            Ok(())
        } else {
            Err(BeatError::PartialWriteDetected(self.out_path.clone()))
        }
    }
}

/// Intro, main and outro segments, in concatenation order.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentPlan {
    /// Always `[intro, main, outro]`.
    pub segments: [Segment; 3],
}

impl SegmentPlan {
    /// Lay out the three segments of a `duration_secs` track inside `work`.
    ///
    /// Edge segments get silence exactly as long as their video; the main segment is cut to
    /// the shorter of video and track.
    pub fn new(duration_secs: f64, fps: Fps, audio_path: &Path, work: &WorkDir) -> BeatResult<Self> {
        if fps.num == 0 || fps.den == 0 {
            return Err(BeatError::validation("fps must be non-zero"));
        }
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(BeatError::invalid_duration(format!(
                "main segment needs a positive duration, got {duration_secs}"
            )));
        }

        let edge_frames = fps.secs_to_frames_floor(EDGE_SECS);
        let main_frames = fps.secs_to_frames_floor(duration_secs);
        if edge_frames == 0 || main_frames == 0 {
            return Err(BeatError::validation(format!(
                "{} fps leaves a segment without frames",
                fps.as_f64()
            )));
        }

        let segment = |kind: SegmentKind, frame_count: u64, audio: SegmentAudio| Segment {
            kind,
            frame_count,
            fps,
            frames_dir: work.frames_dir(kind),
            audio,
            out_path: work.segment_path(kind),
        };
        let silence = SegmentAudio::Silence {
            secs: fps.frames_to_secs(edge_frames),
        };

        Ok(Self {
            segments: [
                segment(SegmentKind::Intro, edge_frames, silence.clone()),
                segment(
                    SegmentKind::Main,
                    main_frames,
                    SegmentAudio::Track(audio_path.to_path_buf()),
                ),
                segment(SegmentKind::Outro, edge_frames, silence),
            ],
        })
    }

    /// The main segment.
    pub fn main(&self) -> &Segment {
        &self.segments[1]
    }

    /// Sum of the segment durations.
    pub fn expected_duration_secs(&self) -> f64 {
        self.segments.iter().map(Segment::duration_secs).sum()
    }

    /// Encoded segment files, in order.
    pub fn segment_paths(&self) -> Vec<PathBuf> {
        self.segments.iter().map(|s| s.out_path.clone()).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/segment.rs"]
mod tests;
