use std::path::{Path, PathBuf};

use crate::encode::params::EncodeParams;
use crate::encode::probe::SegmentProbe;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::BeatResult;

/// Audio source muxed into a segment.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentAudio {
    /// Generated silence of exactly `secs` seconds.
    Silence {
        /// Silence length; equals the segment's video length.
        secs: f64,
    },
    /// Synthesized track; the segment ends with the shorter of video and audio.
    Track(PathBuf),
}

/// Everything needed to encode one segment from its frame directory.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentJob {
    /// Directory holding `frame_000000.png` onwards.
    pub frames_dir: PathBuf,
    /// Frames to read.
    pub frame_count: u64,
    /// Input and output frame rate.
    pub fps: Fps,
    /// Expected frame size.
    pub canvas: Canvas,
    /// Audio for the segment.
    pub audio: SegmentAudio,
    /// Encoded output file.
    pub out_path: PathBuf,
}

impl SegmentJob {
    /// Video length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count)
    }
}

/// Media encoder collaborator.
///
/// Calls are made one at a time from the assembling thread.
pub trait MediaEncoder: Send + Sync {
    /// Encode `job` with `params`.
    fn encode_segment(
        &self,
        job: &SegmentJob,
        params: &EncodeParams,
        cancel: &CancelToken,
    ) -> BeatResult<()>;

    /// Join `segments` in order into `out` without re-encoding.
    fn concat(&self, segments: &[PathBuf], out: &Path, cancel: &CancelToken) -> BeatResult<()>;

    /// Read back stream parameters of an encoded file.
    fn probe(&self, path: &Path) -> BeatResult<SegmentProbe>;
}
