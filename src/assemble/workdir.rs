use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assemble::segment::SegmentKind;
use crate::foundation::error::BeatResult;

const MAX_CLAIM_ATTEMPTS: u32 = 64;

/// Per-request scratch directory, removed with everything in it on drop.
///
/// Holds the synthesized audio, frame images, encoded segments, the concat list and the
/// joined output until it is published.
#[derive(Debug)]
pub struct WorkDir {
    root: Option<PathBuf>,
}

impl WorkDir {
    /// Create a fresh directory under `parent`, or under the system temp dir.
    pub fn create(parent: Option<&Path>) -> BeatResult<Self> {
        let parent = parent
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("create work dir parent '{}'", parent.display()))?;
        let stem = format!(
            "beatframe_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        );
        let root = claim_dir(&parent, &stem)?;
        tracing::debug!(path = %root.display(), "created work dir");
        Ok(Self { root: Some(root) })
    }

    /// Directory root.
    pub fn path(&self) -> &Path {
        self.root.as_deref().unwrap_or(Path::new(""))
    }

    /// Synthesized track.
    pub fn audio_path(&self) -> PathBuf {
        self.path().join("audio.wav")
    }

    /// Frame images of `kind`.
    pub fn frames_dir(&self, kind: SegmentKind) -> PathBuf {
        self.path().join("frames").join(kind.name())
    }

    /// Encoded file of `kind`.
    pub fn segment_path(&self, kind: SegmentKind) -> PathBuf {
        self.path()
            .join("segments")
            .join(format!("{}.mp4", kind.name()))
    }

    /// Joined result before publishing.
    pub fn output_path(&self) -> PathBuf {
        self.path().join("output.mp4")
    }
}

/// Create `parent/stem`, or `parent/stem_N` for the first free `N`.
///
/// An existing directory is never adopted, so no two requests share a root.
fn claim_dir(parent: &Path, stem: &str) -> BeatResult<PathBuf> {
    for attempt in 0u32..MAX_CLAIM_ATTEMPTS {
        let candidate = match attempt {
            0 => parent.join(stem),
            n => parent.join(format!("{stem}_{n}")),
        };
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("create work dir '{}'", candidate.display()))
                    .into());
            }
        }
    }
    Err(anyhow::anyhow!(
        "no free work dir name for '{stem}' under '{}'",
        parent.display()
    )
    .into())
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            match std::fs::remove_dir_all(&root) {
                Ok(()) => tracing::debug!(path = %root.display(), "removed work dir"),
                Err(e) => tracing::warn!(path = %root.display(), error = %e, "failed to remove work dir"),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/workdir.rs"]
mod tests;
