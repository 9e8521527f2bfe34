use std::path::PathBuf;

/// Convenience result type used across beatframe.
pub type BeatResult<T> = Result<T, BeatError>;

/// Pipeline stage a failure originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Stage {
    /// Genre validation and event scheduling.
    Schedule,
    /// Audio synthesis and the WAV write.
    Synthesize,
    /// Frame state generation, rasterization and PNG writes.
    Frames,
    /// Per-segment encoding.
    Encode,
    /// Segment verification and lossless concatenation.
    Concat,
    /// Moving the finished file to the caller's output path.
    Publish,
}

impl Stage {
    /// Stable lowercase stage name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Schedule => "schedule",
            Stage::Synthesize => "synthesize",
            Stage::Frames => "frames",
            Stage::Encode => "encode",
            Stage::Concat => "concat",
            Stage::Publish => "publish",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-level error taxonomy used by the generation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum BeatError {
    /// Malformed genre data (zero tempo, empty tables, unparseable pitch names).
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// Requested duration is not usable for the template.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Genre name is not registered.
    #[error("unknown genre: {0}")]
    UnknownGenre(String),

    /// Invalid caller-provided options.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external collaborator (synth, drawing surface, encoder) reported a failure.
    #[error("{stage} stage failed: {message}")]
    Collaborator {
        /// Stage that invoked the collaborator.
        stage: Stage,
        /// The collaborator's own message.
        message: String,
    },

    /// Segments to concatenate were encoded with divergent codec parameters.
    #[error("segment parameter mismatch: {0}")]
    ParameterMismatch(String),

    /// A working-directory artifact is missing when a later stage expects it.
    #[error("partial write detected: missing '{}'", .0.display())]
    PartialWriteDetected(PathBuf),

    /// The request was cancelled externally.
    #[error("cancelled during {0} stage")]
    Cancelled(Stage),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BeatError {
    /// Build a [`BeatError::InvalidTemplate`] value.
    pub fn invalid_template(msg: impl Into<String>) -> Self {
        Self::InvalidTemplate(msg.into())
    }

    /// Build a [`BeatError::InvalidDuration`] value.
    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    /// Build a [`BeatError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BeatError::Collaborator`] value.
    pub fn collaborator(stage: Stage, msg: impl Into<String>) -> Self {
        Self::Collaborator {
            stage,
            message: msg.into(),
        }
    }

    /// Build a [`BeatError::ParameterMismatch`] value.
    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::ParameterMismatch(msg.into())
    }

    /// Stage this error is attributed to, when known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::InvalidTemplate(_) | Self::InvalidDuration(_) | Self::UnknownGenre(_) => {
                Some(Stage::Schedule)
            }
            Self::Collaborator { stage, .. } | Self::Cancelled(stage) => Some(*stage),
            Self::ParameterMismatch(_) => Some(Stage::Concat),
            Self::Validation(_) | Self::PartialWriteDetected(_) | Self::Other(_) => None,
        }
    }

    /// Re-attribute a collaborator-less error to `stage`.
    ///
    /// Errors that already carry a stage are returned unchanged.
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            Self::Other(e) => Self::Collaborator {
                stage,
                message: format!("{e:#}"),
            },
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
