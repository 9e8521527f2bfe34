//! Segment timeline assembly: plan, work directory and the staged generation pipeline.

/// Request options, collaborators and the stage runner.
pub mod generate;
/// Intro/main/outro layout and input checks.
pub mod segment;
/// Per-request scratch directory.
pub mod workdir;
