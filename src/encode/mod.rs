//! Media encoder collaborator: per-segment MP4 encoding, probing and lossless concatenation.

/// Encoder trait and segment job description.
pub mod encoder;
/// `ffmpeg`/`ffprobe` backed encoder.
pub mod ffmpeg;
/// Shared codec parameters.
pub mod params;
/// `ffprobe` output parsing and parameter verification.
pub mod probe;
