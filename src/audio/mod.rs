//! Audio synthesis collaborator: timeline events rendered to PCM and written as WAV.

/// PCM buffers, the output format and the synthesizer trait.
pub mod pcm;
/// Built-in oscillator synthesizer.
pub mod synth;
pub mod voice;
