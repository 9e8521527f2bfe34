//! Event scheduling: genre template + duration -> time-stamped note events.

/// Layer generation and duration sampling.
pub mod scheduler;
/// Event timeline data types and the beat-phase function.
pub mod timeline;
