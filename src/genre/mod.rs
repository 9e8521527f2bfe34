//! Static genre tables: musical templates and visual styles keyed by genre name.

/// Pitch-name parsing and frequencies.
pub mod pitch;
/// Genre template and visual style tables.
pub mod registry;
