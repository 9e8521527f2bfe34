//! Drawing-surface collaborators and the parallel frame writer.

/// Backend trait and frame buffer type.
pub mod backend;
/// `vello_cpu` raster backend.
pub mod cpu;
/// Segment frame generation into numbered PNG files.
pub mod pipeline;
pub(crate) mod text;
