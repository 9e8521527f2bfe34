//! Per-frame visual state and its lowering into draw instructions.

/// Scene/title-card -> draw instruction lowering.
pub mod draw;
/// Beat-synchronized main-segment scenes.
pub mod frame;
/// Intro/outro title cards.
pub mod title;
