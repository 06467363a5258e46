//! Sync engine: maps a playback position onto a `TimingModel`.
//!
//! The engine picks the active line, computes per-character highlight progress
//! and decides when the viewport should scroll. Geometry comes from the
//! renderer through `LineLayout`, so the engine never touches the terminal.

mod engine;
mod scroll;

pub use engine::*;
pub use scroll::*;
