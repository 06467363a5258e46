//! Enhanced-LRC lyrics: the timing model and its parser.
//!
//! A lyric file is turned into a `TimingModel` once per track by `parse`; the
//! model is then only read by the sync engine.

mod model;
mod parse;

pub use model::*;
pub use parse::{load_file, parse};
