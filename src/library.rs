//! Track library: directory scanning and the cached playlist.
//!
//! A track is a lyric file named `Artist - Title.lrc` with its audio (and
//! usually a background image) next to it under the same stem.

mod model;
mod playlist;
mod scan;

pub use model::Track;
pub use playlist::{load_fresh, load_or_scan, save};
pub use scan::scan;

#[cfg(test)]
mod tests;
