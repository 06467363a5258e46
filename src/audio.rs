//! Audio playback on a dedicated thread.
//!
//! The UI talks to the thread through `AudioCmd` messages and reads the
//! shared `PlaybackInfo` snapshot to sample the playback clock.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioCmd, PlaybackInfo, next_speed, seek_target};
