//! The playback session: playlist position, the sync engine for the loaded
//! track and the auto-scroll policy.
//!
//! Everything that happens to the lyrics view arrives as a `SessionEvent`
//! through `PlaybackSession::dispatch`. The session never touches audio
//! directly; it answers with `ClockRequest`s for the runtime to forward.

mod event;
mod model;

pub use event::*;
pub use model::PlaybackSession;
