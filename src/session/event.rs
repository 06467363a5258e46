use std::time::Instant;

use crate::sync::RenderUpdate;

/// Input to `PlaybackSession::dispatch`. Times are track positions in seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Regular clock sample while the track plays (or sits paused).
    ClockTick(f64),
    /// The clock jumped to a new position.
    Seek(f64),
    /// The user clicked lyric line `index`.
    LineClick(usize),
    /// The pointer entered the lyrics pane.
    PointerEnter,
    /// The pointer left the lyrics pane.
    PointerLeave,
    /// The user scrolled the lyrics pane by hand at the given instant.
    ManualScroll(Instant),
    /// Flip auto-scroll explicitly.
    ToggleAutoScroll,
    /// The current track played to its end.
    TrackEnded,
    NextTrack,
    PrevTrack,
}

/// Something the session needs the playback clock to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockRequest {
    Load { index: usize, autoplay: bool },
    SeekTo(f64),
    Resume,
}

/// Result of one dispatched event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionOutput {
    /// Fresh render instructions, when the event produced any.
    pub render: Option<RenderUpdate>,
    /// Requests for the playback clock, in the order they must be applied.
    pub clock: Vec<ClockRequest>,
}
