//! Audio commands, the shared playback snapshot and small clock helpers.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub enum AudioCmd {
    /// Load the track at the given playlist index, starting from zero.
    Load { index: usize, autoplay: bool },
    /// Toggle pause/resume.
    TogglePause,
    /// Resume if paused; no-op otherwise.
    Resume,
    /// Jump to an absolute position in the current track.
    SeekTo(Duration),
    /// Change the playback rate.
    SetSpeed(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Runtime playback information shared with the UI.
///
/// The position is not written on a timer. The audio thread stores an anchor
/// (position at a known instant) whenever playback state changes, and readers
/// extrapolate from it with `position_at`.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Playlist index of the loaded track (if any).
    pub index: Option<usize>,
    /// Whether playback is currently active.
    pub playing: bool,
    /// Current playback rate.
    pub speed: f32,
    /// Track position at `anchored_at`.
    pub anchor: Duration,
    /// When `anchor` was taken; `None` while paused.
    pub anchored_at: Option<Instant>,
    /// Set when the loaded track played to its end. Cleared by the reader.
    pub finished: bool,
    /// Why the loaded track cannot play, if it cannot.
    pub failed: Option<String>,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            index: None,
            playing: false,
            speed: 1.0,
            anchor: Duration::ZERO,
            anchored_at: None,
            finished: false,
            failed: None,
        }
    }
}

impl PlaybackInfo {
    /// Extrapolated track position at `now`.
    pub fn position_at(&self, now: Instant) -> Duration {
        match self.anchored_at {
            Some(at) if self.playing => {
                let wall = now.saturating_duration_since(at);
                self.anchor + wall.mul_f64(f64::from(self.speed.max(0.0)))
            }
            _ => self.anchor,
        }
    }

    pub fn position(&self) -> Duration {
        self.position_at(Instant::now())
    }

    /// Re-anchor at `now`, keeping the extrapolated position continuous.
    pub(super) fn reanchor(&mut self, now: Instant) {
        self.anchor = self.position_at(now);
        self.anchored_at = self.playing.then_some(now);
    }

    /// Re-anchor on the position the output actually reached when the
    /// extrapolated one has drifted from it by more than `tolerance`.
    ///
    /// Returns whether the anchor moved. Paused snapshots never drift.
    pub(super) fn resync(
        &mut self,
        actual: Duration,
        now: Instant,
        tolerance: Duration,
    ) -> bool {
        if !self.playing {
            return false;
        }
        if self.position_at(now).abs_diff(actual) <= tolerance {
            return false;
        }
        self.anchor = actual;
        self.anchored_at = Some(now);
        true
    }
}

/// Position in the file once the sink has played `sink_pos` of output.
///
/// `base` and `mark` are the file and sink positions at the last seek or
/// speed change; `speed` has applied since then. The sink counts output
/// time, so every second of it covers `speed` seconds of the file.
pub(super) fn file_position(
    base: Duration,
    mark: Duration,
    sink_pos: Duration,
    speed: f32,
) -> Duration {
    base + sink_pos.saturating_sub(mark).mul_f64(f64::from(speed.max(0.0)))
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// The speed that follows `current` in `speeds`, wrapping at the end.
///
/// A current speed that is not in the list restarts the cycle.
pub fn next_speed(speeds: &[f32], current: f32) -> f32 {
    let Some(&first) = speeds.first() else {
        return current;
    };
    speeds
        .iter()
        .position(|s| (s - current).abs() < 1e-3)
        .and_then(|i| speeds.get(i + 1))
        .copied()
        .unwrap_or(first)
}

/// Position after seeking `delta_secs` from `position`, kept inside
/// `[0, duration]` (no upper bound when the duration is unknown).
pub fn seek_target(position: Duration, delta_secs: i64, duration: Option<Duration>) -> Duration {
    let delta = Duration::from_secs(delta_secs.unsigned_abs());
    let target = if delta_secs < 0 {
        position.saturating_sub(delta)
    } else {
        position + delta
    };
    match duration {
        Some(total) => target.min(total),
        None => target,
    }
}
