use std::time::{Duration, Instant};

use crate::config::{LineSearchSetting, Settings};
use crate::library::Track;
use crate::sync::{LineLayout, LineSearch, RenderUpdate, SyncEngine};

use super::event::{ClockRequest, SessionEvent, SessionOutput};

/// One listening session over a fixed playlist.
///
/// Owns the sync engine for whichever track is loaded. Tracks are swapped
/// wholesale; the engine's cached state is reset on every load.
#[derive(Debug)]
pub struct PlaybackSession {
    tracks: Vec<Track>,
    current: Option<usize>,
    engine: SyncEngine,
    playing: bool,
    position: f64,

    pointer_inside: bool,
    /// Auto-scroll was switched off with the toggle key; hover and the
    /// manual-scroll timer leave it alone until toggled back on.
    pinned_off: bool,
    resume_auto_scroll_at: Option<Instant>,
    auto_scroll_resume: Duration,
}

impl PlaybackSession {
    pub fn new(tracks: Vec<Track>, settings: &Settings) -> Self {
        let search = match settings.sync.search {
            LineSearchSetting::Linear => LineSearch::Linear,
            LineSearchSetting::Binary => LineSearch::Binary,
        };
        Self {
            tracks,
            current: None,
            engine: SyncEngine::new(settings.ui.anchor_fraction, search),
            playing: false,
            position: 0.0,
            pointer_inside: false,
            pinned_off: false,
            resume_auto_scroll_at: None,
            auto_scroll_resume: Duration::from_millis(settings.controls.auto_scroll_resume_ms),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Mirror the audio thread's play state.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Last position fed to the engine, in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn auto_scroll(&self) -> bool {
        self.engine.auto_scroll()
    }

    /// Load track `index` and reset the engine for it.
    ///
    /// Returns the clock requests that start it; nothing when the index is
    /// out of range.
    pub fn load_track(&mut self, index: usize, autoplay: bool) -> Vec<ClockRequest> {
        let Some(track) = self.tracks.get(index) else {
            return Vec::new();
        };
        log::info!("loading track {index}: {}", track.display());

        self.engine.load(track.lyrics.clone());
        self.current = Some(index);
        self.position = 0.0;
        self.playing = autoplay;
        vec![ClockRequest::Load { index, autoplay }]
    }

    fn step(&self, forward: bool) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        let Some(cur) = self.current else {
            return Some(0);
        };
        Some(if forward { (cur + 1) % len } else { (cur + len - 1) % len })
    }

    pub fn next(&mut self) -> Vec<ClockRequest> {
        self.step(true)
            .map(|i| self.load_track(i, true))
            .unwrap_or_default()
    }

    pub fn prev(&mut self) -> Vec<ClockRequest> {
        self.step(false)
            .map(|i| self.load_track(i, true))
            .unwrap_or_default()
    }

    pub fn handle_clock_tick(&mut self, t: f64, layout: &impl LineLayout) -> RenderUpdate {
        self.position = t;
        self.engine.on_tick(t, layout)
    }

    /// A seek is a tick with a discontinuous time.
    pub fn handle_seek(&mut self, t: f64, layout: &impl LineLayout) -> RenderUpdate {
        log::debug!("seek to {t:.2}s");
        self.handle_clock_tick(t, layout)
    }

    /// Jump to the start of line `index`, resuming playback if paused.
    pub fn handle_line_click(&mut self, index: usize, layout: &impl LineLayout) -> SessionOutput {
        let Some(time) = self
            .engine
            .model()
            .and_then(|m| m.get(index))
            .map(|line| line.time)
        else {
            return SessionOutput::default();
        };

        let mut clock = vec![ClockRequest::SeekTo(time)];
        if !self.playing {
            clock.push(ClockRequest::Resume);
            self.playing = true;
        }
        SessionOutput {
            render: Some(self.handle_seek(time, layout)),
            clock,
        }
    }

    fn handle_pointer(&mut self, inside: bool) {
        self.pointer_inside = inside;
        if inside {
            self.engine.set_auto_scroll(false);
        } else if !self.pinned_off && self.resume_auto_scroll_at.is_none() {
            self.engine.set_auto_scroll(true);
        }
    }

    fn handle_manual_scroll(&mut self, at: Instant) {
        self.engine.set_auto_scroll(false);
        if !self.pinned_off {
            self.resume_auto_scroll_at = Some(at + self.auto_scroll_resume);
        }
    }

    fn toggle_auto_scroll(&mut self) {
        let enable = !self.engine.auto_scroll();
        self.pinned_off = !enable;
        self.resume_auto_scroll_at = None;
        self.engine.set_auto_scroll(enable);
        log::debug!("auto-scroll {}", if enable { "on" } else { "off" });
    }

    /// Re-enable auto-scroll once the manual-scroll quiet period has passed.
    ///
    /// Returns true when auto-scroll was switched back on.
    pub fn poll_auto_scroll_timer(&mut self, now: Instant) -> bool {
        match self.resume_auto_scroll_at {
            Some(at) if now >= at => {
                self.resume_auto_scroll_at = None;
                if self.pointer_inside || self.pinned_off {
                    return false;
                }
                self.engine.set_auto_scroll(true);
                true
            }
            _ => false,
        }
    }

    /// Apply one event. Layout-dependent events need the renderer's geometry
    /// for the currently loaded lyrics.
    pub fn dispatch(&mut self, event: SessionEvent, layout: &impl LineLayout) -> SessionOutput {
        let render = |update| SessionOutput {
            render: Some(update),
            clock: Vec::new(),
        };
        // A fresh track is first sampled on the next tick, once the renderer
        // has laid out its lines.
        let load = |clock| SessionOutput {
            render: None,
            clock,
        };

        match event {
            SessionEvent::ClockTick(t) => render(self.handle_clock_tick(t, layout)),
            SessionEvent::Seek(t) => render(self.handle_seek(t, layout)),
            SessionEvent::LineClick(index) => self.handle_line_click(index, layout),
            SessionEvent::PointerEnter => {
                self.handle_pointer(true);
                SessionOutput::default()
            }
            SessionEvent::PointerLeave => {
                self.handle_pointer(false);
                SessionOutput::default()
            }
            SessionEvent::ManualScroll(at) => {
                self.handle_manual_scroll(at);
                SessionOutput::default()
            }
            SessionEvent::ToggleAutoScroll => {
                self.toggle_auto_scroll();
                SessionOutput::default()
            }
            SessionEvent::TrackEnded | SessionEvent::NextTrack => {
                load(self.next())
            }
            SessionEvent::PrevTrack => {
                load(self.prev())
            }
        }
    }
}
