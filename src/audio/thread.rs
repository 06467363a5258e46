use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::error::Error;

use super::sink::create_sink_at;
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo, file_position};

/// How often the thread wakes up to notice a track running out and to check
/// the shared clock against the sink.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drift between the shared clock and the sink tolerated before re-anchoring.
const DRIFT_TOLERANCE: Duration = Duration::from_millis(40);

pub(super) fn spawn_audio_thread(
    paths: Vec<PathBuf>,
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
    default_speed: f32,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let e = Error::from(e);
                log::error!("{e}");
                update(&playback_info, |info| info.failed = Some(e.to_string()));
                // Keep draining so senders never block on a dead thread.
                for cmd in rx {
                    if let AudioCmd::Quit { .. } = cmd {
                        break;
                    }
                }
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let mut deck = Deck {
            stream,
            paths,
            sink: None,
            sink_base: Duration::ZERO,
            sink_mark: Duration::ZERO,
            speed: default_speed,
            playback: playback_info,
        };
        update(&deck.playback, |info| info.speed = default_speed);

        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(AudioCmd::Load { index, autoplay }) => deck.load(index, autoplay),
                Ok(AudioCmd::TogglePause) => deck.toggle_pause(),
                Ok(AudioCmd::Resume) => deck.resume(),
                Ok(AudioCmd::SeekTo(pos)) => deck.seek_to(pos),
                Ok(AudioCmd::SetSpeed(speed)) => deck.set_speed(speed),
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    deck.quit(fade_out_ms);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => deck.poll(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn update(handle: &PlaybackHandle, f: impl FnOnce(&mut PlaybackInfo)) {
    if let Ok(mut info) = handle.lock() {
        f(&mut info);
    }
}

/// Everything the audio thread owns.
struct Deck {
    stream: OutputStream,
    paths: Vec<PathBuf>,
    sink: Option<Sink>,
    /// File position at the last seek or speed change.
    sink_base: Duration,
    /// `Sink::get_pos` at the last seek or speed change.
    sink_mark: Duration,
    speed: f32,
    playback: PlaybackHandle,
}

impl Deck {
    fn is_playing(&self) -> bool {
        self.playback.lock().map(|info| info.playing).unwrap_or(false)
    }

    fn stop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    /// Start counting file position from `pos` on a fresh sink.
    fn mark_start(&mut self, pos: Duration) {
        self.sink_base = pos;
        self.sink_mark = Duration::ZERO;
    }

    /// Where the current sink has got to in the file.
    fn sink_position(&self) -> Option<Duration> {
        let sink = self.sink.as_ref()?;
        Some(file_position(
            self.sink_base,
            self.sink_mark,
            sink.get_pos(),
            self.speed,
        ))
    }

    fn load(&mut self, index: usize, autoplay: bool) {
        self.stop_sink();

        let Some(path) = self.paths.get(index) else {
            log::warn!("ignoring load of unknown track {index}");
            return;
        };

        let result = create_sink_at(&self.stream, path, Duration::ZERO, self.speed);
        let now = Instant::now();
        match result {
            Ok(sink) => {
                if autoplay {
                    sink.play();
                }
                log::info!("loaded {}", path.display());
                self.sink = Some(sink);
                self.mark_start(Duration::ZERO);
                update(&self.playback, |info| {
                    info.index = Some(index);
                    info.playing = autoplay;
                    info.anchor = Duration::ZERO;
                    info.anchored_at = autoplay.then_some(now);
                    info.finished = false;
                    info.failed = None;
                });
            }
            Err(e) => {
                log::error!("{e}");
                update(&self.playback, |info| {
                    info.index = Some(index);
                    info.playing = false;
                    info.anchor = Duration::ZERO;
                    info.anchored_at = None;
                    info.finished = false;
                    info.failed = Some(e.to_string());
                });
            }
        }
    }

    fn set_paused(&mut self, paused: bool) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if paused {
            sink.pause();
        } else {
            sink.play();
        }
        let now = Instant::now();
        update(&self.playback, |info| {
            info.reanchor(now);
            info.playing = !paused;
            info.anchored_at = info.playing.then_some(now);
        });
    }

    fn toggle_pause(&mut self) {
        let playing = self.is_playing();
        self.set_paused(playing);
    }

    fn resume(&mut self) {
        if !self.is_playing() {
            self.set_paused(false);
        }
    }

    /// Rebuild the current sink and skip into the file.
    fn seek_to(&mut self, pos: Duration) {
        if self.sink.is_none() {
            return;
        }
        let Some(index) = self.playback.lock().ok().and_then(|info| info.index) else {
            return;
        };
        let Some(path) = self.paths.get(index) else {
            return;
        };

        let playing = self.is_playing();
        let result = create_sink_at(&self.stream, path, pos, self.speed);
        self.stop_sink();
        match result {
            Ok(sink) => {
                if playing {
                    sink.play();
                }
                self.sink = Some(sink);
                self.mark_start(pos);
                let now = Instant::now();
                update(&self.playback, |info| {
                    info.anchor = pos;
                    info.anchored_at = playing.then_some(now);
                    info.finished = false;
                });
            }
            Err(e) => {
                log::error!("{e}");
                update(&self.playback, |info| {
                    info.playing = false;
                    info.anchored_at = None;
                    info.failed = Some(e.to_string());
                });
            }
        }
    }

    fn set_speed(&mut self, speed: f32) {
        if let Some(pos) = self.sink_position() {
            self.sink_base = pos;
            self.sink_mark = self.sink.as_ref().map(Sink::get_pos).unwrap_or_default();
        }
        self.speed = speed;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_speed(speed);
        }
        let now = Instant::now();
        update(&self.playback, |info| {
            info.reanchor(now);
            info.speed = speed;
        });
    }

    fn poll(&mut self) {
        self.check_finished();
        self.resync();
    }

    /// Pull the shared clock back onto the sink's real position, which falls
    /// behind wall time on device latency or underruns.
    fn resync(&mut self) {
        let Some(actual) = self.sink_position() else {
            return;
        };
        let now = Instant::now();
        update(&self.playback, |info| {
            if info.resync(actual, now, DRIFT_TOLERANCE) {
                log::debug!("clock re-synced to sink at {:.3}s", actual.as_secs_f64());
            }
        });
    }

    /// Mark the track finished once its sink has drained.
    fn check_finished(&mut self) {
        let drained = self.sink.as_ref().is_some_and(Sink::empty);
        if !drained || !self.is_playing() {
            return;
        }
        self.sink = None;
        let now = Instant::now();
        update(&self.playback, |info| {
            info.reanchor(now);
            info.playing = false;
            info.anchored_at = None;
            info.finished = true;
        });
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.as_ref() {
            // Fade out gently before stopping.
            fade_out_sink(s, fade_out_ms);
        }
        self.stop_sink();
        // Update shared state so the UI doesn't keep showing Playing.
        update(&self.playback, |info| {
            info.playing = false;
            info.anchored_at = None;
        });
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 || sink.is_paused() {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
