use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::AudioSettings;

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo};

/// Owner of the audio thread. Dropping it without `quit_softly` detaches the
/// thread, which exits once the command channel closes.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// `paths` are the audio files in playlist order; `AudioCmd::Load`
    /// indexes into them.
    pub fn new(paths: Vec<PathBuf>, audio_settings: &AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle = spawn_audio_thread(
            paths,
            rx,
            playback_info.clone(),
            audio_settings.default_speed,
        );

        Self {
            tx,
            playback: playback_info,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    /// Load track `index`.
    ///
    /// The shared snapshot is updated right away so clock samples taken before
    /// the audio thread catches up already belong to the new track.
    pub fn load(&self, index: usize, autoplay: bool) {
        let now = Instant::now();
        if let Ok(mut info) = self.playback.lock() {
            info.index = Some(index);
            info.playing = autoplay && info.failed.is_none();
            info.anchor = Duration::ZERO;
            info.anchored_at = info.playing.then_some(now);
            info.finished = false;
        }
        let _ = self.send(AudioCmd::Load { index, autoplay });
    }

    /// Seek the current track to `pos`, updating the snapshot right away.
    pub fn seek_to(&self, pos: Duration) {
        let now = Instant::now();
        if let Ok(mut info) = self.playback.lock() {
            info.anchor = pos;
            info.anchored_at = info.playing.then_some(now);
        }
        let _ = self.send(AudioCmd::SeekTo(pos));
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
