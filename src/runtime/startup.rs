use crate::audio::AudioPlayer;
use crate::session::PlaybackSession;

use super::event_loop::forward_clock;

/// Cue up the first track, paused, so the lyrics are on screen before
/// anything plays.
pub fn load_first_track(session: &mut PlaybackSession, audio_player: &AudioPlayer) {
    if !session.has_tracks() {
        log::error!("no playable songs; transport disabled");
        return;
    }
    let requests = session.load_track(0, false);
    forward_clock(requests, audio_player);
}
