use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::audio::{AudioCmd, AudioPlayer, PlaybackInfo, next_speed, seek_target};
use crate::config;
use crate::session::{ClockRequest, PlaybackSession, SessionEvent, SessionOutput};
use crate::sync::{RenderUpdate, SmoothScroll, StackedLayout};
use crate::ui;

/// Rows moved per wheel notch or `j`/`k` press.
const MANUAL_SCROLL_ROWS: f64 = 1.0;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Latest sync engine output, kept for drawing between ticks.
    pub update: RenderUpdate,
    /// Animated offset of the lyrics pane.
    pub scroll: SmoothScroll,
    /// Whether the pointer was over the lyrics pane on the last mouse event.
    pub pointer_inside: bool,
    last_frame: Instant,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            update: RenderUpdate::default(),
            scroll: SmoothScroll::default(),
            pointer_inside: false,
            last_frame: Instant::now(),
        }
    }
}

/// Geometry of the current frame, recomputed every iteration.
struct Geometry {
    lyrics: Rect,
    layout: StackedLayout,
}

/// Send session clock requests to the audio thread.
pub(super) fn forward_clock(requests: Vec<ClockRequest>, audio_player: &AudioPlayer) {
    for req in requests {
        match req {
            ClockRequest::Load { index, autoplay } => audio_player.load(index, autoplay),
            ClockRequest::SeekTo(t) => audio_player.seek_to(Duration::from_secs_f64(t.max(0.0))),
            ClockRequest::Resume => {
                let _ = audio_player.send(AudioCmd::Resume);
            }
        }
    }
}

fn apply_output(out: SessionOutput, audio_player: &AudioPlayer, state: &mut EventLoopState) {
    if let Some(update) = out.render {
        if let Some(target) = update.scroll_to {
            state.scroll.retarget(target);
        }
        state.update = update;
    }

    let loads_track = out
        .clock
        .iter()
        .any(|r| matches!(r, ClockRequest::Load { .. }));
    if loads_track {
        state.update = RenderUpdate::default();
        state.scroll.jump_to(0.0);
    }
    forward_clock(out.clock, audio_player);
}

/// Take a copy of the playback snapshot, consuming its `finished` flag.
fn sample_playback(audio_player: &AudioPlayer) -> (PlaybackInfo, bool) {
    match audio_player.playback_handle().lock() {
        Ok(mut info) => {
            let finished = std::mem::take(&mut info.finished);
            (info.clone(), finished)
        }
        Err(_) => (PlaybackInfo::default(), false),
    }
}

/// Main terminal event loop: samples the playback clock, drives the session,
/// draws and handles input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    session: &mut PlaybackSession,
    audio_player: &AudioPlayer,
    music_dir: &str,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let smoothing = Duration::from_millis(settings.ui.scroll_smoothing_ms);

    loop {
        let now = Instant::now();
        let (playback, finished) = sample_playback(audio_player);
        let in_sync = playback.index.is_some() && playback.index == session.current_index();
        session.set_playing(playback.playing);

        let size = terminal.size()?;
        let areas = ui::Areas::new(Rect::new(0, 0, size.width, size.height), &settings.ui);
        let lyrics = areas.lyrics_inner();
        let geometry = Geometry {
            lyrics,
            layout: ui::lyrics_layout(session.engine().model(), lyrics, settings.ui.line_spacing),
        };

        if finished && in_sync {
            let out = session.dispatch(SessionEvent::TrackEnded, &geometry.layout);
            apply_output(out, audio_player, state);
            continue;
        }

        session.poll_auto_scroll_timer(now);

        if in_sync {
            let t = playback.position_at(now).as_secs_f64();
            let out = session.dispatch(SessionEvent::ClockTick(t), &geometry.layout);
            apply_output(out, audio_player, state);
        }

        state.scroll.clamp_to(geometry.layout.max_offset());
        if !state.scroll.is_settled() {
            state.scroll.step(now.saturating_duration_since(state.last_frame), smoothing);
        }
        state.last_frame = now;

        let screen = ui::Screen {
            session: &*session,
            playback: &playback,
            update: &state.update,
            scroll_offset: state.scroll.position(),
            music_dir,
        };
        terminal.draw(|f| ui::draw(f, &screen, &settings.ui, &settings.controls))?;

        if event::poll(Duration::from_millis(30))? {
            let quit = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key_event(
                        key,
                        settings,
                        session,
                        audio_player,
                        &playback,
                        &geometry,
                        state,
                    )
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(mouse, session, audio_player, &geometry, state);
                    false
                }
                _ => false,
            };
            if quit {
                break;
            }
        }
    }

    Ok(())
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    session: &mut PlaybackSession,
    audio_player: &AudioPlayer,
    playback: &PlaybackInfo,
    geometry: &Geometry,
    state: &mut EventLoopState,
) -> bool {
    let layout = &geometry.layout;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return true;
        }
        KeyCode::Char('c') if ctrl => {
            audio_player.quit_softly(Duration::ZERO);
            return true;
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            if session.current_index().is_some() {
                let _ = audio_player.send(AudioCmd::TogglePause);
            }
        }
        KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::PageDown => {
            let out = session.dispatch(SessionEvent::NextTrack, layout);
            apply_output(out, audio_player, state);
        }
        KeyCode::Char('h') | KeyCode::PageUp => {
            let out = session.dispatch(SessionEvent::PrevTrack, layout);
            apply_output(out, audio_player, state);
        }
        KeyCode::Left | KeyCode::Right => {
            let Some(track) = session.current_track() else {
                return false;
            };
            let step = if ctrl {
                settings.controls.seek_seconds_large
            } else {
                settings.controls.seek_seconds
            };
            let step = i64::try_from(step).unwrap_or(i64::MAX);
            let delta = if key.code == KeyCode::Left { -step } else { step };
            let target = seek_target(playback.position(), delta, track.duration);

            audio_player.seek_to(target);
            let out = session.dispatch(SessionEvent::Seek(target.as_secs_f64()), layout);
            apply_output(out, audio_player, state);
        }
        KeyCode::Char('a') => {
            session.dispatch(SessionEvent::ToggleAutoScroll, layout);
        }
        KeyCode::Char('s') => {
            let speed = next_speed(&settings.audio.speeds, playback.speed);
            log::info!("playback speed {speed:.2}x");
            let _ = audio_player.send(AudioCmd::SetSpeed(speed));
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.scroll.scroll_by(MANUAL_SCROLL_ROWS);
            session.dispatch(SessionEvent::ManualScroll(Instant::now()), layout);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.scroll.scroll_by(-MANUAL_SCROLL_ROWS);
            session.dispatch(SessionEvent::ManualScroll(Instant::now()), layout);
        }
        _ => {}
    }

    false
}

fn handle_mouse_event(
    mouse: MouseEvent,
    session: &mut PlaybackSession,
    audio_player: &AudioPlayer,
    geometry: &Geometry,
    state: &mut EventLoopState,
) {
    let layout = &geometry.layout;
    let inside = geometry.lyrics.contains(Position::new(mouse.column, mouse.row));

    if inside != state.pointer_inside {
        state.pointer_inside = inside;
        let event = if inside {
            SessionEvent::PointerEnter
        } else {
            SessionEvent::PointerLeave
        };
        session.dispatch(event, layout);
    }
    if !inside {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            let delta = if mouse.kind == MouseEventKind::ScrollDown {
                MANUAL_SCROLL_ROWS
            } else {
                -MANUAL_SCROLL_ROWS
            };
            state.scroll.scroll_by(delta);
            session.dispatch(SessionEvent::ManualScroll(Instant::now()), layout);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let y = f64::from(mouse.row - geometry.lyrics.y) + state.scroll.position().round();
            if let Some(index) = layout.line_at(y) {
                let out = session.dispatch(SessionEvent::LineClick(index), layout);
                apply_output(out, audio_player, state);
            }
        }
        _ => {}
    }
}
