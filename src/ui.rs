//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`, and the
//! row layout of lyric lines shared with the runtime for scrolling and mouse
//! hit-testing.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, ops::Range, sync::LazyLock, time::Duration};

use crate::audio::PlaybackInfo;
use crate::config::{ControlsSettings, UiSettings};
use crate::lyrics::{LyricLine, TimingModel};
use crate::session::PlaybackSession;
use crate::sync::{RenderUpdate, StackedLayout};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // ←/→ is filled dynamically from config.
    map.insert("j/k".to_string(), "scroll lyrics".to_string());
    map.insert("click".to_string(), "jump to line".to_string());
    map.insert("a".to_string(), "auto-scroll".to_string());
    map.insert("s".to_string(), "speed".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating seek steps.
fn controls_text(seek_seconds: u64, seek_seconds_large: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = ["space/p", "h/l", "←/→", "j/k", "click", "a", "s", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "←/→" {
                Some(format!(
                    "[←/→] seek -/+{}s (ctrl {}s)",
                    seek_seconds, seek_seconds_large
                ))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Screen regions, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub lyrics: Rect,
    pub status: Rect,
    pub controls: Option<Rect>,
}

impl Areas {
    pub fn new(area: Rect, ui: &UiSettings) -> Self {
        let footer = if ui.show_controls { 4 } else { 0 };
        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(footer),
        ])
        .split(area);

        Self {
            header: chunks[0],
            lyrics: chunks[1],
            status: chunks[2],
            controls: ui.show_controls.then_some(chunks[3]),
        }
    }

    /// The lyrics pane without its border.
    pub fn lyrics_inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.lyrics)
    }
}

fn char_width(ch: char) -> usize {
    let mut buf = [0u8; 4];
    Span::raw(&*ch.encode_utf8(&mut buf)).width()
}

/// Split a lyric line into rows no wider than `width` columns.
///
/// Rows are ranges into `line.characters`. A line always has at least one row.
pub fn wrap_rows(line: &LyricLine, width: usize) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (i, c) in line.characters.iter().enumerate() {
        let w = char_width(c.ch);
        if width > 0 && used + w > width && i > start {
            rows.push(start..i);
            start = i;
            used = 0;
        }
        used += w;
    }
    rows.push(start..line.characters.len());
    rows
}

/// Row geometry of `model` in a pane of `area` size; each line takes its
/// wrapped rows plus `line_spacing` blank rows.
pub fn lyrics_layout(model: Option<&TimingModel>, area: Rect, line_spacing: u16) -> StackedLayout {
    let width = usize::from(area.width);
    let heights = model
        .map(|m| {
            m.iter()
                .map(|line| (wrap_rows(line, width).len() + usize::from(line_spacing)) as f64)
                .collect()
        })
        .unwrap_or_default();
    StackedLayout::new(heights, f64::from(area.height))
}

fn char_style(active: bool, progress: f64) -> Style {
    if !active {
        return Style::new().fg(Color::DarkGray);
    }
    if progress >= 100.0 {
        Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if progress > 0.0 {
        Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::new().fg(Color::White).add_modifier(Modifier::BOLD)
    }
}

/// Styled rows for the whole lyric sheet, matching `lyrics_layout` row for row.
fn lyric_text(
    model: &TimingModel,
    update: &RenderUpdate,
    width: usize,
    line_spacing: u16,
) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (i, line) in model.iter().enumerate() {
        let active = update.active_line == Some(i);
        for row in wrap_rows(line, width) {
            let spans: Vec<Span<'static>> = row
                .map(|k| {
                    let progress = if active {
                        update.char_progress.get(k).copied().unwrap_or(0.0)
                    } else {
                        0.0
                    };
                    Span::styled(line.characters[k].ch.to_string(), char_style(active, progress))
                })
                .collect();
            lines.push(Line::from(spans).centered());
        }
        for _ in 0..line_spacing {
            lines.push(Line::default());
        }
    }
    Text::from(lines)
}

/// Everything `draw` needs for one frame.
pub struct Screen<'a> {
    pub session: &'a PlaybackSession,
    /// Snapshot of the audio thread's state.
    pub playback: &'a PlaybackInfo,
    /// Latest output of the sync engine.
    pub update: &'a RenderUpdate,
    /// Current (animated) scroll offset of the lyrics pane, in rows.
    pub scroll_offset: f64,
    pub music_dir: &'a str,
}

fn message(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

/// Render the entire UI into the provided `frame` using the screen state and settings.
pub fn draw(
    frame: &mut Frame,
    screen: &Screen,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let areas = Areas::new(frame.area(), ui_settings);
    let track = screen.session.current_track();

    // Header
    let header_text = track
        .map(|t| format!(" {} ", t.display()))
        .unwrap_or_else(|| ui_settings.header_text.clone());
    let header = Paragraph::new(header_text)
        .alignment(Alignment::Center)
        .bold()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" lyrico ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, areas.header);

    // Lyrics pane
    let lyrics_block = Block::default().borders(Borders::ALL).title(" lyrics ");
    let inner = areas.lyrics_inner();
    frame.render_widget(lyrics_block, areas.lyrics);

    let model = screen.session.engine().model();
    if !screen.session.has_tracks() {
        let text = format!("No playable songs found in {}", screen.music_dir);
        frame.render_widget(message(text).red(), inner);
    } else if let Some(err) = &screen.playback.failed {
        frame.render_widget(message(format!("Error loading audio: {err}")).red(), inner);
    } else if let Some(model) = model.filter(|m| !m.is_empty()) {
        let text = lyric_text(
            model,
            screen.update,
            usize::from(inner.width),
            ui_settings.line_spacing,
        );
        let offset = screen.scroll_offset.round().clamp(0.0, f64::from(u16::MAX)) as u16;
        frame.render_widget(Paragraph::new(text).scroll((offset, 0)), inner);
    } else if model.is_some() {
        frame.render_widget(message("No lyrics".to_string()).dark_gray(), inner);
    }

    // Status line
    let status = {
        let mut parts: Vec<String> = Vec::new();

        if track.is_some() {
            let state = if screen.playback.playing { "Playing" } else { "Paused" };
            parts.push(state.to_string());

            let elapsed = format_mmss(screen.playback.position());
            match track.and_then(|t| t.duration) {
                Some(total) => parts.push(format!("{} / {}", elapsed, format_mmss(total))),
                None => parts.push(elapsed),
            }
        } else {
            parts.push("Stopped".to_string());
        }

        parts.push(format!("Speed: {:.2}x", screen.playback.speed));

        let auto = if screen.session.auto_scroll() { "ON" } else { "OFF" };
        parts.push(format!("Auto-scroll: {}", auto));

        if let Some(i) = screen.session.current_index() {
            parts.push(format!("{}/{}", i + 1, screen.session.tracks().len()));
        }

        parts.join(" • ")
    };

    let status_par = Paragraph::new(status).block(
        Block::bordered()
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            })
            .title(" status "),
    );
    frame.render_widget(status_par, areas.status);

    if let Some(controls_area) = areas.controls {
        let footer_text = controls_text(
            controls_settings.seek_seconds,
            controls_settings.seek_seconds_large,
        );
        let footer = Paragraph::new(footer_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" controls ")
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    }),
            )
            .wrap(Wrap { trim: true });

        frame.render_widget(footer, controls_area);
    }
}
