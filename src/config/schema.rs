use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/lyrico/config.toml` or `~/.config/lyrico/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LYRICO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub sync: SyncSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// Playback speed used at startup.
    pub default_speed: f32,
    /// Speeds cycled through with `s`, in order.
    pub speeds: Vec<f32>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 300,
            default_speed: 1.0,
            speeds: vec![0.5, 0.75, 1.0, 1.25, 1.5, 2.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered in the header box when no track is loaded.
    pub header_text: String,

    /// Where the active line's centre is kept, as a fraction of the lyrics
    /// pane height from the top.
    pub anchor_fraction: f64,

    /// Blank rows between lyric lines.
    pub line_spacing: u16,

    /// Easing time constant for lyric scrolling (milliseconds).
    /// Set to 0 to jump straight to the target.
    pub scroll_smoothing_ms: u64,

    /// Whether to draw the controls footer.
    pub show_controls: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ sing along ~ ".to_string(),
            anchor_fraction: 1.0 / 3.0,
            line_spacing: 1,
            scroll_smoothing_ms: 120,
            show_controls: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Seconds to seek with the arrow keys.
    pub seek_seconds: u64,
    /// Seconds to seek with Ctrl + arrow keys.
    pub seek_seconds_large: u64,
    /// Quiet period after manual lyric scrolling before auto-scroll resumes
    /// (milliseconds).
    pub auto_scroll_resume_ms: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5,
            seek_seconds_large: 15,
            auto_scroll_resume_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// How the active lyric line is looked up on each tick.
    pub search: LineSearchSetting,
}

#[derive(Debug, Copy, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineSearchSetting {
    #[default]
    #[serde(alias = "scan")]
    Linear,
    #[serde(alias = "bisect", alias = "binary-search", alias = "binary_search")]
    Binary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Extension of lyric files (case-insensitive, without dot).
    pub lyrics_extension: String,
    /// Extension of the audio file expected next to each lyric file.
    pub audio_extension: String,
    /// Extension of the background image expected next to each lyric file.
    pub background_extension: String,
    /// Separator between artist and title in file names.
    pub name_separator: String,
    /// Skip tracks that have no background image.
    pub require_background: bool,
    /// Where to cache the scanned playlist as JSON. No caching when unset.
    pub playlist_cache: Option<PathBuf>,
    /// Cached playlists older than this are rescanned (seconds).
    pub cache_max_age_secs: u64,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            lyrics_extension: "lrc".into(),
            audio_extension: "mp3".into(),
            background_extension: "png".into(),
            name_separator: " - ".to_string(),
            require_background: true,
            playlist_cache: None,
            cache_max_age_secs: 24 * 60 * 60,
        }
    }
}
