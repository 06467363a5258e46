use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `LYRICO__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("LYRICO")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.ui.anchor_fraction) {
            return Err("ui.anchor_fraction must be between 0 and 1".to_string());
        }
        if !valid_speed(self.audio.default_speed) {
            return Err("audio.default_speed must be between 0.25 and 4".to_string());
        }
        if self.audio.speeds.is_empty() || !self.audio.speeds.iter().copied().all(valid_speed) {
            return Err("audio.speeds must be a non-empty list of speeds between 0.25 and 4".to_string());
        }
        if self.controls.seek_seconds == 0 || self.controls.seek_seconds_large == 0 {
            return Err("controls.seek_seconds and controls.seek_seconds_large must be >= 1".to_string());
        }
        if self.library.lyrics_extension.trim().is_empty()
            || self.library.audio_extension.trim().is_empty()
        {
            return Err("library.lyrics_extension and library.audio_extension must not be empty".to_string());
        }
        if self.library.name_separator.is_empty() {
            return Err("library.name_separator must not be empty".to_string());
        }
        Ok(())
    }
}

fn valid_speed(speed: f32) -> bool {
    (0.25..=4.0).contains(&speed)
}

/// Resolve the config path from `LYRICO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("LYRICO_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/lyrico/config.toml`
/// or `~/.config/lyrico/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("lyrico").join("config.toml"))
}
