use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_lyrico_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("LYRICO_CONFIG_PATH", "/tmp/lyrico-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/lyrico-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("lyrico")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("lyrico")
            .join("config.toml")
    );
}

#[test]
fn defaults_are_valid_and_anchor_at_one_third() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert!((s.ui.anchor_fraction - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(s.controls.seek_seconds, 5);
    assert_eq!(s.controls.seek_seconds_large, 15);
    assert_eq!(s.controls.auto_scroll_resume_ms, 5000);
    assert!(matches!(s.sync.search, LineSearchSetting::Linear));
    assert_eq!(s.library.cache_max_age_secs, 86_400);
}

#[test]
fn settings_load_from_config_file_and_parse_search_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
quit_fade_out_ms = 0
default_speed = 1.25
speeds = [1.0, 1.25]

[ui]
header_text = "hello"
anchor_fraction = 0.5
line_spacing = 0
scroll_smoothing_ms = 0
show_controls = false

[controls]
seek_seconds = 3
seek_seconds_large = 30
auto_scroll_resume_ms = 1500

[sync]
search = "bisect"

[library]
lyrics_extension = "LRC"
audio_extension = "flac"
require_background = false
playlist_cache = "/tmp/lyrico/playlist.json"
cache_max_age_secs = 60
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("LYRICO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("LYRICO__UI__ANCHOR_FRACTION");

    let s = Settings::load().unwrap();
    assert!(s.validate().is_ok());
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.audio.default_speed, 1.25);
    assert_eq!(s.audio.speeds, vec![1.0, 1.25]);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.anchor_fraction, 0.5);
    assert_eq!(s.ui.line_spacing, 0);
    assert_eq!(s.ui.scroll_smoothing_ms, 0);
    assert!(!s.ui.show_controls);
    assert_eq!(s.controls.seek_seconds, 3);
    assert_eq!(s.controls.seek_seconds_large, 30);
    assert_eq!(s.controls.auto_scroll_resume_ms, 1500);
    assert!(matches!(s.sync.search, LineSearchSetting::Binary));
    assert_eq!(s.library.lyrics_extension, "LRC");
    assert_eq!(s.library.audio_extension, "flac");
    assert_eq!(s.library.background_extension, "png");
    assert!(!s.library.require_background);
    assert_eq!(
        s.library.playlist_cache,
        Some(std::path::PathBuf::from("/tmp/lyrico/playlist.json"))
    );
    assert_eq!(s.library.cache_max_age_secs, 60);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[controls]
seek_seconds = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("LYRICO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("LYRICO__CONTROLS__SEEK_SECONDS", "9");

    let s = Settings::load().unwrap();
    assert_eq!(s.controls.seek_seconds, 9);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.ui.anchor_fraction = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.speeds = vec![];
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.speeds = vec![1.0, 0.0];
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.default_speed = 10.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.seek_seconds = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.library.name_separator.clear();
    assert!(s.validate().is_err());
}
