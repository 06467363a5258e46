use super::scan::split_name;
use super::*;
use crate::config::LibrarySettings;
use crate::lyrics::parse;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

fn touch(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Lyric file plus fake audio and background under the same stem.
fn full_track(dir: &Path, stem: &str, lrc: &str) {
    touch(dir, &format!("{stem}.lrc"), lrc);
    touch(dir, &format!("{stem}.mp3"), "not really audio");
    touch(dir, &format!("{stem}.png"), "not really an image");
}

fn sample_track() -> Track {
    Track {
        title: "Song".into(),
        artist: "Artist".into(),
        audio: "/music/Artist - Song.mp3".into(),
        background: Some("/music/Artist - Song.png".into()),
        duration: Some(Duration::from_secs(185)),
        lyrics: parse("[00:01.00]<00:01.00>H<00:01.50>i\n[00:03.00]there"),
    }
}

#[test]
fn split_name_requires_exactly_one_separator() {
    assert_eq!(split_name("Artist - Title", " - "), Some(("Artist", "Title")));
    assert_eq!(split_name("NoSeparator", " - "), None);
    assert_eq!(split_name("A - B - C", " - "), None);
    assert_eq!(split_name("A_B", "_"), Some(("A", "B")));
}

#[test]
fn scan_finds_tracks_with_companion_files() {
    let dir = tempfile::tempdir().unwrap();
    full_track(dir.path(), "Beta Band - Second", "[00:02.00]two");
    full_track(dir.path(), "Alpha - First", "[00:01.00]one\n[00:00.50]zero");
    touch(dir.path(), "notes.txt", "ignored");

    let tracks = scan(dir.path(), &LibrarySettings::default());
    assert_eq!(tracks.len(), 2);

    let first = &tracks[0];
    assert_eq!(first.artist, "Alpha");
    assert_eq!(first.title, "First");
    assert_eq!(first.audio, dir.path().join("Alpha - First.mp3"));
    assert_eq!(first.background, Some(dir.path().join("Alpha - First.png")));
    assert_eq!(first.lyrics.len(), 2);
    assert_eq!(first.lyrics.lines()[0].text, "zero");
    // The fake mp3 has no readable properties.
    assert_eq!(first.duration, None);

    assert_eq!(tracks[1].display(), "Beta Band - Second");
}

#[test]
fn scan_skips_bad_names_and_missing_audio() {
    let dir = tempfile::tempdir().unwrap();
    full_track(dir.path(), "NoSeparator", "[00:01.00]x");
    full_track(dir.path(), "Too - Many - Parts", "[00:01.00]x");
    touch(dir.path(), "Lonely - Lyrics.lrc", "[00:01.00]x");
    touch(dir.path(), "Lonely - Lyrics.png", "");
    full_track(dir.path(), "Good - One", "[00:01.00]x");

    let tracks = scan(dir.path(), &LibrarySettings::default());
    let names: Vec<String> = tracks.iter().map(Track::display).collect();
    assert_eq!(names, vec!["Good - One".to_string()]);
}

#[test]
fn scan_background_requirement_is_configurable() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "Plain - Track.lrc", "[00:01.00]x");
    touch(dir.path(), "Plain - Track.mp3", "");

    let mut settings = LibrarySettings::default();
    assert!(scan(dir.path(), &settings).is_empty());

    settings.require_background = false;
    let tracks = scan(dir.path(), &settings);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].background, None);
}

#[test]
fn scan_keeps_tracks_whose_lyrics_have_no_timed_lines() {
    let dir = tempfile::tempdir().unwrap();
    full_track(dir.path(), "Quiet - Instrumental", "[ti:Instrumental]\nno tags here");

    let tracks = scan(dir.path(), &LibrarySettings::default());
    assert_eq!(tracks.len(), 1);
    assert!(tracks[0].lyrics.is_empty());
}

#[test]
fn scan_of_missing_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let tracks = scan(&dir.path().join("nope"), &LibrarySettings::default());
    assert!(tracks.is_empty());
}

#[test]
fn playlist_json_uses_the_cached_playlist_shape() {
    let json = serde_json::to_value(vec![sample_track()]).unwrap();
    let entry = &json[0];
    assert_eq!(entry["title"], "Song");
    assert_eq!(entry["artist"], "Artist");
    assert_eq!(entry["audio"], "/music/Artist - Song.mp3");
    assert_eq!(entry["background"], "/music/Artist - Song.png");
    assert_eq!(entry["lyrics"][0]["time"], 1.0);
    assert_eq!(entry["lyrics"][0]["wordTimings"][1]["char"], "i");
    assert_eq!(entry["lyrics"][0]["wordTimings"][1]["endTime"], 2.0);
}

#[test]
fn playlist_without_duration_or_background_still_loads() {
    let raw = r#"[{
        "title": "T",
        "artist": "A",
        "audio": "A - T.mp3",
        "lyrics": [
            { "time": 5.0, "text": "b", "wordTimings": [{ "char": "b", "startTime": 5.0, "endTime": 5.5 }] },
            { "time": 2.0, "text": "a", "wordTimings": [{ "char": "a", "startTime": 2.0, "endTime": 2.5 }] }
        ]
    }]"#;
    let tracks: Vec<Track> = serde_json::from_str(raw).unwrap();
    assert_eq!(tracks[0].background, None);
    assert_eq!(tracks[0].duration, None);
    // Deserializing re-sorts the lines.
    assert_eq!(tracks[0].lyrics.lines()[0].text, "a");
}

#[test]
fn save_then_load_fresh_returns_the_same_tracks() {
    let music = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("playlist.json");
    let tracks = vec![sample_track()];

    save(&path, music.path(), &tracks).unwrap();
    let loaded = load_fresh(&path, music.path(), Duration::from_secs(60)).unwrap();
    assert_eq!(loaded, Some(tracks));
}

#[test]
fn load_fresh_ignores_missing_stale_and_empty_caches() {
    let music = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlist.json");
    let max_age = Duration::from_secs(60);
    assert_eq!(load_fresh(&path, music.path(), max_age).unwrap(), None);

    save(&path, music.path(), &[sample_track()]).unwrap();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(load_fresh(&path, music.path(), Duration::ZERO).unwrap(), None);

    save(&path, music.path(), &[]).unwrap();
    assert_eq!(load_fresh(&path, music.path(), max_age).unwrap(), None);
}

#[test]
fn load_fresh_reports_corrupt_cache() {
    let music = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlist.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        load_fresh(&path, music.path(), Duration::from_secs(60)),
        Err(crate::error::Error::Playlist { .. })
    ));
}

fn cached_settings(cache: &Path) -> LibrarySettings {
    LibrarySettings {
        playlist_cache: Some(cache.to_path_buf()),
        ..LibrarySettings::default()
    }
}

/// Push a file's modification time past anything written so far; coarse
/// filesystem clocks can otherwise give it the cache's own timestamp.
fn touch_later(path: &Path) {
    let later = SystemTime::now() + Duration::from_secs(60);
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(later)
        .unwrap();
}

#[test]
fn load_or_scan_writes_a_cache_that_load_fresh_accepts() {
    let music = tempfile::tempdir().unwrap();
    full_track(music.path(), "Alpha - First", "[00:01.00]one");
    let cache_dir = tempfile::tempdir().unwrap();
    let cache = cache_dir.path().join("playlist.json");
    let settings = cached_settings(&cache);

    let scanned = load_or_scan(music.path(), &settings);
    assert_eq!(scanned.len(), 1);
    assert!(cache.is_file());
    assert!(scanned[0].audio.is_absolute());

    let cached = load_fresh(&cache, music.path(), Duration::from_secs(60)).unwrap();
    assert_eq!(cached, Some(scanned.clone()));
    assert_eq!(load_or_scan(music.path(), &settings), scanned);
}

#[test]
fn load_or_scan_rescans_when_a_track_is_added() {
    let music = tempfile::tempdir().unwrap();
    full_track(music.path(), "Alpha - First", "[00:01.00]one");
    let cache_dir = tempfile::tempdir().unwrap();
    let cache = cache_dir.path().join("playlist.json");
    let settings = cached_settings(&cache);

    assert_eq!(load_or_scan(music.path(), &settings).len(), 1);

    full_track(music.path(), "Beta - Second", "[00:01.00]two");
    touch_later(&music.path().join("Beta - Second.lrc"));
    let max_age = Duration::from_secs(60);
    assert_eq!(load_fresh(&cache, music.path(), max_age).unwrap(), None);

    let names: Vec<String> = load_or_scan(music.path(), &settings)
        .iter()
        .map(Track::display)
        .collect();
    assert_eq!(names, vec!["Alpha - First".to_string(), "Beta - Second".to_string()]);
}

#[test]
fn load_or_scan_does_not_serve_another_directorys_cache() {
    let first = tempfile::tempdir().unwrap();
    full_track(first.path(), "Alpha - First", "[00:01.00]one");
    let second = tempfile::tempdir().unwrap();
    full_track(second.path(), "Gamma - Third", "[00:01.00]three");
    let cache_dir = tempfile::tempdir().unwrap();
    let cache = cache_dir.path().join("playlist.json");
    let settings = cached_settings(&cache);

    assert_eq!(load_or_scan(first.path(), &settings)[0].artist, "Alpha");
    let max_age = Duration::from_secs(60);
    assert_eq!(load_fresh(&cache, second.path(), max_age).unwrap(), None);

    let tracks = load_or_scan(second.path(), &settings);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].artist, "Gamma");

    // The cache now belongs to the second directory.
    assert_eq!(load_fresh(&cache, first.path(), max_age).unwrap(), None);
}
