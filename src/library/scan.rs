use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::AudioFile;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::lyrics::{self, TimingModel};

use super::model::Track;

fn has_extension(path: &Path, ext: &str) -> bool {
    let ext = ext.trim().trim_start_matches('.');
    path.extension()
        .and_then(|s| s.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Split `Artist - Title` into its two halves. Names with no separator, or
/// more than one, do not follow the convention.
pub(super) fn split_name<'a>(stem: &'a str, sep: &str) -> Option<(&'a str, &'a str)> {
    let mut parts = stem.split(sep);
    let artist = parts.next()?;
    let title = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((artist, title))
}

fn sibling(lyrics_path: &Path, ext: &str) -> PathBuf {
    lyrics_path.with_extension(ext.trim().trim_start_matches('.'))
}

fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}

fn read_lyrics(path: &Path) -> TimingModel {
    match lyrics::load_file(path) {
        Ok(model) => {
            if model.is_empty() {
                log::warn!("no timed lyric lines in {}", path.display());
            }
            model
        }
        Err(e) => {
            // Lyrics are best-effort; the track stays playable without them.
            log::warn!("{e}");
            TimingModel::default()
        }
    }
}

/// Build a track from a lyric file, or `None` when its name or companion
/// files do not match the library convention.
fn track_from_lyrics_file(path: &Path, settings: &LibrarySettings) -> Option<Track> {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        log::warn!("skipping non UTF-8 file name: {}", path.display());
        return None;
    };

    let Some((artist, title)) = split_name(stem, &settings.name_separator) else {
        log::warn!(
            "invalid file name format (expected `Artist{}Title`): {}",
            settings.name_separator,
            path.display()
        );
        return None;
    };

    let audio = sibling(path, &settings.audio_extension);
    if !audio.is_file() {
        log::warn!("missing audio for {}: {}", stem, audio.display());
        return None;
    }

    let background = Some(sibling(path, &settings.background_extension)).filter(|p| p.is_file());
    if background.is_none() && settings.require_background {
        log::warn!("missing background image for {}", stem);
        return None;
    }

    Some(Track {
        title: title.to_string(),
        artist: artist.to_string(),
        duration: probe_duration(&audio),
        audio,
        background,
        lyrics: read_lyrics(path),
    })
}

/// Scan the top level of `dir` for tracks.
///
/// Tracks come back ordered by lyric file name so the playlist is stable
/// between runs.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    if !dir.is_dir() {
        log::error!("music directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let tracks: Vec<Track> = walker
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && has_extension(path, &settings.lyrics_extension))
        .filter_map(|path| track_from_lyrics_file(&path, settings))
        .collect();

    log::info!("found {} tracks in {}", tracks.len(), dir.display());
    tracks
}
