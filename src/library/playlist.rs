//! The playlist cache: the scanned track list stored as JSON, tagged with the
//! music directory it was built from.
//!
//! A cache is only reused for the same directory, while younger than the
//! configured age and newer than every file in that directory. Anything else
//! (missing, stale or unreadable) just means the directory gets scanned again.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{Error, Result};

use super::model::Track;
use super::scan::scan;

#[derive(Debug, Serialize, Deserialize)]
struct CachedPlaylist {
    dir: PathBuf,
    tracks: Vec<Track>,
}

/// Absolute form of `dir`, so cached audio paths survive a change of working
/// directory. Falls back to `dir` itself when it cannot be resolved.
fn resolve_dir(dir: &Path) -> PathBuf {
    fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Write `tracks`, scanned from `dir`, to `path`, creating parent directories
/// as needed.
pub fn save(path: &Path, dir: &Path, tracks: &[Track]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::io(parent, source))?;
    }

    let cached = CachedPlaylist {
        dir: resolve_dir(dir),
        tracks: tracks.to_vec(),
    };
    let json = serde_json::to_string_pretty(&cached).map_err(|source| Error::Playlist {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| Error::io(path, source))?;

    log::info!("playlist with {} tracks saved to {}", tracks.len(), path.display());
    Ok(())
}

fn load(path: &Path) -> Result<CachedPlaylist> {
    let bytes = fs::read(path).map_err(|source| Error::io(path, source))?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Playlist {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether `dir` itself, or any file at its top level, was modified after
/// `since`. Adding or removing a file touches the directory.
fn changed_since(dir: &Path, since: SystemTime) -> bool {
    WalkDir::new(dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok()?.metadata().ok()?.modified().ok())
        .any(|modified| modified > since)
}

/// Load the cached playlist for `dir` if it exists, is younger than
/// `max_age` and no file in `dir` changed since it was written.
///
/// `Ok(None)` means there is nothing usable to load: no file, a cache of
/// another directory, a stale file or an empty list.
pub fn load_fresh(path: &Path, dir: &Path, max_age: Duration) -> Result<Option<Vec<Track>>> {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(Error::io(path, source)),
    };

    // A modification time in the future counts as brand new.
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);
    if age > max_age {
        log::info!("playlist cache {} is stale", path.display());
        return Ok(None);
    }

    let cached = load(path)?;
    let dir = resolve_dir(dir);
    if cached.dir != dir {
        log::info!(
            "playlist cache {} belongs to {}, not {}",
            path.display(),
            cached.dir.display(),
            dir.display()
        );
        return Ok(None);
    }
    if changed_since(&dir, modified) {
        log::info!("{} changed since the playlist was cached", dir.display());
        return Ok(None);
    }

    Ok(Some(cached.tracks).filter(|t| !t.is_empty()))
}

/// Use the playlist cache when configured and fresh for `dir`, otherwise
/// scan `dir` and refresh the cache.
pub fn load_or_scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let dir = resolve_dir(dir);
    let Some(cache) = settings.playlist_cache.as_deref() else {
        return scan(&dir, settings);
    };

    let max_age = Duration::from_secs(settings.cache_max_age_secs);
    match load_fresh(cache, &dir, max_age) {
        Ok(Some(tracks)) => {
            log::info!("playlist loaded from cache {}", cache.display());
            return tracks;
        }
        Ok(None) => {}
        Err(e) => log::warn!("ignoring playlist cache: {e}"),
    }

    let tracks = scan(&dir, settings);
    if tracks.is_empty() {
        log::error!("no valid songs found in {}", dir.display());
    } else if let Err(e) = save(cache, &dir, &tracks) {
        log::warn!("{e}");
    }
    tracks
}
