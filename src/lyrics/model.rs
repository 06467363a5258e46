//! Timing model types: `CharTiming`, `LyricLine` and `TimingModel`.
//!
//! Field names serialize in the `playlist.json` shape (`startTime`,
//! `wordTimings`, ...) so cached playlists stay readable by other players.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One timed character within a lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharTiming {
    #[serde(rename = "char")]
    pub ch: char,
    /// Seconds from track start when the highlight begins.
    pub start_time: f64,
    /// Seconds from track start when the highlight completes.
    pub end_time: f64,
}

impl CharTiming {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// A lyric line with its own start time and per-character timings.
///
/// `time` is independent of the first character's `start_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    pub time: f64,
    pub text: String,
    #[serde(rename = "wordTimings")]
    pub characters: Vec<CharTiming>,
}

/// Lines of one track, sorted ascending by `time` (ties keep input order).
///
/// The line storage is shared and read-only: cloning a model is cheap and a
/// model is replaced wholesale, never edited, when another track loads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<LyricLine>", into = "Vec<LyricLine>")]
pub struct TimingModel {
    lines: Arc<[LyricLine]>,
}

impl TimingModel {
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LyricLine> {
        self.lines.iter()
    }
}

impl From<Vec<LyricLine>> for TimingModel {
    fn from(mut lines: Vec<LyricLine>) -> Self {
        // `sort_by` is stable, so lines sharing a timestamp keep file order.
        lines.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            lines: lines.into(),
        }
    }
}

impl From<TimingModel> for Vec<LyricLine> {
    fn from(model: TimingModel) -> Self {
        model.lines.to_vec()
    }
}

impl<'a> IntoIterator for &'a TimingModel {
    type Item = &'a LyricLine;
    type IntoIter = std::slice::Iter<'a, LyricLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
