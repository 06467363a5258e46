//! Parser for the enhanced LRC format.
//!
//! Each physical line may start with a `[MM:SS.CC]` line tag; the rest of the
//! line can carry `<MM:SS.CC>` marks, one placed before each character it
//! times. Marks are matched to characters purely by position: the Nth mark
//! times the Nth character of the line text once all marks are removed. Surplus
//! marks are ignored and characters without a mark fall back to a fixed
//! half-second window.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

use super::model::{CharTiming, LyricLine, TimingModel};

/// Highlight window given to a character that has no following mark.
pub const FALLBACK_WINDOW: f64 = 0.5;

static LINE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([0-9]{2}):([0-9]{2})\.([0-9]{2})\](.*)").expect("line tag pattern is valid")
});

static CHAR_MARK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([0-9]{2}):([0-9]{2})\.([0-9]{2})>").expect("char mark pattern is valid")
});

/// Parse enhanced LRC text into a sorted `TimingModel`.
///
/// Never fails: lines without a line tag (headers, blank lines, garbage) and
/// lines whose text is empty once marks are stripped are skipped.
pub fn parse(raw: &str) -> TimingModel {
    let lines: Vec<LyricLine> = raw.lines().filter_map(parse_line).collect();
    TimingModel::from(lines)
}

/// Read and parse a lyric file. Invalid UTF-8 is replaced rather than rejected.
pub fn load_file(path: &Path) -> Result<TimingModel> {
    let bytes = fs::read(path).map_err(|source| Error::io(path, source))?;
    let model = parse(&String::from_utf8_lossy(&bytes));
    log::debug!("parsed {} lyric lines from {}", model.len(), path.display());
    Ok(model)
}

fn parse_line(physical: &str) -> Option<LyricLine> {
    let caps = LINE_TAG.captures(physical)?;
    let time = captured_seconds(&caps)?;
    let tagged = caps.get(4).map_or("", |m| m.as_str()).trim();

    let marks: Vec<f64> = CHAR_MARK
        .captures_iter(tagged)
        .filter_map(|c| captured_seconds(&c))
        .collect();

    let text = CHAR_MARK.replace_all(tagged, "").into_owned();
    if text.is_empty() {
        return None;
    }

    let characters = text
        .chars()
        .enumerate()
        .map(|(i, ch)| char_timing(ch, i, time, &marks))
        .collect();

    Some(LyricLine {
        time,
        text,
        characters,
    })
}

fn char_timing(ch: char, index: usize, line_time: f64, marks: &[f64]) -> CharTiming {
    let mark = marks.get(index).copied();
    let start_time = mark.unwrap_or(line_time);
    let end_time = match marks.get(index + 1) {
        Some(&next) => next,
        None => mark.unwrap_or(line_time) + FALLBACK_WINDOW,
    };

    CharTiming {
        ch,
        start_time,
        end_time,
    }
}

/// Convert the first three capture groups (`MM`, `SS`, `CC`) to seconds.
fn captured_seconds(caps: &Captures<'_>) -> Option<f64> {
    let field = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
    let minutes = field(1)?;
    let seconds = field(2)?;
    let hundredths = field(3)?;
    Some(f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(hundredths) / 100.0)
}
