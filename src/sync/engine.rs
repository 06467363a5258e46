use crate::lyrics::{CharTiming, LyricLine, TimingModel};

use super::scroll::{LineLayout, scroll_target};

/// Strategy used to locate the active line.
///
/// Both strategies share the same half-open interval rule; `Binary` only pays
/// off for very long lyric sets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LineSearch {
    /// Walk the lines from the start on every tick.
    #[default]
    Linear,
    /// Partition-point search over the sorted line times.
    Binary,
}

/// What the renderer needs after one clock sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderUpdate {
    /// Index of the active line, if playback has reached the first line.
    pub active_line: Option<usize>,
    /// True when the active line differs from the previous sample.
    pub active_changed: bool,
    /// Highlight progress (0..=100) for each character of the active line.
    pub char_progress: Vec<f64>,
    /// Requested viewport offset, in the layout's units.
    pub scroll_to: Option<f64>,
}

/// Return the index `i` with `lines[i].time <= t < lines[i + 1].time`.
///
/// The last line extends forever; `None` before the first line. `lines` must
/// be sorted by `time`, which `TimingModel` guarantees.
pub fn active_line_index(lines: &[LyricLine], t: f64, search: LineSearch) -> Option<usize> {
    match search {
        LineSearch::Linear => {
            for (i, line) in lines.iter().enumerate() {
                let next = lines.get(i + 1).map_or(f64::INFINITY, |n| n.time);
                if t >= line.time && t < next {
                    return Some(i);
                }
            }
            None
        }
        LineSearch::Binary => lines.partition_point(|l| l.time <= t).checked_sub(1),
    }
}

/// Highlight progress of `c` at time `t`, as a percentage.
pub fn progress(c: &CharTiming, t: f64) -> f64 {
    if t < c.start_time {
        return 0.0;
    }
    if t > c.end_time {
        return 100.0;
    }
    let span = c.duration();
    if span <= 0.0 {
        return 100.0;
    }
    ((t - c.start_time) / span * 100.0).clamp(0.0, 100.0)
}

/// Per-track sync state.
///
/// Holds the loaded model, the last active line (for change detection only)
/// and whether automatic scrolling is currently allowed.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    model: Option<TimingModel>,
    active: Option<usize>,
    initial_scroll_pending: bool,
    auto_scroll: bool,
    anchor_fraction: f64,
    search: LineSearch,
}

impl SyncEngine {
    /// `anchor_fraction` is where the active line's centre sits, as a fraction
    /// of the viewport height measured from the top.
    pub fn new(anchor_fraction: f64, search: LineSearch) -> Self {
        Self {
            model: None,
            active: None,
            initial_scroll_pending: false,
            auto_scroll: true,
            anchor_fraction,
            search,
        }
    }

    /// Replace the model for a newly loaded track and forget the old active line.
    pub fn load(&mut self, model: TimingModel) {
        self.model = Some(model);
        self.active = None;
        self.initial_scroll_pending = true;
    }

    pub fn model(&self) -> Option<&TimingModel> {
        self.model.as_ref()
    }

    pub fn active_line(&self) -> Option<usize> {
        self.active
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    /// Enabling does not scroll by itself; the next active-line change does.
    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.auto_scroll = enabled;
    }

    /// Sample the clock at `t` seconds.
    ///
    /// Seeks go through here too: the active line is searched from scratch on
    /// every call, so backward jumps need no special handling.
    pub fn on_tick(&mut self, t: f64, layout: &impl LineLayout) -> RenderUpdate {
        let Some(model) = &self.model else {
            return RenderUpdate::default();
        };

        let active = active_line_index(model.lines(), t, self.search);
        let active_changed = active != self.active;

        let char_progress = active
            .and_then(|i| model.get(i))
            .map(|line| line.characters.iter().map(|c| progress(c, t)).collect())
            .unwrap_or_default();

        let scroll_line = match active {
            Some(i) if active_changed || self.initial_scroll_pending => Some(i),
            None if self.initial_scroll_pending && !model.is_empty() => Some(0),
            _ => None,
        };
        let scroll_to = scroll_line
            .filter(|_| self.auto_scroll)
            .map(|i| scroll_target(layout, i, self.anchor_fraction));

        self.active = active;
        self.initial_scroll_pending = false;

        RenderUpdate {
            active_line: active,
            active_changed,
            char_progress,
            scroll_to,
        }
    }
}
