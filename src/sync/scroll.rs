//! Viewport geometry and scroll animation.

use std::time::Duration;

/// Renderer-provided geometry of the laid-out lyric lines.
///
/// Units are whatever the renderer scrolls by (terminal rows here).
pub trait LineLayout {
    fn viewport_height(&self) -> f64;
    fn line_top(&self, index: usize) -> f64;
    fn line_height(&self, index: usize) -> f64;
}

/// Offset that puts the centre of line `index` at `anchor_fraction` of the
/// viewport height. Never negative.
pub fn scroll_target(layout: &impl LineLayout, index: usize, anchor_fraction: f64) -> f64 {
    let offset = layout.line_top(index) - layout.viewport_height() * anchor_fraction
        + layout.line_height(index) / 2.0;
    offset.max(0.0)
}

/// Lines stacked top to bottom, each with its own height.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackedLayout {
    tops: Vec<f64>,
    heights: Vec<f64>,
    viewport_height: f64,
}

impl StackedLayout {
    pub fn new(heights: Vec<f64>, viewport_height: f64) -> Self {
        let mut tops = Vec::with_capacity(heights.len());
        let mut y = 0.0;
        for h in &heights {
            tops.push(y);
            y += h;
        }
        Self {
            tops,
            heights,
            viewport_height,
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn content_height(&self) -> f64 {
        self.heights.iter().sum()
    }

    /// Largest useful offset: the last row sits at the bottom of the viewport.
    pub fn max_offset(&self) -> f64 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    /// Line covering content position `y`, if any.
    pub fn line_at(&self, y: f64) -> Option<usize> {
        if y < 0.0 {
            return None;
        }
        let i = self.tops.partition_point(|&top| top <= y).checked_sub(1)?;
        (y < self.tops[i] + self.heights[i]).then_some(i)
    }
}

impl LineLayout for StackedLayout {
    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn line_top(&self, index: usize) -> f64 {
        self.tops.get(index).copied().unwrap_or_else(|| self.content_height())
    }

    fn line_height(&self, index: usize) -> f64 {
        self.heights.get(index).copied().unwrap_or(0.0)
    }
}

/// Eases the viewport offset toward the latest requested target.
///
/// A new target replaces the one in flight; manual scrolling moves the
/// position and the target together so the animation does not pull back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothScroll {
    position: f64,
    target: f64,
}

const SNAP_DISTANCE: f64 = 0.05;

impl SmoothScroll {
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }

    pub fn retarget(&mut self, target: f64) {
        self.target = target.max(0.0);
    }

    pub fn jump_to(&mut self, offset: f64) {
        self.position = offset.max(0.0);
        self.target = self.position;
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.jump_to(self.position + delta);
    }

    /// Keep both position and target within `[0, max]`.
    pub fn clamp_to(&mut self, max: f64) {
        let max = max.max(0.0);
        self.position = self.position.clamp(0.0, max);
        self.target = self.target.clamp(0.0, max);
    }

    /// Advance the animation by `dt`; `smoothing` is the easing time constant.
    pub fn step(&mut self, dt: Duration, smoothing: Duration) -> f64 {
        if smoothing.is_zero() {
            self.position = self.target;
            return self.position;
        }

        let alpha = 1.0 - (-dt.as_secs_f64() / smoothing.as_secs_f64()).exp();
        self.position += (self.target - self.position) * alpha;
        if (self.target - self.position).abs() < SNAP_DISTANCE {
            self.position = self.target;
        }
        self.position
    }
}
