//! Continuous scroll math
//!
//! Pure functions that turn the scroll scalar into normalized progress
//! values. Everything here is stateless except [`IndexSelector`], which
//! only remembers its last pick so callers can skip redundant swaps.

use thiserror::Error;

/// Invalid mapper bounds
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapperError {
    /// Range start is not strictly below range end
    #[error("range start {start} must be below range end {end}")]
    EmptyRange { start: f64, end: f64 },
    /// A bound is NaN or infinite
    #[error("range bounds must be finite (got {start}..{end})")]
    NonFinite { start: f64, end: f64 },
}

/// Map `value` from `[start, end]` onto `[0, 1]`, clamped.
///
/// A degenerate range (`end <= start`) behaves as a step at `start`.
pub fn range_progress(value: f64, start: f64, end: f64) -> f64 {
    if end <= start {
        return if value >= start { 1.0 } else { 0.0 };
    }
    ((value - start) / (end - start)).clamp(0.0, 1.0)
}

/// Local progress of phase `index` when `overall` is split into `count`
/// equal consecutive phases.
///
/// Phase `i` runs from `i/count` to `(i+1)/count` of the overall progress,
/// so phases fill one after another from a single driving value.
pub fn phase_progress(overall: f64, index: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let width = 1.0 / count as f64;
    ((overall - index as f64 * width) / width).clamp(0.0, 1.0)
}

/// Height of a bottom-to-top fill over an extent starting at `min`.
pub fn fill_height(min: f32, extent: f32, progress: f64) -> f32 {
    min + extent * progress as f32
}

/// Pick one of `count` discrete items for `progress` in `[0, 1]`.
///
/// Returns `None` when there is nothing to pick from.
pub fn select_index(progress: f64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let progress = if progress.is_finite() { progress } else { 0.0 };
    let raw = (progress * count as f64).floor();
    Some((raw.max(0.0) as usize).min(count - 1))
}

/// Trailing fade: full until `window_end - width`, then linear to 0 at
/// `window_end`.
pub fn fade_window(progress: f64, window_end: f64, width: f64) -> f64 {
    if width <= 0.0 {
        return if progress < window_end { 1.0 } else { 0.0 };
    }
    ((window_end - progress) / width).clamp(0.0, 1.0)
}

/// Scroll sub-range mapped onto `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousMapper {
    start: f64,
    end: f64,
}

impl ContinuousMapper {
    /// Create a mapper over `[start, end]`
    pub fn new(start: f64, end: f64) -> Result<Self, MapperError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(MapperError::NonFinite { start, end });
        }
        if start >= end {
            return Err(MapperError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Normalized progress of `value` through the range
    pub fn map(&self, value: f64) -> f64 {
        range_progress(value, self.start, self.end)
    }
}

/// Discrete selection that only reports changes
///
/// Holding the scroll still must not re-assign the same asset every frame,
/// so `select` returns `None` while the computed index is unchanged.
#[derive(Debug, Clone)]
pub struct IndexSelector {
    count: usize,
    current: Option<usize>,
}

impl IndexSelector {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            current: None,
        }
    }

    /// Index picked by the last successful `select`
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Select for `progress`, returning the index only if it changed
    pub fn select(&mut self, progress: f64) -> Option<usize> {
        let index = select_index(progress, self.count)?;
        if self.current == Some(index) {
            return None;
        }
        self.current = Some(index);
        Some(index)
    }

    /// Forget the last pick so the next `select` reports again
    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Staged visibility of a companion object over a driving progress
///
/// Invisible before `appear`, fully visible while held, then fades out over
/// `fade_width` starting at `fade_out`. Without `fade_out` the object stays
/// visible once it appeared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityWindow {
    pub appear: f64,
    pub fade_out: Option<f64>,
    pub fade_width: f64,
}

impl OpacityWindow {
    pub fn alpha(&self, progress: f64) -> f64 {
        if progress < self.appear {
            return 0.0;
        }
        match self.fade_out {
            None => 1.0,
            Some(fade_out) => fade_window(progress, fade_out + self.fade_width, self.fade_width),
        }
    }
}
