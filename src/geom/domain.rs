//! Breakpoint sequences and the intervals built from them.

use super::panel::PanelError;

/// Number of decimals surface parameters are rounded to before deduplication.
pub const BREAKPOINT_PRECISION: u32 = 10;

/// Closed 1D interval `[start, end]`. The direction is kept; `min`/`max`
/// give the ordered bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// The unit interval `[0, 1]`.
    pub const UNIT: Self = Self::new(0.0, 1.0);

    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.start.min(self.end)
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.start.max(self.end)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        (self.end - self.start).abs()
    }

    #[must_use]
    pub fn mid(self) -> f64 {
        0.5 * (self.start + self.end)
    }

    #[must_use]
    pub fn is_increasing(self) -> bool {
        self.start < self.end
    }

    /// Same bounds in increasing order.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.min(), self.max())
    }

    /// Maps a normalized parameter `t in [0, 1]` into the interval.
    #[must_use]
    pub fn parameter_at(self, t: f64) -> f64 {
        self.start + (self.end - self.start) * t
    }

    /// Maps a value of the interval back onto `[0, 1]`. A zero-length
    /// interval maps everything to `0`.
    #[must_use]
    pub fn normalized_parameter_at(self, value: f64) -> f64 {
        let span = self.end - self.start;
        if span == 0.0 {
            0.0
        } else {
            (value - self.start) / span
        }
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// Increasing overlap of two intervals, `None` when they do not overlap
    /// over a positive length.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let start = self.min().max(other.min());
        let end = self.max().min(other.max());
        if end > start {
            Some(Self::new(start, end))
        } else {
            None
        }
    }

    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min(), self.max())
    }
}

impl From<(f64, f64)> for Interval {
    fn from((start, end): (f64, f64)) -> Self {
        Self::new(start, end)
    }
}

impl From<Interval> for (f64, f64) {
    fn from(interval: Interval) -> Self {
        (interval.start, interval.end)
    }
}

/// Pairs each breakpoint with its successor. `n` breakpoints give `n - 1`
/// intervals; fewer than two give none.
#[must_use]
pub fn consecutive_domains(breakpoints: &[f64]) -> Vec<Interval> {
    breakpoints
        .windows(2)
        .map(|pair| Interval::new(pair[0], pair[1]))
        .collect()
}

/// Staggered ("brick joint") breakpoints: the first value, the midpoint of
/// every consecutive pair, then the last value. `n` inputs give `n + 1`
/// outputs.
///
/// ```text
/// [0.0, 0.25, 0.6, 1.0] -> [0.0, 0.125, 0.425, 0.8, 1.0]
/// ```
#[must_use]
pub fn average_consecutive(breakpoints: &[f64]) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (breakpoints.first(), breakpoints.last()) else {
        return Vec::new();
    };

    let mut averaged = Vec::with_capacity(breakpoints.len() + 1);
    averaged.push(first);
    averaged.extend(breakpoints.windows(2).map(|pair| 0.5 * (pair[0] + pair[1])));
    averaged.push(last);
    averaged
}

/// Rounds a value to `precision` decimals, half away from zero.
#[must_use]
pub fn round_to(value: f64, precision: u32) -> f64 {
    let exponent = i32::try_from(precision).unwrap_or(i32::MAX).min(15);
    let factor = 10f64.powi(exponent);
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    }
}

/// Sorts, rounds to `precision` decimals and drops duplicates. Non-finite
/// values are discarded. Applying it twice gives the same result.
#[must_use]
pub fn round_and_deduplicate(numbers: &[f64], precision: u32) -> Vec<f64> {
    let mut rounded: Vec<f64> = numbers
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .map(|value| round_to(value, precision))
        .collect();
    rounded.sort_by(f64::total_cmp);
    rounded.dedup();
    rounded
}

/// `count + 1` evenly spaced breakpoints over `domain`, computed as
/// `start + i * step` so the first value is exactly the domain start.
/// The last value is pinned to the domain end.
#[must_use]
pub fn uniform_breakpoints(domain: Interval, count: usize) -> Vec<f64> {
    if count == 0 {
        return vec![domain.start];
    }
    #[allow(clippy::cast_precision_loss)]
    let step = (domain.end - domain.start) / count as f64;
    let mut values: Vec<f64> = (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let offset = step * i as f64;
            domain.start + offset
        })
        .collect();
    values.push(domain.end);
    values
}

/// At least two breakpoints, all finite. Order is left untouched.
pub fn check_breakpoints(values: &[f64]) -> Result<(), PanelError> {
    if values.len() < 2 {
        return Err(PanelError::NotEnoughBreakpoints {
            count: values.len(),
        });
    }
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(PanelError::NonFiniteBreakpoint { index }),
        None => Ok(()),
    }
}

/// Validates a user supplied breakpoint list: every value finite, at least
/// two distinct values. The result is sorted ascending.
pub fn require_breakpoints(values: &[f64]) -> Result<Vec<f64>, PanelError> {
    if let Some(index) = values.iter().position(|value| !value.is_finite()) {
        return Err(PanelError::NonFiniteBreakpoint { index });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    if sorted.len() < 2 {
        return Err(PanelError::NotEnoughBreakpoints {
            count: sorted.len(),
        });
    }
    Ok(sorted)
}
