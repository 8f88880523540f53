//! Admissible coefficient ranges around `floor(y²)`.
//!
//! For a residual `y`, the coefficient that leaves zero residual is near
//! `y²`. The window enumerates `a` ascending over
//! `[max(min, base - offset), min(max, base + offset)]` with
//! `base = floor(y²)`, yielding the next residual `y² - a` for each.
//! Since `y² - a` strictly decreases in `a`, enumeration stops at the first
//! negative residual; no later `a` can be valid.
//!
//! Coefficients are `i64`. A `y²` at or above 2⁶³ has no representable
//! coefficient: such windows are empty and such leaves are skipped.

use crate::config::CoefficientBounds;
use crate::engine::SearchError;

/// 2⁶³, the first `f64` past `i64::MAX`.
const COEFFICIENT_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn representable(square: f64) -> bool {
    square.is_finite() && square < COEFFICIENT_LIMIT
}

/// Reject a target whose square already leaves the coefficient range.
pub fn check_target(target: f64) -> Result<(), SearchError> {
    if representable(target * target) {
        Ok(())
    } else {
        Err(SearchError::InvalidArgument(format!(
            "target {target:e} is too large: its square exceeds the i64 coefficient range"
        )))
    }
}

/// The coefficient range admissible after residual `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintWindow {
    residual_sq: f64,
    base: i64,
    start: i64,
    end: i64,
}

impl ConstraintWindow {
    /// `None` when `floor(y²)` does not fit in an `i64`.
    pub fn around(residual: f64, offset: i64, bounds: CoefficientBounds) -> Option<Self> {
        let residual_sq = residual * residual;
        if !representable(residual_sq) {
            return None;
        }
        let base = residual_sq.floor() as i64;
        let start = base.saturating_sub(offset).max(bounds.min);
        let upper = base.saturating_add(offset);
        let end = bounds.max.map_or(upper, |m| upper.min(m));
        Some(Self {
            residual_sq,
            base,
            start,
            end,
        })
    }

    /// `floor(y²)`.
    pub fn base(&self) -> i64 {
        self.base
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// True when the bounds leave no coefficient at all.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Ascending `(a, y² - a)` pairs, stopping before the first negative residual.
    pub fn candidates(&self) -> Candidates {
        Candidates {
            residual_sq: self.residual_sq,
            next: self.start,
            end: self.end,
            cut_off: false,
            done: false,
        }
    }
}

/// Iterator returned by [`ConstraintWindow::candidates`].
#[derive(Debug, Clone)]
pub struct Candidates {
    residual_sq: f64,
    next: i64,
    end: i64,
    cut_off: bool,
    done: bool,
}

impl Candidates {
    /// Whether enumeration ended on a negative residual rather than the
    /// window edge.
    pub fn was_cut_off(&self) -> bool {
        self.cut_off
    }
}

impl Iterator for Candidates {
    type Item = (i64, f64);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cut_off || self.next > self.end {
            return None;
        }
        let a = self.next;
        let next_residual = self.residual_sq - a as f64;
        if next_residual < 0.0 {
            self.cut_off = true;
            return None;
        }
        // `end` may be i64::MAX.
        if a == self.end {
            self.done = true;
        } else {
            self.next += 1;
        }
        Some((a, next_residual))
    }
}

/// The innermost coefficient: `y²` rounded to nearest, ties to even.
/// `None` when it does not fit in an `i64`.
#[inline]
pub fn final_coefficient(residual: f64) -> Option<i64> {
    let square = residual * residual;
    representable(square).then(|| square.round_ties_even() as i64)
}
