//! Result types shared by the search strategies and the orchestrator.

use serde::{Deserialize, Serialize};

use crate::score::{complexity_bits, efficiency, matched_digits};
use crate::target::Target;
use crate::verify::Verification;

/// Counters gathered during one raw search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Prefixes visited (internal tree nodes or beam states expanded).
    pub nodes_visited: u64,
    /// Complete sequences whose error was computed.
    pub leaves_evaluated: u64,
    /// Window scans stopped early by a negative residual.
    pub residual_cutoffs: u64,
    /// Windows that produced no admissible coefficient.
    pub empty_windows: u64,
    /// Leaves dropped because the final coefficient fell outside the bounds.
    pub out_of_bounds_leaves: u64,
    /// Beam states discarded by truncation to the beam width.
    pub states_truncated: u64,
    /// Largest beam held at any level.
    pub peak_beam_size: usize,
    /// Wall-clock time of the raw search, excluding verification.
    pub wall_time_ms: u64,
}

/// A verified, scored search outcome. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Name of the target approximated.
    pub target: String,
    pub coeffs: Vec<i64>,
    /// `R(coeffs)` from the high-precision evaluation.
    pub approx_value: f64,
    /// Verified `|R(coeffs) - target|`.
    pub absolute_error: f64,
    /// Error seen by the fast search evaluator. May be zero when the
    /// verified error is not.
    pub search_error: f64,
    pub correct_digits: f64,
    pub complexity_bits: f64,
    pub efficiency: f64,
    /// Leading decimal digits shared with the target.
    pub matched_digits: u32,
    /// Verification needed the escalated precision.
    pub escalated: bool,
    /// Error was zero at the escalated precision.
    pub exact: bool,
    pub stats: SearchStats,
}

impl SearchResult {
    pub fn from_verification(
        target: &Target,
        coeffs: Vec<i64>,
        search_error: f64,
        verification: &Verification,
        stats: SearchStats,
    ) -> Self {
        let digits = verification.correct_digits();
        let bits = complexity_bits(&coeffs);
        let matched = matched_digits(
            &verification.approx,
            &target.value(verification.digits),
            verification.digits,
        );
        Self {
            target: target.name().to_string(),
            coeffs,
            approx_value: verification.approx_value,
            absolute_error: verification.absolute_error,
            search_error,
            correct_digits: digits,
            complexity_bits: bits,
            efficiency: efficiency(digits, bits),
            matched_digits: matched,
            escalated: verification.escalated,
            exact: verification.exact,
            stats,
        }
    }

    pub fn depth(&self) -> usize {
        self.coeffs.len()
    }
}
