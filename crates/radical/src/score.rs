//! Description-length scoring.
//!
//! A candidate is scored by how many decimal digits it gets right (`D`)
//! against how many bits it takes to write down (`L`). Efficiency is `D/L`.

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed;

/// Reported as `correct_digits` when the error is exactly zero.
pub const EXACT_MATCH_DIGITS: f64 = 100.0;

/// `L = Σ log2(1 + |aᵢ|)`. Zero coefficients contribute nothing.
pub fn complexity_bits(coeffs: &[i64]) -> f64 {
    coeffs
        .iter()
        .map(|&a| (1.0 + a.unsigned_abs() as f64).log2())
        .sum()
}

/// `D = -log10(error)`, or [`EXACT_MATCH_DIGITS`] for a zero error.
pub fn correct_digits(absolute_error: f64) -> f64 {
    if absolute_error > 0.0 {
        -absolute_error.log10()
    } else {
        EXACT_MATCH_DIGITS
    }
}

/// `D / L`, zero when `L` is zero.
pub fn efficiency(correct_digits: f64, complexity_bits: f64) -> f64 {
    if complexity_bits > 0.0 {
        correct_digits / complexity_bits
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub complexity_bits: f64,
    pub correct_digits: f64,
    pub efficiency: f64,
}

pub fn score(coeffs: &[i64], absolute_error: f64) -> Score {
    let bits = complexity_bits(coeffs);
    let digits = correct_digits(absolute_error);
    Score {
        complexity_bits: bits,
        correct_digits: digits,
        efficiency: efficiency(digits, bits),
    }
}

/// Leading decimal digits shared by `approx` and `target`, both rendered
/// with `digits` fractional digits. Signs and the decimal point are
/// compared but not counted.
pub fn matched_digits(approx: &Fixed, target: &Fixed, digits: u32) -> u32 {
    let a = approx.to_decimal_string(digits);
    let t = target.to_decimal_string(digits);
    a.chars()
        .zip(t.chars())
        .take_while(|(x, y)| x == y)
        .filter(|(x, _)| x.is_ascii_digit())
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_zero_sequence_has_no_complexity() {
        assert_eq!(complexity_bits(&[0, 0, 0]), 0.0);
        let s = score(&[0, 0, 0], 1.0);
        assert_eq!(s.efficiency, 0.0);
    }

    #[test]
    fn test_complexity_strictly_increases_per_coefficient() {
        let base = [3, 44, 2, 67];
        let l = complexity_bits(&base);
        for i in 0..base.len() {
            let mut bumped = base;
            bumped[i] += 1;
            assert!(complexity_bits(&bumped) > l, "position {i}");
        }
    }

    #[test]
    fn test_known_complexity() {
        // log2(2) + log2(45) + log2(1203)
        let l = complexity_bits(&[1, 44, 1202]);
        assert!((l - (1.0 + 45f64.log2() + 1203f64.log2())).abs() < 1e-12);
        assert_eq!(complexity_bits(&[1]), 1.0);
        assert_eq!(complexity_bits(&[3]), 2.0);
    }

    #[test]
    fn test_correct_digits_and_sentinel() {
        assert!((correct_digits(1e-7) - 7.0).abs() < 1e-12);
        assert_eq!(correct_digits(0.0), EXACT_MATCH_DIGITS);
    }

    #[test]
    fn test_score_efficiency() {
        let s = score(&[1, 2], 1e-3);
        let l = 1.0 + 3f64.log2();
        assert!((s.complexity_bits - l).abs() < 1e-12);
        assert!((s.efficiency - 3.0 / l).abs() < 1e-12);
    }

    #[test]
    fn test_matched_digits_stops_at_first_difference() {
        let approx = Fixed::parse("3.1415925586", 10).unwrap();
        let target = Fixed::parse("3.1415926535", 10).unwrap();
        assert_eq!(matched_digits(&approx, &target, 10), 7);
        assert_eq!(matched_digits(&target, &target, 10), 11);
        let far = Fixed::parse("2.9", 10).unwrap();
        assert_eq!(matched_digits(&far, &target, 10), 0);
    }
}
