//! Nested-radical evaluation.
//!
//! `R(a₁..a_k) = √(a₁ + √(a₂ + … + √(a_k)))`, folded from the innermost
//! coefficient outward. Two entry points exist:
//!
//! - [`evaluate_radical`] - the validating boundary function, in either
//!   binary64 or fixed-point decimal precision.
//! - [`Evaluator`] - the strategy used inside the search loops, where
//!   coefficients are non-negative by construction and are not re-checked.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ddouble::DoubleDouble;
use crate::error::RadicalError;
use crate::fixed::Fixed;

/// Extra fractional digits carried through decimal evaluation before the
/// result is rounded to the requested precision.
pub const GUARD_DIGITS: u32 = 12;

/// Numeric precision used by [`evaluate_radical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionMode {
    /// IEEE-754 binary64.
    Float64,
    /// Fixed-point decimal with the given number of fractional digits.
    Decimal(u32),
}

/// Value produced by [`evaluate_radical`].
#[derive(Debug, Clone, PartialEq)]
pub enum RadicalValue {
    Float64(f64),
    Decimal(Fixed),
}

impl RadicalValue {
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Float64(v) => *v,
            Self::Decimal(v) => v.to_f64(),
        }
    }
}

/// Reject empty sequences and negative coefficients.
pub fn validate_coefficients(coeffs: &[i64]) -> Result<(), RadicalError> {
    if coeffs.is_empty() {
        return Err(RadicalError::InvalidArgument(
            "coefficient sequence is empty".into(),
        ));
    }
    if let Some((index, value)) = coeffs.iter().enumerate().find(|(_, a)| **a < 0) {
        return Err(RadicalError::InvalidArgument(format!(
            "coefficient {index} is negative ({value})"
        )));
    }
    Ok(())
}

/// Evaluate a coefficient sequence as a nested radical.
pub fn evaluate_radical(coeffs: &[i64], mode: PrecisionMode) -> Result<RadicalValue, RadicalError> {
    validate_coefficients(coeffs)?;
    match mode {
        PrecisionMode::Float64 => Ok(RadicalValue::Float64(fold_f64(coeffs))),
        PrecisionMode::Decimal(digits) => Ok(RadicalValue::Decimal(evaluate_decimal(coeffs, digits)?)),
    }
}

/// Evaluate at `digits` fractional decimal digits.
///
/// Every nonzero sequence evaluates to at least 1, so fractional digits are
/// also a lower bound on significant digits.
pub fn evaluate_decimal(coeffs: &[i64], digits: u32) -> Result<Fixed, RadicalError> {
    validate_coefficients(coeffs)?;
    let working = digits + GUARD_DIGITS;
    let mut v = Fixed::zero(working);
    for &a in coeffs.iter().rev() {
        v = v
            .add_int(a)
            .sqrt()
            .ok_or_else(|| RadicalError::InvalidArgument("negative radicand".into()))?;
    }
    Ok(v.rescale(digits))
}

#[inline]
fn fold_f64(coeffs: &[i64]) -> f64 {
    coeffs
        .iter()
        .rev()
        .fold(0.0f64, |v, &a| (a as f64 + v).sqrt())
}

// ---------------------------------------------------------------------------
// Evaluator strategy
// ---------------------------------------------------------------------------

/// Fast evaluation used on the search hot path.
///
/// Callers guarantee non-negative coefficients. The target is passed as a
/// double-double so that implementations with more than binary64
/// resolution can use its low-order part.
pub trait Evaluator: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Value of the radical, rounded to `f64`.
    fn evaluate(&self, coeffs: &[i64]) -> f64;

    /// `|R(coeffs) - target|`.
    fn error(&self, coeffs: &[i64], target: DoubleDouble) -> f64;
}

/// Plain binary64 fold. Matches the reference search results bit for bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableEvaluator;

impl Evaluator for PortableEvaluator {
    fn name(&self) -> &'static str {
        "portable"
    }

    #[inline]
    fn evaluate(&self, coeffs: &[i64]) -> f64 {
        fold_f64(coeffs)
    }

    #[inline]
    fn error(&self, coeffs: &[i64], target: DoubleDouble) -> f64 {
        (fold_f64(coeffs) - target.hi).abs()
    }
}

/// Double-double fold. Resolves errors down to ~1e-30, which binary64
/// cannot do once depth ≥ 6 pushes errors below 1e-16.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleDoubleEvaluator;

impl DoubleDoubleEvaluator {
    #[inline]
    fn fold(coeffs: &[i64]) -> DoubleDouble {
        coeffs
            .iter()
            .rev()
            .fold(DoubleDouble::default(), |v, &a| v.add_f64(a as f64).sqrt())
    }
}

impl Evaluator for DoubleDoubleEvaluator {
    fn name(&self) -> &'static str {
        "double-double"
    }

    fn evaluate(&self, coeffs: &[i64]) -> f64 {
        Self::fold(coeffs).to_f64()
    }

    fn error(&self, coeffs: &[i64], target: DoubleDouble) -> f64 {
        Self::fold(coeffs).sub(target).to_f64().abs()
    }
}

/// Evaluator selection, made once at startup from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluatorBackend {
    #[default]
    Portable,
    DoubleDouble,
}

impl EvaluatorBackend {
    pub fn build(self) -> Arc<dyn Evaluator> {
        match self {
            Self::Portable => Arc::new(PortableEvaluator),
            Self::DoubleDouble => Arc::new(DoubleDoubleEvaluator),
        }
    }
}

impl fmt::Display for EvaluatorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portable => write!(f, "portable"),
            Self::DoubleDouble => write!(f, "double-double"),
        }
    }
}

impl FromStr for EvaluatorBackend {
    type Err = RadicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portable" | "f64" => Ok(Self::Portable),
            "double-double" | "dd" => Ok(Self::DoubleDouble),
            other => Err(RadicalError::InvalidArgument(format!(
                "unknown evaluator backend {other:?} (expected portable or double-double)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_reference_radical_matches_pi() {
        let v = evaluate_radical(&[3, 44, 2, 67], PrecisionMode::Float64)
            .unwrap()
            .to_f64();
        assert!((v - PI).abs() < 2e-7, "got {v}");
        assert!(v.to_string().starts_with("3.141592"));
    }

    #[test]
    fn test_single_coefficient_is_square_root() {
        let v = evaluate_radical(&[16], PrecisionMode::Float64).unwrap();
        assert_eq!(v, RadicalValue::Float64(4.0));
    }

    #[test]
    fn test_all_zero_sequence_is_zero() {
        let v = evaluate_decimal(&[0, 0, 0], 20).unwrap();
        assert!(v.is_zero());
    }

    #[test]
    fn test_negative_coefficient_rejected() {
        let err = evaluate_radical(&[1, -2, 3], PrecisionMode::Float64).unwrap_err();
        assert!(matches!(err, RadicalError::InvalidArgument(_)));
        assert!(err.to_string().contains("coefficient 1"));
        assert!(evaluate_radical(&[-1], PrecisionMode::Decimal(50)).is_err());
    }

    #[test]
    fn test_empty_sequence_rejected() {
        assert!(evaluate_radical(&[], PrecisionMode::Float64).is_err());
    }

    #[test]
    fn test_decimal_agrees_with_float() {
        let coeffs = [2, 6, 3081, 2193, 1493];
        let dec = evaluate_decimal(&coeffs, 60).unwrap();
        let flt = PortableEvaluator.evaluate(&coeffs);
        assert!((dec.to_f64() - flt).abs() < 1e-15);
        assert_eq!(dec.scale(), 60);
    }

    #[test]
    fn test_decimal_precision_is_stable_across_digits() {
        // A lower-precision result must be a rounding of the higher one.
        let coeffs = [1, 44, 1202];
        let hi = evaluate_decimal(&coeffs, 120).unwrap();
        let lo = evaluate_decimal(&coeffs, 80).unwrap();
        assert_eq!(hi.rescale(80), lo);
    }

    #[test]
    fn test_double_double_error_resolves_below_binary64() {
        let coeffs = [2, 6, 3081, 2193, 1493];
        // Target equal to the binary64 value of the radical itself.
        let v = PortableEvaluator.evaluate(&coeffs);
        let target = DoubleDouble::from_f64(v);
        assert_eq!(PortableEvaluator.error(&coeffs, target), 0.0);
        let dd_err = DoubleDoubleEvaluator.error(&coeffs, target);
        assert!(dd_err > 0.0 && dd_err < 1e-15, "dd error {dd_err}");
    }

    #[test]
    fn test_backend_parse_and_build() {
        assert_eq!("portable".parse::<EvaluatorBackend>().unwrap(), EvaluatorBackend::Portable);
        assert_eq!("DD".parse::<EvaluatorBackend>().unwrap(), EvaluatorBackend::DoubleDouble);
        assert!("jit".parse::<EvaluatorBackend>().is_err());
        assert_eq!(EvaluatorBackend::DoubleDouble.build().name(), "double-double");
        assert_eq!(EvaluatorBackend::default().to_string(), "portable");
    }
}
