//! High-precision error verification.
//!
//! Binary64 search errors for deep radicals sit near or below the
//! resolution of the target itself, so they can round to exactly zero.
//! The verifier re-evaluates at a decimal baseline precision and, if the
//! error still vanishes, retries once at a higher precision before
//! declaring an exact match.
//!
//! Precision is an explicit argument to every evaluation; nothing is
//! changed outside the call, so concurrent verifications are independent.

use crate::error::RadicalError;
use crate::eval::{evaluate_decimal, validate_coefficients};
use crate::fixed::Fixed;
use crate::score::EXACT_MATCH_DIGITS;
use crate::target::Target;

/// Minimum decimal digits for the first verification pass.
pub const BASELINE_DIGITS: u32 = 200;
/// Decimal digits for the single escalation retry.
pub const ESCALATED_DIGITS: u32 = 300;

/// Outcome of verifying one coefficient sequence against a target.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// `|R(coeffs) - target|` as `f64`.
    pub absolute_error: f64,
    /// `R(coeffs)` as `f64`.
    pub approx_value: f64,
    /// The error at full working precision.
    pub error: Fixed,
    /// The approximation at full working precision.
    pub approx: Fixed,
    /// Decimal digits used for the reported values.
    pub digits: u32,
    /// Whether the escalated precision was needed.
    pub escalated: bool,
    /// Error was zero even after escalation.
    pub exact: bool,
}

impl Verification {
    /// `-log10(error)`, computed on the decimal value so it cannot underflow.
    /// Exact matches report [`EXACT_MATCH_DIGITS`].
    pub fn correct_digits(&self) -> f64 {
        if self.exact {
            return EXACT_MATCH_DIGITS;
        }
        self.error.log10().map(|l| -l).unwrap_or(EXACT_MATCH_DIGITS)
    }
}

/// Verifies candidates at a baseline precision with one bounded escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionVerifier {
    baseline_digits: u32,
    escalated_digits: u32,
}

impl Default for PrecisionVerifier {
    fn default() -> Self {
        Self {
            baseline_digits: BASELINE_DIGITS,
            escalated_digits: ESCALATED_DIGITS,
        }
    }
}

impl PrecisionVerifier {
    /// Custom precisions. The baseline must be at least [`BASELINE_DIGITS`]
    /// and the escalation strictly higher and at least [`ESCALATED_DIGITS`].
    pub fn new(baseline_digits: u32, escalated_digits: u32) -> Result<Self, RadicalError> {
        if baseline_digits < BASELINE_DIGITS {
            return Err(RadicalError::InvalidArgument(format!(
                "baseline precision {baseline_digits} is below {BASELINE_DIGITS} digits"
            )));
        }
        if escalated_digits <= baseline_digits || escalated_digits < ESCALATED_DIGITS {
            return Err(RadicalError::InvalidArgument(format!(
                "escalated precision {escalated_digits} must exceed baseline {baseline_digits} \
                 and be at least {ESCALATED_DIGITS} digits"
            )));
        }
        Ok(Self {
            baseline_digits,
            escalated_digits,
        })
    }

    pub fn baseline_digits(&self) -> u32 {
        self.baseline_digits
    }

    pub fn escalated_digits(&self) -> u32 {
        self.escalated_digits
    }

    pub fn verify(&self, coeffs: &[i64], target: &Target) -> Result<Verification, RadicalError> {
        validate_coefficients(coeffs)?;

        let (approx, error) = measure(coeffs, target, self.baseline_digits)?;
        if !error.is_zero() {
            return Ok(build(approx, error, self.baseline_digits, false, false));
        }

        tracing::debug!(
            coeffs = ?coeffs,
            target = %target,
            from = self.baseline_digits,
            to = self.escalated_digits,
            "Error vanished at baseline precision, escalating"
        );
        let (approx, error) = measure(coeffs, target, self.escalated_digits)?;
        let exact = error.is_zero();
        if exact {
            tracing::debug!(coeffs = ?coeffs, target = %target, "Exact match after escalation");
        }
        Ok(build(approx, error, self.escalated_digits, true, exact))
    }
}

fn measure(coeffs: &[i64], target: &Target, digits: u32) -> Result<(Fixed, Fixed), RadicalError> {
    let approx = evaluate_decimal(coeffs, digits)?;
    let error = (&approx - &target.value(digits)).abs();
    Ok((approx, error))
}

fn build(approx: Fixed, error: Fixed, digits: u32, escalated: bool, exact: bool) -> Verification {
    Verification {
        absolute_error: error.to_f64(),
        approx_value: approx.to_f64(),
        error,
        approx,
        digits,
        escalated,
        exact,
    }
}

/// Verify with the default 200/300-digit verifier.
pub fn verify(coeffs: &[i64], target: &Target) -> Result<Verification, RadicalError> {
    PrecisionVerifier::default().verify(coeffs, target)
}
