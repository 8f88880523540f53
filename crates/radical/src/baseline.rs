//! Reference approximations that search results are compared against.

use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::error::RadicalError;
use crate::eval::GUARD_DIGITS;
use crate::fixed::Fixed;
use crate::score::{efficiency, EXACT_MATCH_DIGITS};
use crate::target::Target;

/// A scored non-search approximation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub label: String,
    pub expression: String,
    pub absolute_error: f64,
    pub correct_digits: f64,
    pub complexity_bits: f64,
    pub efficiency: f64,
}

impl Baseline {
    fn scored(label: String, expression: String, error: &Fixed, complexity_bits: f64) -> Self {
        let digits = match error.log10() {
            Some(l) => -l,
            None => EXACT_MATCH_DIGITS,
        };
        Self {
            label,
            expression,
            absolute_error: error.to_f64(),
            correct_digits: digits,
            complexity_bits,
            efficiency: efficiency(digits, complexity_bits),
        }
    }
}

/// `log2(1 + n)` for a non-negative integer of any size.
fn bits_of(n: &BigInt) -> f64 {
    Fixed::from_int(n + BigInt::one(), 0)
        .log10()
        .map(|l| l / std::f64::consts::LOG10_2)
        .unwrap_or(0.0)
}

/// `[0, …, 0, n]` with `n = round(target^(2^depth))`: the radical with all
/// information packed into the innermost coefficient.
///
/// `n` can exceed `i64` at depth 6 and beyond, so it is kept as a `BigInt`
/// and only rendered.
pub fn zero_tail_baseline(target: &Target, depth: usize, digits: u32) -> Result<Baseline, RadicalError> {
    if depth == 0 {
        return Err(RadicalError::InvalidArgument("depth must be at least 1".into()));
    }
    let working = digits + GUARD_DIGITS;
    let t = target.value(working);

    let mut power = t;
    for _ in 0..depth {
        power = power.square();
    }
    let n = power.round_to_integer();

    let mut v = Fixed::from_int(n.clone(), working);
    for _ in 0..depth {
        v = v
            .sqrt()
            .ok_or_else(|| RadicalError::InvalidArgument("negative radicand".into()))?;
    }
    let error = (&v.rescale(digits) - &target.value(digits)).abs();

    let mut expression = String::from("[");
    for _ in 1..depth {
        expression.push_str("0, ");
    }
    expression.push_str(&n.to_string());
    expression.push(']');

    Ok(Baseline::scored(
        format!("zero-tail d{depth}"),
        expression,
        &error,
        bits_of(&n),
    ))
}

/// `p / q` scored with `L = log2(1+p) + log2(1+q)`.
pub fn rational_baseline(p: u64, q: u64, target: &Target, digits: u32) -> Result<Baseline, RadicalError> {
    let value = Fixed::ratio(p, q, digits)?;
    let error = (&value - &target.value(digits)).abs();
    let bits = (1.0 + p as f64).log2() + (1.0 + q as f64).log2();
    let b = Baseline::scored(format!("{p}/{q}"), format!("{p}/{q}"), &error, bits);
    tracing::debug!(label = %b.label, digits = b.correct_digits, "Scored rational baseline");
    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Constant;

    #[test]
    fn test_zero_tail_small_depths() {
        let pi: Target = Constant::Pi.into();
        let d2 = zero_tail_baseline(&pi, 2, 60).unwrap();
        assert_eq!(d2.expression, "[0, 97]");
        assert!((d2.absolute_error - 0.003303660874797158).abs() < 1e-15);

        let d3 = zero_tail_baseline(&pi, 3, 60).unwrap();
        assert_eq!(d3.expression, "[0, 0, 9489]");
        assert!((d3.absolute_error - 1.940928218882452e-5).abs() < 1e-17);
        assert!((d3.complexity_bits - 9490f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_tail_beyond_i64() {
        let pi: Target = Constant::Pi.into();
        let d6 = zero_tail_baseline(&pi, 6, 100).unwrap();
        assert_eq!(d6.expression, "[0, 0, 0, 0, 0, 65704006445717084572022626334541]");
        assert!((d6.complexity_bits - 105.6957522862284).abs() < 1e-6);
        assert!((d6.correct_digits - 34.638).abs() < 1e-2);
    }

    #[test]
    fn test_rational_baseline_355_113() {
        let pi: Target = Constant::Pi.into();
        let b = rational_baseline(355, 113, &pi, 60).unwrap();
        assert_eq!(b.label, "355/113");
        assert!((b.absolute_error - 2.667641890624223e-7).abs() < 1e-18);
        assert!((b.correct_digits - 6.573872471368807).abs() < 1e-9);
        assert!((b.complexity_bits - 15.30862344513114).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let pi: Target = Constant::Pi.into();
        assert!(zero_tail_baseline(&pi, 0, 60).is_err());
        assert!(rational_baseline(1, 0, &pi, 60).is_err());
    }
}
