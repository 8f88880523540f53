//! Arbitrary-precision fixed-point decimals.
//!
//! A [`Fixed`] is `mantissa × 10^(-scale)`. All arithmetic is exact except
//! [`Fixed::sqrt`] (floor at the current scale) and [`Fixed::rescale`]
//! (round half away from zero when digits are dropped). The scale is carried
//! by each value, so there is no ambient working precision to save or restore.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::RadicalError;

/// Largest decimal exponent accepted by [`Fixed::parse`].
const MAX_EXPONENT: i64 = 100_000;

/// Fixed-point decimal number with an explicit number of fractional digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed {
    mantissa: BigInt,
    scale: u32,
}

/// `10^exp` as a big integer.
pub(crate) fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

impl Fixed {
    /// Zero with `scale` fractional digits.
    pub fn zero(scale: u32) -> Self {
        Self {
            mantissa: BigInt::zero(),
            scale,
        }
    }

    /// An integer represented with `scale` fractional digits.
    pub fn from_int(value: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            mantissa: value.into() * pow10(scale),
            scale,
        }
    }

    /// Build directly from a scaled mantissa.
    pub fn from_mantissa(mantissa: BigInt, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    /// Exact rational `p / q`, rounded half away from zero at `scale` digits.
    pub fn ratio(p: impl Into<BigInt>, q: impl Into<BigInt>, scale: u32) -> Result<Self, RadicalError> {
        let q = q.into();
        if q.is_zero() {
            return Err(RadicalError::InvalidArgument("zero denominator".into()));
        }
        let numerator = p.into() * pow10(scale);
        Ok(Self {
            mantissa: round_div(&numerator, &q),
            scale,
        })
    }

    /// The decimal expansion of an `f64`, correctly rounded at `scale` digits.
    pub fn from_f64(value: f64, scale: u32) -> Result<Self, RadicalError> {
        if !value.is_finite() {
            return Err(RadicalError::InvalidArgument(format!(
                "cannot represent {value} as a fixed-point decimal"
            )));
        }
        Self::parse(&format!("{:.*}", scale as usize, value), scale)
    }

    /// Parse `[+-]digits[.digits][e[+-]digits]`, rounding to `scale` digits.
    pub fn parse(text: &str, scale: u32) -> Result<Self, RadicalError> {
        let err = |reason: &str| RadicalError::ParseTarget {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (number, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
            Some(pos) => {
                let exp: i64 = unsigned[pos + 1..]
                    .parse()
                    .map_err(|_| err("malformed exponent"))?;
                (&unsigned[..pos], exp)
            }
            None => (unsigned, 0),
        };
        if exponent.abs() > MAX_EXPONENT {
            return Err(err("exponent out of range"));
        }

        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err("no digits"));
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err("unexpected character"));
        }

        let digits = format!("{int_part}{frac_part}");
        let mut mantissa: BigInt = digits.parse().map_err(|_| err("no digits"))?;
        if negative {
            mantissa = -mantissa;
        }

        let raw_scale = frac_part.len() as i64 - exponent;
        let parsed = if raw_scale >= 0 {
            Self {
                mantissa,
                scale: raw_scale as u32,
            }
        } else {
            Self {
                mantissa: mantissa * pow10((-raw_scale) as u32),
                scale: 0,
            }
        };
        Ok(parsed.rescale(scale))
    }

    /// Number of fractional decimal digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// The scaled integer `value × 10^scale`.
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn abs(&self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            scale: self.scale,
        }
    }

    /// Change the number of fractional digits, rounding half away from zero.
    pub fn rescale(&self, scale: u32) -> Self {
        match scale.cmp(&self.scale) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => Self {
                mantissa: &self.mantissa * pow10(scale - self.scale),
                scale,
            },
            Ordering::Less => Self {
                mantissa: round_div(&self.mantissa, &pow10(self.scale - scale)),
                scale,
            },
        }
    }

    /// `self + n` for an integer `n`, at the same scale.
    pub fn add_int(&self, n: i64) -> Self {
        Self {
            mantissa: &self.mantissa + BigInt::from(n) * pow10(self.scale),
            scale: self.scale,
        }
    }

    /// `self²`, rounded at the same scale.
    pub fn square(&self) -> Self {
        let product = &self.mantissa * &self.mantissa;
        Self {
            mantissa: round_div(&product, &pow10(self.scale)),
            scale: self.scale,
        }
    }

    /// Square root truncated at the current scale; `None` for negative values.
    pub fn sqrt(&self) -> Option<Self> {
        if self.mantissa.is_negative() {
            return None;
        }
        let widened = &self.mantissa * pow10(self.scale);
        Some(Self {
            mantissa: widened.sqrt(),
            scale: self.scale,
        })
    }

    /// Nearest integer, ties away from zero.
    pub fn round_to_integer(&self) -> BigInt {
        round_div(&self.mantissa, &pow10(self.scale))
    }

    /// Nearest `f64`. Values below the subnormal range become `0.0`.
    pub fn to_f64(&self) -> f64 {
        format!("{}e-{}", self.mantissa, self.scale)
            .parse()
            .unwrap_or(f64::NAN)
    }

    /// `log10(self)` computed from the digit string, so it never underflows.
    ///
    /// Returns `None` for zero and negative values.
    pub fn log10(&self) -> Option<f64> {
        if !self.mantissa.is_positive() {
            return None;
        }
        let digits = self.mantissa.to_string();
        let lead_len = digits.len().min(17);
        let lead: f64 = digits[..lead_len].parse().ok()?;
        let shift = (digits.len() - lead_len) as f64 - self.scale as f64;
        Some(lead.log10() + shift)
    }

    /// Decimal rendering with exactly `frac_digits` fractional digits,
    /// truncating (not rounding) anything beyond.
    pub fn to_decimal_string(&self, frac_digits: u32) -> String {
        let truncated = if frac_digits >= self.scale {
            &self.mantissa * pow10(frac_digits - self.scale)
        } else {
            // BigInt division truncates toward zero.
            &self.mantissa / pow10(self.scale - frac_digits)
        };

        let sign = if truncated.is_negative() { "-" } else { "" };
        let mut digits = truncated.abs().to_string();
        let width = frac_digits as usize + 1;
        if digits.len() < width {
            digits = format!("{}{digits}", "0".repeat(width - digits.len()));
        }
        if frac_digits == 0 {
            return format!("{sign}{digits}");
        }
        let (int_part, frac_part) = digits.split_at(digits.len() - frac_digits as usize);
        format!("{sign}{int_part}.{frac_part}")
    }

    fn aligned(&self, other: &Self) -> (BigInt, BigInt, u32) {
        let scale = self.scale.max(other.scale);
        (
            self.rescale(scale).mantissa,
            other.rescale(scale).mantissa,
            scale,
        )
    }
}

/// `n / d` rounded half away from zero. `d` must be positive.
fn round_div(n: &BigInt, d: &BigInt) -> BigInt {
    let (q, r) = n.div_rem(d);
    let twice = r.abs() * 2u32;
    if twice >= *d {
        if n.is_negative() {
            q - BigInt::one()
        } else {
            q + BigInt::one()
        }
    } else {
        q
    }
}

impl Add for &Fixed {
    type Output = Fixed;

    fn add(self, rhs: &Fixed) -> Fixed {
        let (a, b, scale) = self.aligned(rhs);
        Fixed {
            mantissa: a + b,
            scale,
        }
    }
}

impl Sub for &Fixed {
    type Output = Fixed;

    fn sub(self, rhs: &Fixed) -> Fixed {
        let (a, b, scale) = self.aligned(rhs);
        Fixed {
            mantissa: a - b,
            scale,
        }
    }
}

impl PartialOrd for Fixed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fixed {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string(self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_decimal() {
        let x = Fixed::parse("3.25", 4).unwrap();
        assert_eq!(x.mantissa(), &BigInt::from(32500));
        assert_eq!(x.to_string(), "3.2500");
    }

    #[test]
    fn test_parse_sign_and_exponent() {
        assert_eq!(Fixed::parse("-1.5e2", 0).unwrap().to_string(), "-150");
        assert_eq!(Fixed::parse("+25e-3", 3).unwrap().to_string(), "0.025");
        assert_eq!(Fixed::parse(".5", 1).unwrap().to_string(), "0.5");
    }

    #[test]
    fn test_parse_rounds_extra_digits() {
        assert_eq!(Fixed::parse("1.2345", 3).unwrap().to_string(), "1.235");
        assert_eq!(Fixed::parse("-1.2345", 3).unwrap().to_string(), "-1.235");
        assert_eq!(Fixed::parse("1.2344", 3).unwrap().to_string(), "1.234");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Fixed::parse("", 5).is_err());
        assert!(Fixed::parse("pi", 5).is_err());
        assert!(Fixed::parse("1.2.3", 5).is_err());
        assert!(Fixed::parse("1e", 5).is_err());
        assert!(Fixed::parse("1e999999999", 5).is_err());
    }

    #[test]
    fn test_sqrt_truncates() {
        let two = Fixed::from_int(2, 10);
        assert_eq!(two.sqrt().unwrap().to_string(), "1.4142135623");
        assert!(Fixed::from_int(-1, 3).sqrt().is_none());
        assert_eq!(Fixed::from_int(49, 2).sqrt().unwrap().to_string(), "7.00");
    }

    #[test]
    fn test_add_sub_align_scales() {
        let a = Fixed::parse("1.5", 1).unwrap();
        let b = Fixed::parse("0.25", 2).unwrap();
        assert_eq!((&a + &b).to_string(), "1.75");
        assert_eq!((&b - &a).to_string(), "-1.25");
        assert_eq!(a.add_int(3).to_string(), "4.5");
    }

    #[test]
    fn test_to_f64_underflow_is_zero_not_error() {
        let tiny = Fixed::from_mantissa(BigInt::from(1), 400);
        assert_eq!(tiny.to_f64(), 0.0);
        assert!(!tiny.is_zero());
        let log = tiny.log10().unwrap();
        assert!((log + 400.0).abs() < 1e-12);
    }

    #[test]
    fn test_log10_matches_f64() {
        let x = Fixed::parse("0.000123456789", 30).unwrap();
        let expected = 0.000123456789f64.log10();
        assert!((x.log10().unwrap() - expected).abs() < 1e-12);
        assert!(Fixed::zero(5).log10().is_none());
    }

    #[test]
    fn test_ratio_and_rounding() {
        let third = Fixed::ratio(1, 3, 5).unwrap();
        assert_eq!(third.to_string(), "0.33333");
        let two_thirds = Fixed::ratio(2, 3, 5).unwrap();
        assert_eq!(two_thirds.to_string(), "0.66667");
        assert!(Fixed::ratio(1, 0, 5).is_err());
        assert_eq!(Fixed::parse("2.5", 1).unwrap().round_to_integer(), BigInt::from(3));
    }

    #[test]
    fn test_from_f64_is_exact_prefix() {
        let x = Fixed::from_f64(0.1, 30).unwrap();
        // 0.1 is not representable; its binary64 value is slightly above.
        assert_eq!(x.to_string(), "0.100000000000000005551115123126");
    }

    #[test]
    fn test_truncated_rendering() {
        let x = Fixed::parse("-0.0789", 4).unwrap();
        assert_eq!(x.to_decimal_string(2), "-0.07");
        assert_eq!(x.to_decimal_string(6), "-0.078900");
        assert_eq!(Fixed::from_int(12, 0).to_decimal_string(0), "12");
    }

    #[test]
    fn test_ordering() {
        let a = Fixed::parse("1.10", 2).unwrap();
        let b = Fixed::parse("1.1", 1).unwrap();
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert!(Fixed::parse("1.11", 2).unwrap() > b);
    }
}
