//! Target constants the search tries to approximate.

use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::ddouble::DoubleDouble;
use crate::error::RadicalError;
use crate::eval::GUARD_DIGITS;
use crate::fixed::{pow10, Fixed};

/// Digits used to derive the double-double search value of a target.
const SEARCH_DIGITS: u32 = 60;

/// Well-known constants computable to any number of digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    Phi,
    Sqrt2,
}

impl Constant {
    pub const ALL: [Constant; 4] = [Constant::Pi, Constant::E, Constant::Phi, Constant::Sqrt2];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::E => "e",
            Self::Phi => "phi",
            Self::Sqrt2 => "sqrt2",
        }
    }

    /// Case-insensitive lookup; also accepts `π` and `φ`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "pi" | "π" => Some(Self::Pi),
            "e" => Some(Self::E),
            "phi" | "φ" | "golden" => Some(Self::Phi),
            "sqrt2" | "√2" => Some(Self::Sqrt2),
            _ => None,
        }
    }

    /// The constant rounded to `digits` fractional digits.
    pub fn value(self, digits: u32) -> Fixed {
        let working = digits + GUARD_DIGITS;
        let unity = pow10(working);
        let mantissa = match self {
            Self::Pi => pi_scaled(&unity),
            Self::E => e_scaled(&unity),
            Self::Phi => (&unity + (BigInt::from(5u32) * &unity * &unity).sqrt()) / 2u32,
            Self::Sqrt2 => (BigInt::from(2u32) * &unity * &unity).sqrt(),
        };
        Fixed::from_mantissa(mantissa, working).rescale(digits)
    }
}

/// `arctan(1/x) × unity` by its alternating Taylor series.
fn arctan_recip_scaled(x: u32, unity: &BigInt) -> BigInt {
    let x_squared = BigInt::from(x) * x;
    let mut power = unity / x;
    let mut sum = power.clone();
    let mut k: u32 = 1;
    loop {
        power /= &x_squared;
        if power.is_zero() {
            break;
        }
        let term = &power / (2 * k + 1);
        if k % 2 == 1 {
            sum -= term;
        } else {
            sum += term;
        }
        k += 1;
    }
    sum
}

/// Machin: π = 16·arctan(1/5) − 4·arctan(1/239).
fn pi_scaled(unity: &BigInt) -> BigInt {
    arctan_recip_scaled(5, unity) * 16u32 - arctan_recip_scaled(239, unity) * 4u32
}

/// e = Σ 1/k!.
fn e_scaled(unity: &BigInt) -> BigInt {
    let mut sum = unity.clone();
    let mut term = unity.clone();
    let mut k: u32 = 1;
    loop {
        term /= k;
        if term.is_zero() {
            break;
        }
        sum += &term;
        k += 1;
    }
    sum
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Constant(Constant),
    Literal(String),
}

/// The real value being approximated. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    source: Source,
}

impl Target {
    pub fn constant(constant: Constant) -> Self {
        Self {
            name: constant.name().to_string(),
            source: Source::Constant(constant),
        }
    }

    /// A decimal literal target, e.g. `"1.2020569031595942853997"`.
    pub fn literal(name: impl Into<String>, text: &str) -> Result<Self, RadicalError> {
        let parsed = Fixed::parse(text, SEARCH_DIGITS)?;
        if parsed.is_negative() {
            return Err(RadicalError::InvalidArgument(format!(
                "target {text} is negative; nested radicals are non-negative"
            )));
        }
        Ok(Self {
            name: name.into(),
            source: Source::Literal(text.trim().to_string()),
        })
    }

    /// A constant name (`pi`, `e`, `phi`, `sqrt2`) or a decimal literal.
    pub fn parse(spec: &str) -> Result<Self, RadicalError> {
        match Constant::from_name(spec) {
            Some(c) => Ok(Self::constant(c)),
            None => Self::literal(spec.trim(), spec),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_constant(&self) -> Option<Constant> {
        match self.source {
            Source::Constant(c) => Some(c),
            Source::Literal(_) => None,
        }
    }

    /// The target rounded to `digits` fractional digits.
    pub fn value(&self, digits: u32) -> Fixed {
        match &self.source {
            Source::Constant(c) => c.value(digits),
            // Validated in `literal`.
            Source::Literal(text) => Fixed::parse(text, digits).unwrap_or_else(|_| Fixed::zero(digits)),
        }
    }

    /// Nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        self.value(SEARCH_DIGITS).to_f64()
    }

    /// Double-double split `hi + lo` used by the search evaluators.
    pub fn search_value(&self) -> DoubleDouble {
        let exact = self.value(SEARCH_DIGITS);
        let hi = exact.to_f64();
        let lo = Fixed::from_f64(hi, SEARCH_DIGITS)
            .map(|h| (&exact - &h).to_f64())
            .unwrap_or(0.0);
        DoubleDouble { hi, lo }
    }
}

impl From<Constant> for Target {
    fn from(c: Constant) -> Self {
        Self::constant(c)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PI_50: &str = "3.14159265358979323846264338327950288419716939937511";
    const E_50: &str = "2.71828182845904523536028747135266249775724709369996";
    const PHI_50: &str = "1.61803398874989484820458683436563811772030917980576";
    const SQRT2_50: &str = "1.41421356237309504880168872420969807856967187537695";

    #[test]
    fn test_constants_to_fifty_digits() {
        assert_eq!(Constant::Pi.value(50).to_string(), PI_50);
        assert_eq!(Constant::E.value(50).to_string(), E_50);
        assert_eq!(Constant::Phi.value(50).to_string(), PHI_50);
        assert_eq!(Constant::Sqrt2.value(50).to_string(), SQRT2_50);
    }

    #[test]
    fn test_constant_high_precision_is_consistent() {
        let long = Constant::Pi.value(320);
        assert_eq!(long.scale(), 320);
        assert_eq!(long.rescale(50).to_string(), PI_50);
    }

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(Constant::from_name("PI"), Some(Constant::Pi));
        assert_eq!(Constant::from_name("π"), Some(Constant::Pi));
        assert_eq!(Constant::from_name("φ"), Some(Constant::Phi));
        assert_eq!(Constant::from_name("tau"), None);
    }

    #[test]
    fn test_target_parse_constant_or_literal() {
        let pi = Target::parse("pi").unwrap();
        assert_eq!(pi.name(), "pi");
        assert_eq!(pi.as_constant(), Some(Constant::Pi));

        let zeta3 = Target::parse("1.2020569031595942853997").unwrap();
        assert!(zeta3.as_constant().is_none());
        assert_eq!(zeta3.value(10).to_string(), "1.2020569032");

        assert!(Target::parse("not-a-number").is_err());
        assert!(Target::parse("-2.5").is_err());
    }

    #[test]
    fn test_search_value_splits_exactly() {
        let t = Target::constant(Constant::Pi).search_value();
        assert_eq!(t.hi, std::f64::consts::PI);
        // π - fl(π) ≈ 1.2246e-16
        assert!((t.lo - 1.2246467991473532e-16).abs() < 1e-30);
    }
}
