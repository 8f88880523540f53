//! Double-double arithmetic: an unevaluated sum `hi + lo` of two `f64`s.
//!
//! Only the operations the radical fold needs are provided (add an integer,
//! square root, difference). Each uses error-free transformations, giving
//! roughly 31 significant decimal digits.

/// `hi + lo` with `|lo| <= ulp(hi) / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DoubleDouble {
    pub hi: f64,
    pub lo: f64,
}

#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

#[inline]
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let err = b - (s - a);
    (s, err)
}

#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let err = a.mul_add(b, -p);
    (p, err)
}

impl DoubleDouble {
    pub fn new(hi: f64, lo: f64) -> Self {
        let (hi, lo) = quick_two_sum(hi, lo);
        Self { hi, lo }
    }

    pub fn from_f64(x: f64) -> Self {
        Self { hi: x, lo: 0.0 }
    }

    /// `self + x`.
    #[inline]
    pub fn add_f64(self, x: f64) -> Self {
        let (s, e) = two_sum(self.hi, x);
        let (hi, lo) = quick_two_sum(s, e + self.lo);
        Self { hi, lo }
    }

    /// `self - other`.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        let (s, e) = two_sum(self.hi, -other.hi);
        let (hi, lo) = quick_two_sum(s, e + (self.lo - other.lo));
        Self { hi, lo }
    }

    /// Square root by one Newton correction of the binary64 root.
    /// Non-positive inputs return zero.
    #[inline]
    pub fn sqrt(self) -> Self {
        if self.hi <= 0.0 {
            return Self::default();
        }
        let x = self.hi.sqrt();
        let (p, e) = two_prod(x, x);
        let residual = (self.hi - p) - e + self.lo;
        let (hi, lo) = quick_two_sum(x, residual / (2.0 * x));
        Self { hi, lo }
    }

    /// Collapse to the nearest `f64`.
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_two_beyond_binary64() {
        let root = DoubleDouble::from_f64(2.0).sqrt();
        // Residual 2 - root² must be far below binary64 resolution at 2.0.
        let (p, e) = two_prod(root.hi, root.hi);
        let cross = 2.0 * root.hi * root.lo;
        let residual = ((2.0 - p) - e) - cross;
        assert!(residual.abs() < 1e-29, "residual {residual}");
        assert_eq!(root.hi, std::f64::consts::SQRT_2);
        assert!(root.lo != 0.0);
    }

    #[test]
    fn test_sub_keeps_low_order_difference() {
        let a = DoubleDouble::new(1.0, 1e-20);
        let b = DoubleDouble::from_f64(1.0);
        let d = a.sub(b);
        assert!((d.to_f64() - 1e-20).abs() < 1e-35);
    }

    #[test]
    fn test_sqrt_of_zero_and_negative() {
        assert_eq!(DoubleDouble::from_f64(0.0).sqrt(), DoubleDouble::default());
        assert_eq!(DoubleDouble::from_f64(-4.0).sqrt(), DoubleDouble::default());
    }

    #[test]
    fn test_add_integer_exact_for_small_values() {
        let x = DoubleDouble::from_f64(0.5).add_f64(1_000_000.0);
        assert_eq!(x.hi, 1_000_000.5);
        assert_eq!(x.lo, 0.0);
    }
}
