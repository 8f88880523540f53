use ordered_float::OrderedFloat;

/// A partial candidate carried between beam levels.
///
/// Ordered by provisional error only, so a stable sort keeps enumeration
/// order among equal errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeamState {
    /// Coefficients chosen so far, outermost first.
    pub coeffs: Vec<i64>,
    /// Residual left after the last coefficient.
    pub residual: OrderedFloat<f64>,
    /// Estimated (or, after the final level, exact) error.
    pub provisional_error: OrderedFloat<f64>,
}

impl BeamState {
    /// The single starting state: empty prefix, residual = target.
    pub fn root(target: f64) -> Self {
        Self {
            coeffs: Vec::new(),
            residual: OrderedFloat(target),
            provisional_error: OrderedFloat(f64::INFINITY),
        }
    }

    /// Extend by one coefficient.
    pub fn child(&self, a: i64, residual: f64, provisional_error: f64) -> Self {
        let mut coeffs = Vec::with_capacity(self.coeffs.len() + 2);
        coeffs.extend_from_slice(&self.coeffs);
        coeffs.push(a);
        Self {
            coeffs,
            residual: OrderedFloat(residual),
            provisional_error: OrderedFloat(provisional_error),
        }
    }
}

impl PartialOrd for BeamState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BeamState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.provisional_error.cmp(&other.provisional_error)
    }
}
