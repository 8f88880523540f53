//! Test doubles for the evaluator and heuristic seams.

use std::sync::atomic::{AtomicU64, Ordering};

use radical::{DoubleDouble, Evaluator};

use crate::heuristic::ProvisionalHeuristic;

// ---------------------------------------------------------------------------
// CountingEvaluator
// ---------------------------------------------------------------------------

/// Wraps an evaluator and counts calls, for asserting how much work a
/// search did.
pub struct CountingEvaluator<E> {
    inner: E,
    evaluate_calls: AtomicU64,
    error_calls: AtomicU64,
}

impl<E: Evaluator> CountingEvaluator<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            evaluate_calls: AtomicU64::new(0),
            error_calls: AtomicU64::new(0),
        }
    }

    pub fn evaluate_calls(&self) -> u64 {
        self.evaluate_calls.load(Ordering::Relaxed)
    }

    pub fn error_calls(&self) -> u64 {
        self.error_calls.load(Ordering::Relaxed)
    }
}

impl<E: Evaluator> Evaluator for CountingEvaluator<E> {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn evaluate(&self, coeffs: &[i64]) -> f64 {
        self.evaluate_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.evaluate(coeffs)
    }

    fn error(&self, coeffs: &[i64], target: DoubleDouble) -> f64 {
        self.error_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.error(coeffs, target)
    }
}

// ---------------------------------------------------------------------------
// ConstantHeuristic
// ---------------------------------------------------------------------------

/// Gives every partial state the same provisional error, so beam survivors
/// are decided by enumeration order alone.
#[derive(Debug, Clone, Copy)]
pub struct ConstantHeuristic(pub f64);

impl ProvisionalHeuristic for ConstantHeuristic {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn provisional_error(
        &self,
        _evaluator: &dyn Evaluator,
        _prefix: &[i64],
        _residual: f64,
        _target: DoubleDouble,
    ) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radical::PortableEvaluator;

    #[test]
    fn test_counting_evaluator_counts_and_delegates() {
        let counter = CountingEvaluator::new(PortableEvaluator);
        assert_eq!(counter.evaluate(&[16]), 4.0);
        let err = counter.error(&[16], DoubleDouble::from_f64(3.0));
        assert_eq!(err, 1.0);
        assert_eq!(counter.evaluate_calls(), 1);
        assert_eq!(counter.error_calls(), 1);
    }

    #[test]
    fn test_constant_heuristic() {
        let h = ConstantHeuristic(0.25);
        let target = DoubleDouble::from_f64(1.0);
        assert_eq!(h.provisional_error(&PortableEvaluator, &[1, 2], 0.5, target), 0.25);
    }
}
