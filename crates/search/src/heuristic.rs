//! Provisional errors for beam states that are not yet complete.
//!
//! The beam ranks partial prefixes by an estimate of how close their best
//! completion gets to the target. Neither estimate is exact, so the beam
//! can prune the eventual optimum; implementations only need to order
//! prefixes well enough in typical cases.

use radical::{DoubleDouble, Evaluator};

use crate::window::final_coefficient;

/// Scores a partial coefficient sequence during beam search.
pub trait ProvisionalHeuristic: Send + Sync {
    fn name(&self) -> &'static str;

    /// Estimated error of the best completion of `prefix`, where `residual`
    /// is the residual left after the prefix's last coefficient.
    fn provisional_error(
        &self,
        evaluator: &dyn Evaluator,
        prefix: &[i64],
        residual: f64,
        target: DoubleDouble,
    ) -> f64;
}

/// Complete the prefix with the nearest-integer coefficient `round(y²)`
/// and evaluate the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyCompletion;

impl ProvisionalHeuristic for GreedyCompletion {
    fn name(&self) -> &'static str {
        "greedy-completion"
    }

    fn provisional_error(
        &self,
        evaluator: &dyn Evaluator,
        prefix: &[i64],
        residual: f64,
        target: DoubleDouble,
    ) -> f64 {
        let Some(last) = final_coefficient(residual) else {
            return f64::INFINITY;
        };
        let mut completed = Vec::with_capacity(prefix.len() + 1);
        completed.extend_from_slice(prefix);
        completed.push(last);
        evaluator.error(&completed, target)
    }
}

/// Evaluate the prefix as if it were the whole radical.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialPrefix;

impl ProvisionalHeuristic for PartialPrefix {
    fn name(&self) -> &'static str {
        "partial-prefix"
    }

    fn provisional_error(
        &self,
        evaluator: &dyn Evaluator,
        prefix: &[i64],
        _residual: f64,
        target: DoubleDouble,
    ) -> f64 {
        evaluator.error(prefix, target)
    }
}
