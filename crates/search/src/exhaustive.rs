//! Depth-first search over the full windowed coefficient tree.
//!
//! Each level enumerates its window ascending and recurses on the next
//! residual; the last coefficient is not searched but set to `round(y²)`.
//! The best sequence is replaced only on a strictly smaller error, so among
//! equal errors the first one enumerated wins.

use std::time::Instant;

use radical::{DoubleDouble, Evaluator, SearchStats};

use crate::config::{CoefficientBounds, SearchConfig};
use crate::engine::{RawCandidate, SearchError};
use crate::window::{check_target, final_coefficient, ConstraintWindow};

/// Running best, owned by one search and threaded through the recursion.
struct Best {
    coeffs: Vec<i64>,
    error: f64,
    stats: SearchStats,
}

struct Dfs<'a> {
    evaluator: &'a dyn Evaluator,
    target: DoubleDouble,
    depth: usize,
    offset: i64,
    bounds: CoefficientBounds,
}

impl Dfs<'_> {
    fn descend(&self, prefix: &mut Vec<i64>, residual: f64, best: &mut Best) {
        if prefix.len() + 1 == self.depth {
            self.leaf(prefix, residual, best);
            return;
        }

        best.stats.nodes_visited += 1;
        let Some(window) = ConstraintWindow::around(residual, self.offset, self.bounds) else {
            best.stats.empty_windows += 1;
            return;
        };
        let mut candidates = window.candidates();
        let mut expanded = false;
        for (a, next_residual) in candidates.by_ref() {
            expanded = true;
            prefix.push(a);
            self.descend(prefix, next_residual, best);
            prefix.pop();
        }
        if candidates.was_cut_off() {
            best.stats.residual_cutoffs += 1;
        }
        if !expanded {
            best.stats.empty_windows += 1;
        }
    }

    fn leaf(&self, prefix: &mut Vec<i64>, residual: f64, best: &mut Best) {
        let Some(last) = final_coefficient(residual).filter(|&a| self.bounds.contains(a)) else {
            best.stats.out_of_bounds_leaves += 1;
            return;
        };
        prefix.push(last);
        let error = self.evaluator.error(prefix, self.target);
        best.stats.leaves_evaluated += 1;
        if error < best.error {
            best.error = error;
            best.coeffs.clear();
            best.coeffs.extend_from_slice(prefix);
        }
        prefix.pop();
    }
}

/// Run the exhaustive search in the evaluator's fixed precision.
pub fn run_exhaustive(
    evaluator: &dyn Evaluator,
    target: DoubleDouble,
    depth: usize,
    config: &SearchConfig,
) -> Result<RawCandidate, SearchError> {
    if depth == 0 {
        return Err(SearchError::InvalidArgument("depth must be at least 1".into()));
    }
    config.validate()?;
    check_target(target.hi)?;

    let start = Instant::now();
    let dfs = Dfs {
        evaluator,
        target,
        depth,
        offset: config.window_offset,
        bounds: config.bounds(),
    };
    let mut best = Best {
        coeffs: Vec::with_capacity(depth),
        error: f64::INFINITY,
        stats: SearchStats::default(),
    };
    let mut prefix = Vec::with_capacity(depth);
    dfs.descend(&mut prefix, target.hi, &mut best);
    best.stats.wall_time_ms = start.elapsed().as_millis() as u64;

    tracing::debug!(
        depth,
        window = config.window_offset,
        min = config.min_coefficient,
        leaves = best.stats.leaves_evaluated,
        cutoffs = best.stats.residual_cutoffs,
        "Exhaustive search finished"
    );

    if best.coeffs.is_empty() {
        return Err(SearchError::NoCandidate { depth });
    }
    Ok(RawCandidate {
        coeffs: best.coeffs,
        error: best.error,
        stats: best.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use radical::PortableEvaluator;

    fn pi() -> DoubleDouble {
        DoubleDouble::from_f64(std::f64::consts::PI)
    }

    #[test]
    fn test_depth_one_is_rounded_square() {
        let raw = run_exhaustive(&PortableEvaluator, pi(), 1, &SearchConfig::default()).unwrap();
        assert_eq!(raw.coeffs, vec![10]);
        assert_eq!(raw.stats.leaves_evaluated, 1);
        assert_eq!(raw.stats.nodes_visited, 0);
    }

    #[test]
    fn test_depth_two() {
        let raw = run_exhaustive(&PortableEvaluator, pi(), 2, &SearchConfig::default()).unwrap();
        assert_eq!(raw.coeffs, vec![6, 15]);
        assert!((raw.error - 0.00053772979779243).abs() < 1e-15);
        // a = 0..=9, then 10 goes negative.
        assert_eq!(raw.stats.leaves_evaluated, 10);
        assert_eq!(raw.stats.residual_cutoffs, 1);
    }

    #[test]
    fn test_reference_depth3_stats() {
        let raw = run_exhaustive(&PortableEvaluator, pi(), 3, &SearchConfig::default()).unwrap();
        assert_eq!(raw.coeffs, vec![1, 44, 1202]);
        assert_eq!(raw.error, 9.496882125148431e-8);
        assert_eq!(raw.stats.nodes_visited, 11);
        assert_eq!(raw.stats.leaves_evaluated, 319);
        assert_eq!(raw.stats.residual_cutoffs, 11);
        assert_eq!(raw.stats.empty_windows, 0);
    }

    #[test]
    fn test_min_coefficient_drops_out_of_bounds_leaves() {
        let raw = run_exhaustive(&PortableEvaluator, pi(), 3, &SearchConfig::new(60, 1)).unwrap();
        assert_eq!(raw.coeffs, vec![1, 44, 1202]);
        assert_eq!(raw.stats.leaves_evaluated, 246);
        assert_eq!(raw.stats.out_of_bounds_leaves, 5);
        assert_eq!(raw.stats.empty_windows, 1);
        assert!(raw.coeffs.iter().all(|&a| a >= 1));
    }

    #[test]
    fn test_max_coefficient_caps_every_level() {
        let config = SearchConfig {
            max_coefficient: Some(100),
            ..SearchConfig::new(10, 0)
        };
        let raw = run_exhaustive(&PortableEvaluator, pi(), 3, &config).unwrap();
        assert_eq!(raw.coeffs, vec![2, 55, 48]);
        assert!(raw.coeffs.iter().all(|&a| a <= 100));
    }

    #[test]
    fn test_all_branches_empty_is_no_candidate() {
        let err = run_exhaustive(&PortableEvaluator, pi(), 2, &SearchConfig::new(60, 1000)).unwrap_err();
        assert!(matches!(err, SearchError::NoCandidate { depth: 2 }));
    }

    #[test]
    fn test_invalid_arguments() {
        let err = run_exhaustive(&PortableEvaluator, pi(), 0, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
        assert!(run_exhaustive(&PortableEvaluator, pi(), 3, &SearchConfig::new(-5, 0)).is_err());
    }

    #[test]
    fn test_target_square_past_i64_is_invalid() {
        let big = DoubleDouble::from_f64(1e10);
        for depth in [1, 2] {
            let err = run_exhaustive(&PortableEvaluator, big, depth, &SearchConfig::new(2, 0)).unwrap_err();
            assert!(matches!(err, SearchError::InvalidArgument(_)), "depth {depth}");
        }
    }

    #[test]
    fn test_unrepresentable_final_coefficients_are_skipped() {
        // y² = 1e10; every leaf square is ~1e20.
        let config = SearchConfig {
            max_coefficient: Some(2),
            ..SearchConfig::new(i64::MAX, 0)
        };
        let target = DoubleDouble::from_f64(1e5);
        let err = run_exhaustive(&PortableEvaluator, target, 2, &config).unwrap_err();
        assert!(matches!(err, SearchError::NoCandidate { depth: 2 }));
    }

    #[test]
    fn test_saturated_window_offset() {
        let raw = run_exhaustive(&PortableEvaluator, pi(), 2, &SearchConfig::new(i64::MAX, 0)).unwrap();
        assert_eq!(raw.coeffs, vec![6, 15]);
        assert_eq!(raw.stats.leaves_evaluated, 10);
    }
}
