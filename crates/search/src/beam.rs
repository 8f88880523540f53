//! Level-by-level beam search.
//!
//! Every surviving state is expanded across its window; the expansions are
//! ranked by provisional error and cut to the beam width before the next
//! level. On the last transition the innermost coefficient is fixed to
//! `round(y²)` and the full sequence is evaluated, so the final ranking uses
//! true errors.
//!
//! Pruning happens on provisional errors, so the result can differ from
//! exhaustive search over the same windows even with unlimited time, unless
//! the beam is wide enough to hold every expansion.

use std::time::Instant;

use radical::{DoubleDouble, Evaluator, SearchStats};

use crate::config::BeamConfig;
use crate::engine::{RawCandidate, SearchError};
use crate::heuristic::ProvisionalHeuristic;
use crate::node::BeamState;
use crate::window::{check_target, final_coefficient, ConstraintWindow};

/// Run beam search with the heuristic selected in `config`.
pub fn run_beam(
    evaluator: &dyn Evaluator,
    target: DoubleDouble,
    depth: usize,
    config: &BeamConfig,
) -> Result<RawCandidate, SearchError> {
    let heuristic = config.heuristic.build();
    run_beam_with(evaluator, heuristic.as_ref(), target, depth, config)
}

/// Run beam search with an explicit heuristic, ignoring `config.heuristic`.
pub fn run_beam_with(
    evaluator: &dyn Evaluator,
    heuristic: &dyn ProvisionalHeuristic,
    target: DoubleDouble,
    depth: usize,
    config: &BeamConfig,
) -> Result<RawCandidate, SearchError> {
    config.validate(depth)?;
    check_target(target.hi)?;
    let start = Instant::now();
    let bounds = config.bounds();
    let mut stats = SearchStats::default();

    if depth == 1 {
        let Some(last) = final_coefficient(target.hi).filter(|&a| bounds.contains(a)) else {
            return Err(SearchError::NoCandidate { depth });
        };
        let coeffs = vec![last];
        let error = evaluator.error(&coeffs, target);
        stats.leaves_evaluated = 1;
        stats.wall_time_ms = start.elapsed().as_millis() as u64;
        return Ok(RawCandidate { coeffs, error, stats });
    }

    let mut beam = vec![BeamState::root(target.hi)];
    let last_transition = depth - 2;

    for (level, &offset) in config.offsets.iter().enumerate() {
        let is_final = level == last_transition;
        let mut expansions: Vec<BeamState> = Vec::new();

        for state in &beam {
            stats.nodes_visited += 1;
            let Some(window) = ConstraintWindow::around(*state.residual, offset, bounds) else {
                stats.empty_windows += 1;
                continue;
            };
            let mut candidates = window.candidates();
            let mut expanded = false;

            for (a, next_residual) in candidates.by_ref() {
                expanded = true;
                if is_final {
                    let Some(last) = final_coefficient(next_residual).filter(|&a| bounds.contains(a)) else {
                        stats.out_of_bounds_leaves += 1;
                        continue;
                    };
                    let mut child = state.child(a, next_residual, f64::INFINITY);
                    child.coeffs.push(last);
                    child.provisional_error = evaluator.error(&child.coeffs, target).into();
                    stats.leaves_evaluated += 1;
                    expansions.push(child);
                } else {
                    let mut child = state.child(a, next_residual, f64::INFINITY);
                    child.provisional_error = heuristic
                        .provisional_error(evaluator, &child.coeffs, next_residual, target)
                        .into();
                    expansions.push(child);
                }
            }
            if candidates.was_cut_off() {
                stats.residual_cutoffs += 1;
            }
            if !expanded {
                stats.empty_windows += 1;
            }
        }

        // Stable: equal errors keep enumeration order.
        expansions.sort();
        if expansions.len() > config.beam_width {
            stats.states_truncated += (expansions.len() - config.beam_width) as u64;
            expansions.truncate(config.beam_width);
        }
        stats.peak_beam_size = stats.peak_beam_size.max(expansions.len());

        tracing::trace!(
            level = level + 1,
            offset,
            survivors = expansions.len(),
            "Beam level complete"
        );

        if expansions.is_empty() {
            return Err(SearchError::NoCandidate { depth });
        }
        beam = expansions;
    }

    stats.wall_time_ms = start.elapsed().as_millis() as u64;
    tracing::debug!(
        depth,
        offsets = ?config.offsets,
        beam_width = config.beam_width,
        heuristic = heuristic.name(),
        leaves = stats.leaves_evaluated,
        truncated = stats.states_truncated,
        "Beam search finished"
    );

    // Sorted ascending, so the first state is the first minimum.
    let best = beam.swap_remove(0);
    Ok(RawCandidate {
        coeffs: best.coeffs,
        error: best.provisional_error.into_inner(),
        stats,
    })
}
