//! Search façade: raw search → high-precision verification → scoring.

use std::sync::Arc;

use radical::{
    Evaluator, EvaluatorBackend, PortableEvaluator, PrecisionVerifier, RadicalError, SearchResult,
    SearchStats, Target,
};

use crate::beam::{run_beam, run_beam_with};
use crate::config::{BeamConfig, SearchConfig};
use crate::exhaustive::run_exhaustive;
use crate::heuristic::ProvisionalHeuristic;

/// Errors that can occur during a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Malformed depth, window, bounds or offsets.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Every branch was empty; no complete sequence satisfies the bounds.
    #[error("No admissible coefficient sequence at depth {depth}")]
    NoCandidate { depth: usize },
    /// Error from evaluation or verification.
    #[error("Radical error: {0}")]
    Radical(#[from] RadicalError),
}

/// Unverified search outcome in the evaluator's fixed precision.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub coeffs: Vec<i64>,
    /// Error as seen by the search evaluator.
    pub error: f64,
    pub stats: SearchStats,
}

/// Runs searches with one evaluator backend and one verifier.
///
/// Cheap to clone; each call owns its own search state, so one engine can
/// serve concurrent jobs.
#[derive(Clone)]
pub struct SearchEngine {
    evaluator: Arc<dyn Evaluator>,
    verifier: PrecisionVerifier,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(Arc::new(PortableEvaluator), PrecisionVerifier::default())
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("evaluator", &self.evaluator.name())
            .field("verifier", &self.verifier)
            .finish()
    }
}

impl SearchEngine {
    pub fn new(evaluator: Arc<dyn Evaluator>, verifier: PrecisionVerifier) -> Self {
        Self {
            evaluator,
            verifier,
        }
    }

    pub fn with_backend(backend: EvaluatorBackend) -> Self {
        Self::new(backend.build(), PrecisionVerifier::default())
    }

    pub fn evaluator_name(&self) -> &'static str {
        self.evaluator.name()
    }

    /// Exhaustive windowed search, verified and scored.
    pub fn exhaustive(
        &self,
        target: &Target,
        depth: usize,
        config: &SearchConfig,
    ) -> Result<SearchResult, SearchError> {
        let raw = run_exhaustive(self.evaluator.as_ref(), target.search_value(), depth, config)?;
        self.finish(target, raw, "exhaustive")
    }

    /// Beam search, verified and scored.
    pub fn beam(
        &self,
        target: &Target,
        depth: usize,
        config: &BeamConfig,
    ) -> Result<SearchResult, SearchError> {
        let raw = run_beam(self.evaluator.as_ref(), target.search_value(), depth, config)?;
        self.finish(target, raw, "beam")
    }

    /// Beam search with a caller-supplied heuristic.
    pub fn beam_with(
        &self,
        heuristic: &dyn ProvisionalHeuristic,
        target: &Target,
        depth: usize,
        config: &BeamConfig,
    ) -> Result<SearchResult, SearchError> {
        let raw = run_beam_with(
            self.evaluator.as_ref(),
            heuristic,
            target.search_value(),
            depth,
            config,
        )?;
        self.finish(target, raw, "beam")
    }

    fn finish(
        &self,
        target: &Target,
        raw: RawCandidate,
        strategy: &'static str,
    ) -> Result<SearchResult, SearchError> {
        let verification = self.verifier.verify(&raw.coeffs, target)?;
        if raw.error == 0.0 && verification.absolute_error > 0.0 {
            tracing::debug!(
                coeffs = ?raw.coeffs,
                verified = verification.absolute_error,
                "Search error underflowed; verified error is nonzero"
            );
        }
        let result = SearchResult::from_verification(
            target,
            raw.coeffs,
            raw.error,
            &verification,
            raw.stats,
        );
        tracing::info!(
            strategy,
            target = %target,
            depth = result.depth(),
            coeffs = ?result.coeffs,
            error = result.absolute_error,
            digits = result.correct_digits,
            bits = result.complexity_bits,
            time_ms = result.stats.wall_time_ms,
            "Search complete"
        );
        Ok(result)
    }
}

/// Exhaustive search with the portable evaluator and default verifier.
pub fn exhaustive_search(
    target: &Target,
    depth: usize,
    config: &SearchConfig,
) -> Result<SearchResult, SearchError> {
    SearchEngine::default().exhaustive(target, depth, config)
}

/// Beam search with the portable evaluator, default verifier and greedy
/// completion; bounds come from `config`.
pub fn beam_search(
    target: &Target,
    depth: usize,
    offsets: &[i64],
    beam_width: usize,
    config: &SearchConfig,
) -> Result<SearchResult, SearchError> {
    let beam = BeamConfig::from_search(offsets, beam_width, config);
    SearchEngine::default().beam(target, depth, &beam)
}
