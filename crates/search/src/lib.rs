//! Backward-squaring search for nested-radical approximations.
//!
//! Starting from the target `t`, each level picks a coefficient `a` from a
//! window around `floor(y²)` and continues with the residual `y² - a`; the
//! innermost coefficient is `round(y²)`. Two strategies walk this tree:
//! an exhaustive depth-first search and a beam search that keeps only the
//! most promising prefixes per level. Both run in fast fixed precision and
//! hand their best sequence to the high-precision verifier in `radical`.
//!
//! # Key types
//!
//! - [`SearchEngine`]: chains search, verification and scoring
//! - [`SearchConfig`] / [`BeamConfig`]: configuration loaded from TOML
//! - [`ConstraintWindow`]: admissible coefficients for one residual
//! - [`BeamState`]: partial candidate ordered by provisional error
//! - [`ProvisionalHeuristic`]: scores incomplete beam states
//!   ([`GreedyCompletion`], [`PartialPrefix`])

pub mod beam;
pub mod config;
pub mod engine;
pub mod exhaustive;
pub mod heuristic;
pub mod mocks;
pub mod node;
pub mod window;

pub use beam::{run_beam, run_beam_with};
pub use config::{BeamConfig, CoefficientBounds, HeuristicKind, SearchConfig};
pub use engine::{beam_search, exhaustive_search, RawCandidate, SearchEngine, SearchError};
pub use exhaustive::run_exhaustive;
pub use heuristic::{GreedyCompletion, PartialPrefix, ProvisionalHeuristic};
pub use node::BeamState;
pub use radical::{SearchResult, SearchStats};
pub use window::{check_target, final_coefficient, ConstraintWindow};
