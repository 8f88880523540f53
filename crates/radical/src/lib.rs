//! Numeric core for nested-radical approximations of real constants.
//!
//! A nested radical `R_k = √(a₁ + √(a₂ + … + √(a_k)))` is described by its
//! coefficient sequence, outermost first. This crate evaluates such
//! sequences, verifies candidates against a target at high decimal
//! precision, and scores them by accuracy per bit of description length.
//!
//! # Key types
//!
//! - [`Fixed`]: arbitrary-precision fixed-point decimal used for verification
//! - [`Target`] / [`Constant`]: the constant being approximated
//! - [`Evaluator`]: fast evaluation strategy used during search
//!   ([`PortableEvaluator`], [`DoubleDoubleEvaluator`])
//! - [`PrecisionVerifier`] / [`Verification`]: underflow-free error measurement
//! - [`Score`]: complexity bits, correct digits and efficiency
//! - [`SearchResult`] / [`SearchStats`]: what a completed search run produces

pub mod baseline;
pub mod ddouble;
pub mod error;
pub mod eval;
pub mod fixed;
pub mod score;
pub mod target;
pub mod types;
pub mod verify;

pub use baseline::{rational_baseline, zero_tail_baseline, Baseline};
pub use ddouble::DoubleDouble;
pub use error::RadicalError;
pub use eval::{
    evaluate_decimal, evaluate_radical, validate_coefficients, DoubleDoubleEvaluator, Evaluator,
    EvaluatorBackend, PortableEvaluator, PrecisionMode, RadicalValue,
};
pub use fixed::Fixed;
pub use score::{
    complexity_bits, correct_digits, efficiency, matched_digits, score, Score, EXACT_MATCH_DIGITS,
};
pub use target::{Constant, Target};
pub use types::{SearchResult, SearchStats};
pub use verify::{verify, PrecisionVerifier, Verification, BASELINE_DIGITS, ESCALATED_DIGITS};
