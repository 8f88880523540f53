//! Batch driver for nested-radical approximation searches.
//!
//! Expands a TOML run configuration into a matrix of independent
//! (target, depth, strategy) jobs, runs them concurrently on the blocking
//! pool, then deduplicates, ranks and reports the verified results.

pub mod config;
pub mod pipeline;
pub mod ranking;
pub mod results;
