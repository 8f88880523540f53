//! Deduplication and ranking of search results across a run.

use std::cmp::Ordering;
use std::collections::HashMap;

use radical::SearchResult;
use serde::{Deserialize, Serialize};

/// Minimum correct digits for a star performer.
pub const STAR_DIGITS: f64 = 10.0;
/// Minimum correct digits to enter the efficiency ranking.
pub const EFFICIENCY_MIN_DIGITS: f64 = 3.0;

/// A distinct coefficient sequence and every job that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Job labels that found this sequence, in first-seen order.
    pub sources: Vec<String>,
    pub result: SearchResult,
}

impl Finding {
    pub fn new(source: impl Into<String>, result: SearchResult) -> Self {
        Self {
            sources: vec![source.into()],
            result,
        }
    }
}

/// Merge findings with the same target and coefficient sequence, keeping the
/// lowest-error instance. The first-seen instance wins ties, and output order
/// follows first appearance.
pub fn dedupe(findings: impl IntoIterator<Item = Finding>) -> Vec<Finding> {
    let mut index: HashMap<(String, Vec<i64>), usize> = HashMap::new();
    let mut merged: Vec<Finding> = Vec::new();

    for finding in findings {
        let key = (finding.result.target.clone(), finding.result.coeffs.clone());
        match index.get(&key) {
            Some(&i) => {
                let kept = &mut merged[i];
                for source in &finding.sources {
                    if !kept.sources.contains(source) {
                        kept.sources.push(source.clone());
                    }
                }
                if finding.result.absolute_error < kept.result.absolute_error {
                    kept.result = finding.result;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(finding);
            }
        }
    }
    merged
}

fn by_accuracy(a: &Finding, b: &Finding) -> Ordering {
    b.result
        .correct_digits
        .total_cmp(&a.result.correct_digits)
        .then_with(|| b.result.efficiency.total_cmp(&a.result.efficiency))
}

fn by_efficiency(a: &Finding, b: &Finding) -> Ordering {
    b.result
        .efficiency
        .total_cmp(&a.result.efficiency)
        .then_with(|| b.result.correct_digits.total_cmp(&a.result.correct_digits))
}

/// Sort by correct digits, highest first; efficiency breaks ties.
pub fn rank_by_accuracy(findings: &mut [Finding]) {
    findings.sort_by(by_accuracy);
}

/// Sort by efficiency, highest first; correct digits break ties.
pub fn rank_by_efficiency(findings: &mut [Finding]) {
    findings.sort_by(by_efficiency);
}

/// Findings with at least [`STAR_DIGITS`] correct digits, most accurate first.
pub fn star_performers(findings: &[Finding]) -> Vec<Finding> {
    let mut stars: Vec<Finding> = findings
        .iter()
        .filter(|f| f.result.correct_digits >= STAR_DIGITS)
        .cloned()
        .collect();
    rank_by_accuracy(&mut stars);
    stars
}

/// Findings with at least [`EFFICIENCY_MIN_DIGITS`] correct digits, most
/// efficient first.
pub fn efficiency_ranking(findings: &[Finding]) -> Vec<Finding> {
    let mut ranked: Vec<Finding> = findings
        .iter()
        .filter(|f| f.result.correct_digits >= EFFICIENCY_MIN_DIGITS)
        .cloned()
        .collect();
    rank_by_efficiency(&mut ranked);
    ranked
}
