//! Run report: grouped, ranked findings plus baselines, exported as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use radical::Baseline;
use serde::{Deserialize, Serialize};

use crate::ranking::{dedupe, efficiency_ranking, rank_by_accuracy, star_performers, Finding};

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Evaluator backend used by the searches.
    pub backend: String,
    /// Decimal digits used for verification.
    pub verify_digits: u32,
    /// Jobs scheduled.
    pub total_jobs: usize,
    /// Jobs that returned a result.
    pub completed_jobs: usize,
    /// Jobs that returned an error.
    pub failed_jobs: usize,
    /// Jobs never dispatched because the run was interrupted.
    pub skipped_jobs: usize,
    /// Wall-clock time for the whole run in seconds.
    pub elapsed_secs: f64,
    /// Median search time per job in milliseconds.
    pub median_job_ms: f64,
    /// Deduplicated findings per target and depth.
    pub groups: Vec<DepthGroup>,
    /// Findings with at least 10 correct digits.
    pub star_performers: Vec<Finding>,
    /// Findings with at least 3 correct digits, most efficient first.
    pub efficiency_ranking: Vec<Finding>,
    /// Non-search reference points.
    #[serde(default)]
    pub baselines: Vec<Baseline>,
}

/// Findings for one target at one depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthGroup {
    pub target: String,
    pub depth: usize,
    /// Sorted by correct digits, highest first.
    pub findings: Vec<Finding>,
    pub best_accuracy: Option<Finding>,
    pub best_efficiency: Option<Finding>,
}

/// Run metadata that does not come from the findings themselves.
#[derive(Debug, Clone, Default)]
pub struct RunMeta {
    pub backend: String,
    pub verify_digits: u32,
    pub total_jobs: usize,
    pub failed_jobs: usize,
    pub skipped_jobs: usize,
    pub elapsed_secs: f64,
}

impl RunReport {
    /// Deduplicate, group and rank raw findings.
    pub fn build(findings: Vec<Finding>, baselines: Vec<Baseline>, meta: RunMeta) -> Self {
        let completed_jobs = findings.len();
        let mut times: Vec<f64> = findings
            .iter()
            .map(|f| f.result.stats.wall_time_ms as f64)
            .collect();
        let median_job_ms = median(&mut times);

        let unique = dedupe(findings);

        let mut by_group: BTreeMap<(String, usize), Vec<Finding>> = BTreeMap::new();
        for finding in &unique {
            by_group
                .entry((finding.result.target.clone(), finding.result.depth()))
                .or_default()
                .push(finding.clone());
        }

        let groups = by_group
            .into_iter()
            .map(|((target, depth), mut findings)| {
                rank_by_accuracy(&mut findings);
                let best_accuracy = findings.first().cloned();
                let best_efficiency = findings
                    .iter()
                    .max_by(|a, b| a.result.efficiency.total_cmp(&b.result.efficiency))
                    .cloned();
                DepthGroup {
                    target,
                    depth,
                    findings,
                    best_accuracy,
                    best_efficiency,
                }
            })
            .collect();

        Self {
            backend: meta.backend,
            verify_digits: meta.verify_digits,
            total_jobs: meta.total_jobs,
            completed_jobs,
            failed_jobs: meta.failed_jobs,
            skipped_jobs: meta.skipped_jobs,
            elapsed_secs: meta.elapsed_secs,
            median_job_ms,
            groups,
            star_performers: star_performers(&unique),
            efficiency_ranking: efficiency_ranking(&unique),
            baselines,
        }
    }

    /// Number of distinct coefficient sequences across all groups.
    pub fn unique_findings(&self) -> usize {
        self.groups.iter().map(|g| g.findings.len()).sum()
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Wrote run report");
        Ok(())
    }

    pub fn read_json(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Plain-text summary on stdout.
    pub fn print_summary(&self) {
        println!("\n--- Search Summary ---");
        println!(
            "Jobs: {}/{} completed ({} failed, {} skipped)",
            self.completed_jobs, self.total_jobs, self.failed_jobs, self.skipped_jobs
        );
        println!("Unique sequences: {}", self.unique_findings());
        println!("Backend: {}", self.backend);
        println!("Median job time: {:.1}ms", self.median_job_ms);
        println!("Elapsed: {:.1}s", self.elapsed_secs);

        for group in &self.groups {
            println!("\n{} depth {}:", group.target, group.depth);
            if let Some(best) = &group.best_accuracy {
                println!("  best accuracy   {}", describe(best));
            }
            if let Some(best) = &group.best_efficiency {
                println!("  best efficiency {}", describe(best));
            }
        }

        if !self.star_performers.is_empty() {
            println!("\nStar performers (>= 10 digits):");
            for finding in &self.star_performers {
                println!("  {} {}", finding.result.target, describe(finding));
            }
        }

        if !self.efficiency_ranking.is_empty() {
            println!("\nTop efficiency (>= 3 digits):");
            for finding in self.efficiency_ranking.iter().take(10) {
                println!("  {} {}", finding.result.target, describe(finding));
            }
        }

        if !self.baselines.is_empty() {
            println!("\nBaselines:");
            for b in &self.baselines {
                println!(
                    "  {:<16} D={:.2} L={:.1} E={:.3}",
                    b.label, b.correct_digits, b.complexity_bits, b.efficiency
                );
            }
        }
    }
}

fn describe(finding: &Finding) -> String {
    let r = &finding.result;
    format!(
        "{:?} err={:.3e} D={:.2} L={:.1} E={:.3} [{}]",
        r.coeffs,
        r.absolute_error,
        r.correct_digits,
        r.complexity_bits,
        r.efficiency,
        finding.sources.join(", ")
    )
}

/// Compute the median of a slice of f64 values.
///
/// Returns 0.0 for empty slices.
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
