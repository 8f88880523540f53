//! Batch search pipeline, reference scoring and baselines.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use radical::{
    rational_baseline, zero_tail_baseline, Baseline, Evaluator, PortableEvaluator,
    PrecisionVerifier, SearchResult, SearchStats, Target,
};
use search::{BeamConfig, SearchConfig, SearchEngine, SearchError};

use crate::config::{load_run_toml, RunOverrides, RunToml};
use crate::ranking::Finding;
use crate::results::{RunMeta, RunReport};

/// Arguments for the `run` subcommand.
#[derive(Debug)]
pub struct RunArgs {
    /// Path to the run config TOML file; built-in matrix when absent.
    pub config: Option<PathBuf>,
    /// Path for the JSON report.
    pub output: Option<PathBuf>,
    /// CLI values that override the config file.
    pub overrides: RunOverrides,
}

/// Arguments for the `score` subcommand.
#[derive(Debug)]
pub struct ScoreArgs {
    pub target: String,
    pub coeffs: Vec<i64>,
    /// Decimal digits for verification.
    pub digits: u32,
    /// Output as JSON instead of human-readable text.
    pub json: bool,
}

/// Arguments for the `baseline` subcommand.
#[derive(Debug)]
pub struct BaselineArgs {
    pub target: String,
    pub depths: Vec<usize>,
    /// Rational approximations as `(p, q)`.
    pub rationals: Vec<(u64, u64)>,
    pub digits: u32,
    pub json: bool,
}

/// The search a job runs.
#[derive(Debug, Clone)]
pub enum Strategy {
    Exhaustive(SearchConfig),
    Beam(BeamConfig),
}

/// One independent search: a target, a depth and a strategy.
#[derive(Debug, Clone)]
pub struct Job {
    pub target: Target,
    pub depth: usize,
    /// Human-readable strategy description, e.g. `dfs w60 min0`.
    pub label: String,
    pub strategy: Strategy,
}

impl Job {
    pub fn exhaustive(target: Target, depth: usize, config: SearchConfig) -> Self {
        let mut label = format!("dfs w{} min{}", config.window_offset, config.min_coefficient);
        if let Some(max) = config.max_coefficient {
            label.push_str(&format!(" max{max}"));
        }
        Self {
            target,
            depth,
            label,
            strategy: Strategy::Exhaustive(config),
        }
    }

    pub fn beam(target: Target, depth: usize, config: BeamConfig) -> Self {
        let label = format!(
            "beam b{} {:?} {}",
            config.beam_width, config.offsets, config.heuristic
        );
        Self {
            target,
            depth,
            label,
            strategy: Strategy::Beam(config),
        }
    }

    pub fn run(&self, engine: &SearchEngine) -> Result<SearchResult, SearchError> {
        match &self.strategy {
            Strategy::Exhaustive(config) => engine.exhaustive(&self.target, self.depth, config),
            Strategy::Beam(config) => engine.beam(&self.target, self.depth, config),
        }
    }
}

/// Expand a run config into the job matrix: every target × depth ×
/// exhaustive config, plus one beam job per depth with a schedule.
///
/// Malformed targets and beam schedules are rejected here, before any
/// search starts.
pub fn build_jobs(config: &RunToml) -> anyhow::Result<Vec<Job>> {
    let targets = parse_targets(&config.run.targets)?;
    let mut jobs = Vec::new();

    for target in &targets {
        for &depth in &config.run.depths {
            if depth == 0 {
                anyhow::bail!("depth must be at least 1");
            }
            for search in &config.exhaustive {
                search.validate()?;
                jobs.push(Job::exhaustive(target.clone(), depth, search.clone()));
            }
            if !config.beam.enabled {
                continue;
            }
            match config.beam.schedule_for(depth) {
                Some(offsets) => {
                    let beam = BeamConfig {
                        offsets: offsets.to_vec(),
                        beam_width: config.beam.beam_width,
                        heuristic: config.beam.heuristic,
                        ..BeamConfig::default()
                    };
                    beam.validate(depth)?;
                    jobs.push(Job::beam(target.clone(), depth, beam));
                }
                None => {
                    tracing::debug!(depth, "No beam schedule for depth, skipping beam");
                }
            }
        }
    }
    Ok(jobs)
}

fn parse_targets(specs: &[String]) -> anyhow::Result<Vec<Target>> {
    let mut targets = Vec::with_capacity(specs.len());
    for spec in specs {
        targets.push(Target::parse(spec)?);
    }
    Ok(targets)
}

/// What a batch of jobs produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful results in job order.
    pub findings: Vec<Finding>,
    pub failed: usize,
    /// Jobs never dispatched because `cancel` was set.
    pub skipped: usize,
}

/// Run jobs on the blocking pool with at most `concurrency` in flight.
///
/// `cancel` is checked before each dispatch; jobs already running finish.
pub async fn run_jobs(
    engine: SearchEngine,
    jobs: Vec<Job>,
    concurrency: usize,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<BatchOutcome> {
    let total = jobs.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("=> "),
    );

    let sem = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let mut join_set = tokio::task::JoinSet::new();
    let mut finished: Vec<JobOutput> = Vec::with_capacity(total);
    let mut dispatched = 0usize;

    for (index, job) in jobs.into_iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let permit = sem.clone().acquire_owned().await?;
        if cancel.load(Ordering::Relaxed) {
            break;
        }

        tracing::debug!(
            target = %job.target,
            depth = job.depth,
            job = %job.label,
            "Dispatching search"
        );
        let engine = engine.clone();
        join_set.spawn_blocking(move || {
            let _permit = permit;
            let result = job.run(&engine);
            JobOutput { index, job, result }
        });
        dispatched += 1;

        while let Some(joined) = join_set.try_join_next() {
            finished.push(progress(joined?, &pb));
        }
    }

    while let Some(joined) = join_set.join_next().await {
        finished.push(progress(joined?, &pb));
    }

    let skipped = total - dispatched;
    if skipped > 0 {
        pb.abandon_with_message("interrupted");
        tracing::warn!(skipped, "Run interrupted, remaining jobs not dispatched");
    } else {
        pb.finish_with_message("done");
    }

    finished.sort_by_key(|out| out.index);
    let mut outcome = BatchOutcome {
        skipped,
        ..BatchOutcome::default()
    };
    for out in finished {
        match out.result {
            Ok(result) => outcome.findings.push(Finding::new(out.job.label, result)),
            Err(e) => {
                outcome.failed += 1;
                tracing::warn!(
                    target = %out.job.target,
                    depth = out.job.depth,
                    job = %out.job.label,
                    error = %e,
                    "Search failed, skipping"
                );
            }
        }
    }
    Ok(outcome)
}

struct JobOutput {
    index: usize,
    job: Job,
    result: Result<SearchResult, SearchError>,
}

fn progress(out: JobOutput, pb: &ProgressBar) -> JobOutput {
    pb.set_message(format!("{} d{} {}", out.job.target, out.job.depth, out.job.label));
    pb.inc(1);
    out
}

/// Zero-tail baselines for every target and depth, plus the configured
/// rational approximations.
pub fn compute_baselines(config: &RunToml) -> anyhow::Result<Vec<Baseline>> {
    let digits = config.run.verify_digits;
    let mut baselines = Vec::new();
    if config.run.zero_tail_baselines {
        for target in parse_targets(&config.run.targets)? {
            for &depth in &config.run.depths {
                let mut b = zero_tail_baseline(&target, depth, digits)?;
                b.label = format!("{target} {}", b.label);
                baselines.push(b);
            }
        }
    }
    for spec in &config.rational {
        let target = Target::parse(&spec.target)?;
        let mut b = rational_baseline(spec.p, spec.q, &target, digits)?;
        b.label = format!("{target} {}", b.label);
        baselines.push(b);
    }
    Ok(baselines)
}

/// Run the configured search matrix and report the ranked results.
pub async fn run_batch(args: RunArgs) -> anyhow::Result<()> {
    let start = Instant::now();

    // 1. Load config
    let mut config = match &args.config {
        Some(path) => load_run_toml(path)?,
        None => {
            tracing::info!("No config given, using built-in search matrix");
            RunToml::default()
        }
    };
    config.apply(&args.overrides);

    // 2. Build engine and job matrix
    let verifier = PrecisionVerifier::new(config.run.verify_digits, config.run.escalated_digits)?;
    let engine = SearchEngine::new(config.run.backend.build(), verifier);
    let jobs = build_jobs(&config)?;
    let total_jobs = jobs.len();
    tracing::info!(
        jobs = total_jobs,
        targets = ?config.run.targets,
        depths = ?config.run.depths,
        backend = engine.evaluator_name(),
        concurrency = config.run.concurrency,
        "Starting search run"
    );

    // 3. Ctrl-C stops dispatch; running searches finish
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing in-flight searches");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    // 4. Run
    let outcome = run_jobs(engine, jobs, config.run.concurrency, cancel).await?;

    // 5. Baselines
    let baselines = compute_baselines(&config)?;

    // 6. Report
    let report = RunReport::build(
        outcome.findings,
        baselines,
        RunMeta {
            backend: config.run.backend.to_string(),
            verify_digits: config.run.verify_digits,
            total_jobs,
            failed_jobs: outcome.failed,
            skipped_jobs: outcome.skipped,
            elapsed_secs: start.elapsed().as_secs_f64(),
        },
    );
    if let Some(path) = &args.output {
        report.write_json(path)?;
    }
    report.print_summary();
    if let Some(path) = &args.output {
        println!("Output: {}", path.display());
    }

    Ok(())
}

/// Verify and score a user-supplied coefficient sequence.
pub fn score_sequence(target: &Target, coeffs: Vec<i64>, digits: u32) -> anyhow::Result<SearchResult> {
    let escalated = digits.saturating_add(100);
    let verifier = PrecisionVerifier::new(digits, escalated)?;
    let verification = verifier.verify(&coeffs, target)?;
    let search_error = PortableEvaluator.error(&coeffs, target.search_value());
    Ok(SearchResult::from_verification(
        target,
        coeffs,
        search_error,
        &verification,
        SearchStats::default(),
    ))
}

/// Print the score of a reference sequence.
pub fn run_score(args: ScoreArgs) -> anyhow::Result<()> {
    let target = Target::parse(&args.target)?;
    let result = score_sequence(&target, args.coeffs, args.digits)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("--- Reference Score ---");
    println!("Target: {}", result.target);
    println!("Coefficients: {:?}", result.coeffs);
    println!("Approximation: {:.17}", result.approx_value);
    println!("Absolute error: {:.6e}", result.absolute_error);
    println!("Correct digits: {:.4}", result.correct_digits);
    println!("Matched digits: {}", result.matched_digits);
    println!("Complexity: {:.2} bits", result.complexity_bits);
    println!("Efficiency: {:.4}", result.efficiency);
    if result.exact {
        println!("Exact at {} digits", args.digits);
    }

    Ok(())
}

/// Print zero-tail and rational baselines for one target.
pub fn run_baseline(args: BaselineArgs) -> anyhow::Result<()> {
    let target = Target::parse(&args.target)?;
    let mut baselines = Vec::new();
    for &depth in &args.depths {
        baselines.push(zero_tail_baseline(&target, depth, args.digits)?);
    }
    for &(p, q) in &args.rationals {
        baselines.push(rational_baseline(p, q, &target, args.digits)?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&baselines)?);
        return Ok(());
    }

    println!("--- Baselines for {target} ---");
    for b in &baselines {
        println!(
            "{:<16} err={:.3e} D={:.2} L={:.1} E={:.3}  {}",
            b.label, b.absolute_error, b.correct_digits, b.complexity_bits, b.efficiency, b.expression
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use radical::Constant;

    #[test]
    fn test_builtin_matrix_size() {
        let jobs = build_jobs(&RunToml::default()).unwrap();
        // 3 targets × 4 depths × (10 exhaustive + 1 beam)
        assert_eq!(jobs.len(), 132);
        assert_eq!(jobs[0].label, "dfs w60 min0");
        assert!(matches!(jobs[10].strategy, Strategy::Beam(_)));
        assert_eq!(jobs[10].depth, 3);
    }

    #[test]
    fn test_beam_without_schedule_is_skipped() {
        let mut config = RunToml::default();
        config.run.depths = vec![2];
        config.exhaustive.clear();
        assert!(build_jobs(&config).unwrap().is_empty());
    }

    #[test]
    fn test_bad_schedule_rejected_up_front() {
        let mut config = RunToml::default();
        config.run.depths = vec![4];
        config.beam.schedules.insert("4".into(), vec![40, 60]);
        let err = build_jobs(&config).unwrap_err();
        assert!(err.to_string().contains("expected 3 offsets"));
    }

    #[test]
    fn test_bad_target_rejected() {
        let mut config = RunToml::default();
        config.run.targets = vec!["tau-ish".into()];
        assert!(build_jobs(&config).is_err());
    }

    #[test]
    fn test_job_labels() {
        let pi = Target::constant(Constant::Pi);
        let job = Job::exhaustive(pi.clone(), 3, SearchConfig::new(80, 2));
        assert_eq!(job.label, "dfs w80 min2");
        let job = Job::beam(pi, 3, BeamConfig::from_search(&[40, 60], 30, &SearchConfig::default()));
        assert_eq!(job.label, "beam b30 [40, 60] greedy-completion");
    }

    #[test]
    fn test_job_run_exhaustive() {
        let job = Job::exhaustive(Target::constant(Constant::Pi), 3, SearchConfig::default());
        let result = job.run(&SearchEngine::default()).unwrap();
        assert_eq!(result.coeffs, vec![1, 44, 1202]);
    }

    #[test]
    fn test_score_sequence_reference() {
        let pi = Target::constant(Constant::Pi);
        let result = score_sequence(&pi, vec![3, 44, 2, 67], 200).unwrap();
        assert!((result.approx_value - 3.1415924835452222).abs() < 1e-15);
        assert!(result.correct_digits > 6.0);
        assert_eq!(result.matched_digits, 7);
        assert_eq!(result.stats, SearchStats::default());

        assert!(score_sequence(&pi, vec![3, -1], 200).is_err());
    }

    #[test]
    fn test_compute_baselines() {
        let mut config = RunToml::default();
        config.run.targets = vec!["pi".into()];
        config.run.depths = vec![2, 3];
        let baselines = compute_baselines(&config).unwrap();
        assert_eq!(baselines.len(), 3);
        assert_eq!(baselines[0].label, "pi zero-tail d2");
        assert_eq!(baselines[2].label, "pi 355/113");

        config.run.zero_tail_baselines = false;
        assert_eq!(compute_baselines(&config).unwrap().len(), 1);
    }
}
