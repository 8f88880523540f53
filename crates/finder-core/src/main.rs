use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use finder_core::config::{RunOverrides, StrategyFilter};
use finder_core::pipeline::{self, BaselineArgs, RunArgs, ScoreArgs};
use radical::EvaluatorBackend;
use search::HeuristicKind;

/// radical-finder: nested-radical approximations of real constants.
#[derive(Parser)]
#[command(name = "radical-finder", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands for batch search, reference scoring and baselines.
#[derive(Subcommand)]
enum Command {
    /// Run the search matrix over targets, depths and window configs.
    Run {
        /// Path to run config TOML file. Uses the built-in matrix when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to write the JSON report.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Override targets (constant names or decimal literals).
        #[arg(long, value_delimiter = ',')]
        targets: Option<Vec<String>>,
        /// Override nesting depths.
        #[arg(long, value_delimiter = ',')]
        depths: Option<Vec<usize>>,
        /// Number of searches to run in parallel.
        #[arg(long)]
        concurrency: Option<usize>,
        /// Fast evaluator backend: portable or double-double.
        #[arg(long)]
        backend: Option<EvaluatorBackend>,
        /// Override the beam width.
        #[arg(long)]
        beam_width: Option<usize>,
        /// Beam heuristic: greedy-completion or partial-prefix.
        #[arg(long)]
        heuristic: Option<HeuristicKind>,
        /// Which strategies to run.
        #[arg(long, value_enum, default_value_t = StrategyFilter::All)]
        strategy: StrategyFilter,
    },
    /// Verify and score a coefficient sequence against a target.
    Score {
        /// Constant name or decimal literal.
        #[arg(long, default_value = "pi")]
        target: String,
        /// Coefficients, outermost first.
        #[arg(required = true, num_args = 1..)]
        coeffs: Vec<i64>,
        /// Decimal digits for verification.
        #[arg(long, default_value_t = radical::BASELINE_DIGITS)]
        digits: u32,
        /// Output as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
    /// Score zero-tail and rational baselines for a target.
    Baseline {
        /// Constant name or decimal literal.
        #[arg(long, default_value = "pi")]
        target: String,
        /// Depths for the zero-tail radical.
        #[arg(long, value_delimiter = ',', default_values_t = vec![3, 4, 5, 6])]
        depths: Vec<usize>,
        /// Rational approximations as p/q, e.g. 355/113.
        #[arg(long, value_delimiter = ',', value_parser = parse_rational)]
        rational: Vec<(u64, u64)>,
        /// Decimal digits for verification.
        #[arg(long, default_value_t = radical::BASELINE_DIGITS)]
        digits: u32,
        /// Output as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
}

fn parse_rational(s: &str) -> Result<(u64, u64), String> {
    let (p, q) = s
        .split_once('/')
        .ok_or_else(|| format!("expected p/q, got {s:?}"))?;
    let p: u64 = p.trim().parse().map_err(|e| format!("bad numerator {p:?}: {e}"))?;
    let q: u64 = q.trim().parse().map_err(|e| format!("bad denominator {q:?}: {e}"))?;
    if q == 0 {
        return Err("denominator must be nonzero".into());
    }
    Ok((p, q))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            output,
            targets,
            depths,
            concurrency,
            backend,
            beam_width,
            heuristic,
            strategy,
        } => {
            pipeline::run_batch(RunArgs {
                config,
                output,
                overrides: RunOverrides {
                    targets,
                    depths,
                    concurrency,
                    backend,
                    beam_width,
                    heuristic,
                    strategy,
                },
            })
            .await
        }
        Command::Score {
            target,
            coeffs,
            digits,
            json,
        } => pipeline::run_score(ScoreArgs {
            target,
            coeffs,
            digits,
            json,
        }),
        Command::Baseline {
            target,
            depths,
            rational,
            digits,
            json,
        } => pipeline::run_baseline(BaselineArgs {
            target,
            depths,
            rationals: rational,
            digits,
            json,
        }),
    }
}
