//! TOML run configuration for the batch driver.
//!
//! Deserializes `configs/search.toml`, which has `[run]`, `[[exhaustive]]`,
//! `[beam]` and `[[rational]]` sections, then merges CLI overrides. Every
//! section is optional; missing sections fall back to the built-in matrix.

use std::collections::BTreeMap;
use std::path::Path;

use radical::EvaluatorBackend;
use search::{HeuristicKind, SearchConfig};
use serde::Deserialize;

/// Top-level structure matching `configs/search.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunToml {
    /// Targets, depths and runtime settings.
    #[serde(default)]
    pub run: RunSettings,
    /// One exhaustive search per entry, per target and depth.
    #[serde(default = "default_exhaustive")]
    pub exhaustive: Vec<SearchConfig>,
    /// Beam search settings.
    #[serde(default)]
    pub beam: BeamSettings,
    /// Rational approximations scored alongside the search results.
    #[serde(default = "default_rationals")]
    pub rational: Vec<RationalSpec>,
}

impl Default for RunToml {
    fn default() -> Self {
        Self {
            run: RunSettings::default(),
            exhaustive: default_exhaustive(),
            beam: BeamSettings::default(),
            rational: default_rationals(),
        }
    }
}

/// The `[run]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    /// Constant names or decimal literals.
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
    #[serde(default = "default_depths")]
    pub depths: Vec<usize>,
    /// Decimal digits for verification.
    #[serde(default = "default_verify_digits")]
    pub verify_digits: u32,
    /// Decimal digits for the escalation retry.
    #[serde(default = "default_escalated_digits")]
    pub escalated_digits: u32,
    /// Number of searches run in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Fast evaluator used inside the searches.
    #[serde(default)]
    pub backend: EvaluatorBackend,
    /// Score the zero-tail radical for every target and depth.
    #[serde(default = "default_true")]
    pub zero_tail_baselines: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            depths: default_depths(),
            verify_digits: default_verify_digits(),
            escalated_digits: default_escalated_digits(),
            concurrency: default_concurrency(),
            backend: EvaluatorBackend::default(),
            zero_tail_baselines: true,
        }
    }
}

/// The `[beam]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BeamSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,
    #[serde(default)]
    pub heuristic: HeuristicKind,
    /// Offsets per depth, keyed by depth (`3 = [40, 60]`).
    #[serde(default = "default_schedules")]
    pub schedules: BTreeMap<String, Vec<i64>>,
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            beam_width: default_beam_width(),
            heuristic: HeuristicKind::default(),
            schedules: default_schedules(),
        }
    }
}

impl BeamSettings {
    /// Offsets configured for `depth`, if any.
    pub fn schedule_for(&self, depth: usize) -> Option<&[i64]> {
        self.schedules
            .get(&depth.to_string())
            .map(|offsets| offsets.as_slice())
    }
}

/// One `[[rational]]` entry: `p/q` scored against `target`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RationalSpec {
    pub target: String,
    pub p: u64,
    pub q: u64,
}

fn default_true() -> bool {
    true
}
fn default_targets() -> Vec<String> {
    vec!["pi".into(), "e".into(), "phi".into()]
}
fn default_depths() -> Vec<usize> {
    vec![3, 4, 5, 6]
}
fn default_verify_digits() -> u32 {
    radical::BASELINE_DIGITS
}
fn default_escalated_digits() -> u32 {
    radical::ESCALATED_DIGITS
}
fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
fn default_beam_width() -> usize {
    30
}

fn default_exhaustive() -> Vec<SearchConfig> {
    [
        (60, 0),
        (60, 1),
        (80, 0),
        (80, 1),
        (80, 2),
        (100, 0),
        (100, 1),
        (100, 2),
        (150, 0),
        (200, 0),
    ]
    .into_iter()
    .map(|(offset, min)| SearchConfig::new(offset, min))
    .collect()
}

fn default_schedules() -> BTreeMap<String, Vec<i64>> {
    BTreeMap::from([
        ("3".to_string(), vec![40, 60]),
        ("4".to_string(), vec![40, 60, 80]),
        ("5".to_string(), vec![40, 60, 80, 100]),
        ("6".to_string(), vec![40, 60, 80, 100, 120]),
    ])
}

fn default_rationals() -> Vec<RationalSpec> {
    vec![RationalSpec {
        target: "pi".into(),
        p: 355,
        q: 113,
    }]
}

/// Which search strategies a run includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyFilter {
    #[default]
    All,
    Exhaustive,
    Beam,
}

/// Optional CLI values that take priority over the TOML file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub targets: Option<Vec<String>>,
    pub depths: Option<Vec<usize>>,
    pub concurrency: Option<usize>,
    pub backend: Option<EvaluatorBackend>,
    pub beam_width: Option<usize>,
    pub heuristic: Option<HeuristicKind>,
    pub strategy: StrategyFilter,
}

impl RunToml {
    /// Apply CLI overrides.
    ///
    /// Priority chain: built-in defaults < TOML values < CLI flags.
    pub fn apply(&mut self, overrides: &RunOverrides) {
        if let Some(targets) = &overrides.targets {
            self.run.targets = targets.clone();
        }
        if let Some(depths) = &overrides.depths {
            self.run.depths = depths.clone();
        }
        if let Some(n) = overrides.concurrency {
            self.run.concurrency = n;
        }
        if let Some(backend) = overrides.backend {
            self.run.backend = backend;
        }
        if let Some(width) = overrides.beam_width {
            self.beam.beam_width = width;
        }
        if let Some(heuristic) = overrides.heuristic {
            self.beam.heuristic = heuristic;
        }
        match overrides.strategy {
            StrategyFilter::All => {}
            StrategyFilter::Exhaustive => self.beam.enabled = false,
            StrategyFilter::Beam => self.exhaustive.clear(),
        }
    }
}

/// Load and deserialize a `RunToml` from a TOML file.
pub fn load_run_toml(path: &Path) -> anyhow::Result<RunToml> {
    let contents = std::fs::read_to_string(path)?;
    let config: RunToml = toml::from_str(&contents)?;
    tracing::info!(path = %path.display(), "Loaded run config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_builtin_matrix() {
        let config: RunToml = toml::from_str("").unwrap();
        assert_eq!(config.run.targets, vec!["pi", "e", "phi"]);
        assert_eq!(config.run.depths, vec![3, 4, 5, 6]);
        assert_eq!(config.run.verify_digits, 200);
        assert_eq!(config.run.escalated_digits, 300);
        assert_eq!(config.run.backend, EvaluatorBackend::Portable);
        assert_eq!(config.exhaustive.len(), 10);
        assert_eq!(config.exhaustive[4], SearchConfig::new(80, 2));
        assert_eq!(config.exhaustive[9], SearchConfig::new(200, 0));
        assert_eq!(config.beam.beam_width, 30);
        assert_eq!(config.beam.schedule_for(5), Some(&[40, 60, 80, 100][..]));
        assert_eq!(config.beam.schedule_for(2), None);
        assert_eq!(config.rational[0].p, 355);
    }

    #[test]
    fn test_parse_full_run_toml() {
        let toml_str = r#"
            [run]
            targets = ["pi", "1.2020569031595942"]
            depths = [3]
            concurrency = 2
            backend = "double-double"
            zero_tail_baselines = false

            [[exhaustive]]
            window_offset = 10
            min_coefficient = 1
            max_coefficient = 500

            [beam]
            beam_width = 8
            heuristic = "partial-prefix"

            [beam.schedules]
            3 = [20, 30]

            [[rational]]
            target = "e"
            p = 87
            q = 32
        "#;
        let config: RunToml = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.targets.len(), 2);
        assert_eq!(config.run.concurrency, 2);
        assert_eq!(config.run.backend, EvaluatorBackend::DoubleDouble);
        assert!(!config.run.zero_tail_baselines);
        assert_eq!(config.exhaustive.len(), 1);
        assert_eq!(config.exhaustive[0].max_coefficient, Some(500));
        assert_eq!(config.beam.heuristic, HeuristicKind::PartialPrefix);
        assert_eq!(config.beam.schedule_for(3), Some(&[20, 30][..]));
        assert_eq!(config.beam.schedule_for(4), None);
        assert_eq!(
            config.rational,
            vec![RationalSpec {
                target: "e".into(),
                p: 87,
                q: 32
            }]
        );
    }

    #[test]
    fn test_empty_exhaustive_list_disables_dfs() {
        let config: RunToml = toml::from_str("exhaustive = []").unwrap();
        assert!(config.exhaustive.is_empty());
        assert!(config.beam.enabled);
    }

    #[test]
    fn test_cli_overrides_take_priority() {
        let mut config: RunToml = toml::from_str("[run]\nconcurrency = 3").unwrap();
        config.apply(&RunOverrides {
            depths: Some(vec![4]),
            concurrency: Some(7),
            beam_width: Some(5),
            strategy: StrategyFilter::Beam,
            ..RunOverrides::default()
        });
        assert_eq!(config.run.depths, vec![4]);
        assert_eq!(config.run.concurrency, 7);
        assert_eq!(config.beam.beam_width, 5);
        assert!(config.exhaustive.is_empty());
        // Untouched fields keep their TOML or default values.
        assert_eq!(config.run.targets.len(), 3);
    }

    #[test]
    fn test_exhaustive_only_disables_beam() {
        let mut config = RunToml::default();
        config.apply(&RunOverrides {
            strategy: StrategyFilter::Exhaustive,
            ..RunOverrides::default()
        });
        assert!(!config.beam.enabled);
        assert_eq!(config.exhaustive.len(), 10);
    }

    #[test]
    fn test_load_run_toml_missing_file() {
        assert!(load_run_toml(Path::new("/nonexistent/search.toml")).is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result: Result<RunToml, _> = toml::from_str("[run]\nbackend = \"gpu\"");
        assert!(result.is_err());
    }
}
