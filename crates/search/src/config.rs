use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::SearchError;
use crate::heuristic::{GreedyCompletion, PartialPrefix, ProvisionalHeuristic};

/// Inclusive bounds every coefficient must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoefficientBounds {
    pub min: i64,
    pub max: Option<i64>,
}

impl CoefficientBounds {
    pub fn contains(&self, a: i64) -> bool {
        a >= self.min && self.max.map_or(true, |m| a <= m)
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.min < 0 {
            return Err(SearchError::InvalidArgument(format!(
                "min_coefficient must be non-negative, got {}",
                self.min
            )));
        }
        if let Some(max) = self.max {
            if max < self.min {
                return Err(SearchError::InvalidArgument(format!(
                    "max_coefficient {max} is below min_coefficient {}",
                    self.min
                )));
            }
        }
        Ok(())
    }
}

/// Window configuration for exhaustive search, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Half-width of the window around `floor(y²)` at every level.
    #[serde(default = "default_window_offset")]
    pub window_offset: i64,

    /// Smallest admissible coefficient.
    #[serde(default)]
    pub min_coefficient: i64,

    /// Largest admissible coefficient; unbounded when absent.
    #[serde(default)]
    pub max_coefficient: Option<i64>,
}

fn default_window_offset() -> i64 {
    60
}
fn default_beam_width() -> usize {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            window_offset: default_window_offset(),
            min_coefficient: 0,
            max_coefficient: None,
        }
    }
}

impl SearchConfig {
    pub fn new(window_offset: i64, min_coefficient: i64) -> Self {
        Self {
            window_offset,
            min_coefficient,
            max_coefficient: None,
        }
    }

    pub fn bounds(&self) -> CoefficientBounds {
        CoefficientBounds {
            min: self.min_coefficient,
            max: self.max_coefficient,
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.window_offset < 0 {
            return Err(SearchError::InvalidArgument(format!(
                "window_offset must be non-negative, got {}",
                self.window_offset
            )));
        }
        self.bounds().validate()
    }
}

/// Provisional-error heuristic used for non-final beam levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicKind {
    /// Append the nearest-integer final coefficient and evaluate.
    #[default]
    #[serde(alias = "greedy")]
    GreedyCompletion,
    /// Evaluate the bare prefix.
    #[serde(alias = "prefix")]
    PartialPrefix,
}

impl HeuristicKind {
    pub fn build(self) -> Box<dyn ProvisionalHeuristic> {
        match self {
            Self::GreedyCompletion => Box::new(GreedyCompletion),
            Self::PartialPrefix => Box::new(PartialPrefix),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GreedyCompletion => write!(f, "greedy-completion"),
            Self::PartialPrefix => write!(f, "partial-prefix"),
        }
    }
}

impl FromStr for HeuristicKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy-completion" | "greedy" => Ok(Self::GreedyCompletion),
            "partial-prefix" | "prefix" => Ok(Self::PartialPrefix),
            other => Err(SearchError::InvalidArgument(format!(
                "unknown heuristic {other:?} (expected greedy-completion or partial-prefix)"
            ))),
        }
    }
}

/// Beam search configuration, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamConfig {
    /// One window half-width per level transition (`depth - 1` entries).
    #[serde(default)]
    pub offsets: Vec<i64>,

    /// States kept after each level.
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,

    #[serde(default)]
    pub min_coefficient: i64,

    #[serde(default)]
    pub max_coefficient: Option<i64>,

    #[serde(default)]
    pub heuristic: HeuristicKind,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            offsets: Vec::new(),
            beam_width: default_beam_width(),
            min_coefficient: 0,
            max_coefficient: None,
            heuristic: HeuristicKind::default(),
        }
    }
}

impl BeamConfig {
    /// Beam settings sharing the bounds of an exhaustive config.
    pub fn from_search(offsets: &[i64], beam_width: usize, config: &SearchConfig) -> Self {
        Self {
            offsets: offsets.to_vec(),
            beam_width,
            min_coefficient: config.min_coefficient,
            max_coefficient: config.max_coefficient,
            heuristic: HeuristicKind::default(),
        }
    }

    pub fn bounds(&self) -> CoefficientBounds {
        CoefficientBounds {
            min: self.min_coefficient,
            max: self.max_coefficient,
        }
    }

    /// Check the config against a search depth.
    ///
    /// A beam narrower than the first window is accepted with a warning.
    pub fn validate(&self, depth: usize) -> Result<(), SearchError> {
        if depth == 0 {
            return Err(SearchError::InvalidArgument("depth must be at least 1".into()));
        }
        if self.offsets.len() != depth - 1 {
            return Err(SearchError::InvalidArgument(format!(
                "expected {} offsets for depth {depth}, got {}",
                depth - 1,
                self.offsets.len()
            )));
        }
        if self.beam_width == 0 {
            return Err(SearchError::InvalidArgument("beam_width must be at least 1".into()));
        }
        if let Some(bad) = self.offsets.iter().find(|&&o| o < 0) {
            return Err(SearchError::InvalidArgument(format!(
                "offsets must be non-negative, got {bad}"
            )));
        }
        self.bounds().validate()?;

        if let Some(&first) = self.offsets.first() {
            let window = usize::try_from(first.saturating_mul(2).saturating_add(1)).unwrap_or(usize::MAX);
            if self.beam_width < window {
                tracing::warn!(
                    beam_width = self.beam_width,
                    window,
                    "beam width is smaller than a single window"
                );
            }
        }
        Ok(())
    }
}
