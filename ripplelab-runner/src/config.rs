//! Serializable ranker configuration.

use ripplelab_core::ripple::{ExclusionSet, DEFAULT_PERIOD};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// Default top-N count for the per-instrument mean.
pub const DEFAULT_MEAN_NUM: usize = 10;

/// Configuration for a universe ranking sweep.
///
/// Loadable from TOML:
///
/// ```toml
/// period = 20
/// mean_num = 10
///
/// [exclusions]
/// excluded = ["SZ131809"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Window length in rows.
    pub period: NonZeroUsize,
    /// Number of top ripples averaged into the instrument score.
    pub mean_num: usize,
    /// Instruments skipped entirely.
    pub exclusions: ExclusionSet,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            period: NonZeroUsize::new(DEFAULT_PERIOD).unwrap(),
            mean_num: DEFAULT_MEAN_NUM,
            exclusions: ExclusionSet::known_bad(),
        }
    }
}

impl RankerConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn with_period(mut self, period: NonZeroUsize) -> Self {
        self.period = period;
        self
    }

    pub fn with_mean_num(mut self, mean_num: usize) -> Self {
        self.mean_num = mean_num;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }
}
