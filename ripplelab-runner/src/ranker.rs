//! Universe ranker — sweep the ripple pipeline across a data directory.
//!
//! One instrument per `{EXCHANGE}{CODE}.csv` file. Instruments are
//! independent, so the sweep runs on the rayon pool and joins before the
//! final sort. Per-instrument problems (excluded, missing, malformed) skip
//! that instrument; a missing data directory aborts with no partial output.

use crate::config::RankerConfig;
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use ripplelab_core::domain::StockId;
use ripplelab_core::ripple::{stock_ripples, RippleTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Per-instrument leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentScore {
    pub stock_id: StockId,
    /// Mean ripple ratio of the instrument's top-N windows.
    pub mean_rise_ratio: f64,
    /// Mean ripple ratio of the instrument's bottom-N windows.
    pub mean_fall_ratio: f64,
}

/// Rank every instrument file under `data_dir` by mean top-N ripple ratio,
/// descending. Instruments yielding no valid windows are absent from the
/// result (not scored zero).
pub fn rank_universe(data_dir: &Path, config: &RankerConfig) -> Result<Vec<InstrumentScore>> {
    if !data_dir.is_dir() {
        bail!("data directory does not exist: {}", data_dir.display());
    }

    let files = instrument_files(data_dir)
        .with_context(|| format!("listing instrument files in {}", data_dir.display()))?;
    info!(files = files.len(), dir = %data_dir.display(), "ranking universe");

    let mut scores: Vec<InstrumentScore> = files
        .par_iter()
        .filter_map(|path| score_instrument(path, config))
        .collect();

    // Stable descending sort; scores are finite by construction.
    scores.sort_by(|a, b| {
        b.mean_rise_ratio
            .partial_cmp(&a.mean_rise_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    info!(scored = scores.len(), "universe ranking complete");
    Ok(scores)
}

fn score_instrument(path: &Path, config: &RankerConfig) -> Option<InstrumentScore> {
    let stock_id = StockId::from_path(path)?;
    let table: RippleTable = match stock_ripples(path, config.period, &config.exclusions) {
        Ok(Some(table)) if !table.is_empty() => table,
        Ok(_) => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "pipeline failed, skipping instrument");
            return None;
        }
    };
    let mean_rise = table.mean_top(config.mean_num)?;
    let mean_fall = table.mean_bottom(config.mean_num)?;
    if !mean_rise.is_finite() || !mean_fall.is_finite() {
        return None;
    }
    Some(InstrumentScore {
        stock_id,
        mean_rise_ratio: mean_rise,
        mean_fall_ratio: mean_fall,
    })
}

/// All `*.csv` files in the directory, sorted for a deterministic sweep order.
pub(crate) fn instrument_files(data_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(data_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file() && p.extension().and_then(|ext| ext.to_str()) == Some("csv")
        })
        .collect();
    files.sort();
    Ok(files)
}
