//! Recent-window scan — one signed ripple per instrument over the trailing
//! date range, instead of the windowed historical table.
//!
//! The ratio is `max ceiling / min floor` over the rows in
//! `[end - period_days, end]`, negated when the peak was observed at or
//! before the trough (a falling move).

use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use ripplelab_core::data::series;
use ripplelab_core::domain::StockId;
use ripplelab_core::ripple::validity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentRipple {
    pub stock_id: StockId,
    /// Signed trough-to-peak ratio; negative for falling moves.
    pub ripple_ratio: f64,
}

/// Scan every instrument file for its single recent ripple, sorted
/// descending. Unreadable or empty instruments are skipped.
pub fn recent_ripples(
    data_dir: &Path,
    end_date: NaiveDate,
    period_days: i64,
) -> Result<Vec<RecentRipple>> {
    if !data_dir.is_dir() {
        bail!("data directory does not exist: {}", data_dir.display());
    }
    let start_date = end_date - Duration::days(period_days);
    let files = crate::ranker::instrument_files(data_dir)?;
    info!(files = files.len(), %start_date, %end_date, "scanning recent ripples");

    let mut ripples: Vec<RecentRipple> = files
        .par_iter()
        .filter_map(|path| {
            let stock_id = StockId::from_path(path)?;
            let bars = match series::load_daily(path) {
                Ok(bars) => bars,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable series, skipping");
                    return None;
                }
            };
            let window = series::slice_by_date(&bars, start_date, end_date);
            let ratio = signed_ripple(window)?;
            Some(RecentRipple {
                stock_id,
                ripple_ratio: ratio,
            })
        })
        .collect();

    ripples.sort_by(|a, b| {
        b.ripple_ratio
            .partial_cmp(&a.ripple_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(ripples)
}

/// Signed ripple over one row range; `None` for empty ranges or ranges with
/// a nonpositive floor.
fn signed_ripple(window: &[ripplelab_core::domain::Bar]) -> Option<f64> {
    let (trough, peak) = validity::trough_peak_positions(window)?;
    let floor = window[trough].floor_price;
    let ceiling = window[peak].ceiling_price;
    if floor <= 0.0 || !floor.is_finite() || !ceiling.is_finite() {
        return None;
    }
    let ratio = ceiling / floor;
    Some(if trough < peak { ratio } else { -ratio })
}
