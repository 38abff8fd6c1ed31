//! Ripple pipeline — windowing, validity filtering, and trough-to-peak
//! ratio aggregation over a daily series.
//!
//! A "ripple" is the ceiling/floor price ratio inside a fixed-length row
//! window, counted only when the floor was observed before the ceiling
//! (an upward swing). Windows are ranked by ratio, descending; instruments
//! are later ranked by the mean of their top-N ratios.

pub mod exclusion;
pub mod validity;
pub mod window;

pub use exclusion::ExclusionSet;

use crate::data::series;
use crate::domain::Bar;
use crate::error::DataError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default window length in rows.
pub const DEFAULT_PERIOD: usize = 20;

/// Per-window aggregate for a valid (rising) window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAggregate {
    /// 0-based window index in row order.
    pub group_index: usize,
    /// Date of the window's first row (row order, not sorted).
    pub start_date: NaiveDate,
    pub volume_sum: f64,
    /// Minimum floor price in the window.
    pub floor_price: f64,
    /// Maximum ceiling price in the window.
    pub ceiling_price: f64,
    /// `ceiling_price / floor_price`; >= 1 for every rising window.
    pub ripple_ratio: f64,
}

fn aggregate_window(group_index: usize, rows: &[Bar]) -> WindowAggregate {
    let mut floor = f64::INFINITY;
    let mut ceiling = f64::NEG_INFINITY;
    let mut volume_sum = 0.0;
    for bar in rows {
        floor = floor.min(bar.floor_price);
        ceiling = ceiling.max(bar.ceiling_price);
        volume_sum += bar.volume;
    }
    WindowAggregate {
        group_index,
        start_date: rows[0].date,
        volume_sum,
        floor_price: floor,
        ceiling_price: ceiling,
        ripple_ratio: ceiling / floor,
    }
}

/// Run the full pipeline over an in-memory series: drop insane rows, window,
/// keep rising windows, aggregate, and stable-sort descending by ratio.
///
/// Insane rows (non-positive or non-finite prices, floor above ceiling) are
/// removed strictly before windowing, so every surviving window has a
/// positive floor and the ratio never divides by zero.
pub fn ripple_windows(series: &[Bar], period: NonZeroUsize) -> Vec<WindowAggregate> {
    let clean: Vec<Bar> = series.iter().filter(|b| b.is_sane()).cloned().collect();
    let dropped = series.len() - clean.len();
    if dropped > 0 {
        debug!(dropped, "removed insane rows before windowing");
    }

    let mut aggregates: Vec<WindowAggregate> = window::windows(&clean, period)
        .filter(|(_, rows)| validity::is_rising_window(rows))
        .map(|(idx, rows)| aggregate_window(idx, rows))
        .collect();

    // `sort_by` is stable: equal ratios keep window order.
    aggregates.sort_by(|a, b| {
        b.ripple_ratio
            .partial_cmp(&a.ripple_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    aggregates
}

/// Sorted table of window aggregates for one instrument, ratio descending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RippleTable {
    aggregates: Vec<WindowAggregate>,
}

impl RippleTable {
    pub fn from_series(series: &[Bar], period: NonZeroUsize) -> Self {
        Self {
            aggregates: ripple_windows(series, period),
        }
    }

    pub fn aggregates(&self) -> &[WindowAggregate] {
        &self.aggregates
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Largest `n` ripples (the head of the table).
    pub fn top(&self, n: usize) -> &[WindowAggregate] {
        &self.aggregates[..n.min(self.aggregates.len())]
    }

    /// Smallest `n` ripples (the tail of the table), still ratio descending.
    pub fn bottom(&self, n: usize) -> &[WindowAggregate] {
        let len = self.aggregates.len();
        &self.aggregates[len - n.min(len)..]
    }

    /// Arithmetic mean of the top-N ratios; `None` when the table is empty.
    pub fn mean_top(&self, n: usize) -> Option<f64> {
        mean_ratio(self.top(n))
    }

    /// Arithmetic mean of the bottom-N ratios; `None` when the table is empty.
    pub fn mean_bottom(&self, n: usize) -> Option<f64> {
        mean_ratio(self.bottom(n))
    }
}

fn mean_ratio(aggregates: &[WindowAggregate]) -> Option<f64> {
    if aggregates.is_empty() {
        return None;
    }
    let sum: f64 = aggregates.iter().map(|a| a.ripple_ratio).sum();
    Some(sum / aggregates.len() as f64)
}

/// Compute the ripple table for one instrument file.
///
/// Skip conditions return `Ok(None)` and log, so the caller can keep sweeping:
/// excluded instrument, missing file, or a file that fails to parse.
pub fn stock_ripples(
    path: &Path,
    period: NonZeroUsize,
    exclusions: &ExclusionSet,
) -> Result<Option<RippleTable>, DataError> {
    if exclusions.contains_path(path) {
        info!(path = %path.display(), "instrument is excluded, skipping");
        return Ok(None);
    }
    if !path.is_file() {
        warn!(path = %path.display(), "instrument file does not exist, skipping");
        return Ok(None);
    }
    let series = match series::load_daily(path) {
        Ok(series) => series,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read daily series, skipping");
            return Ok(None);
        }
    };
    Ok(Some(RippleTable::from_series(&series, period)))
}

/// Daily rows covering one ripple window: `start_date` of the aggregate at
/// `ripple_idx` through `start_date + days`, inclusive.
pub fn ripple_slice(
    path: &Path,
    table: &RippleTable,
    ripple_idx: usize,
    days: i64,
) -> Result<Vec<Bar>, DataError> {
    let aggregate = table.aggregates().get(ripple_idx).ok_or_else(|| {
        DataError::InvalidArgument(format!(
            "ripple index {ripple_idx} out of range (table has {} windows)",
            table.len()
        ))
    })?;
    let start = aggregate.start_date;
    let end = start + Duration::days(days);
    let series = series::load_daily(path)?;
    Ok(series::slice_by_date(&series, start, end).to_vec())
}
