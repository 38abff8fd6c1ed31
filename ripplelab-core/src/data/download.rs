//! Download orchestration — full retrieval and incremental updates.
//!
//! Per-symbol failures are logged and counted, never fatal: the batch
//! keeps draining the symbol list and reports a summary at the end.

use super::provider::{symbol_file_name, DateRange, HistoryProvider};
use super::series::{self, WriteMode};
use crate::domain::Bar;
use crate::error::DataError;
use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A stored file whose last date is within this many days of "today" is
/// considered fresh and not re-fetched.
const FRESH_WITHIN_DAYS: i64 = 2;

/// What an incremental update did for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No usable local file; the full history was downloaded.
    Downloaded,
    /// Tail range fetched and merged; carries the number of new rows.
    Updated(usize),
    /// Local file already covers the recent range.
    Fresh,
}

/// Download the full history for one symbol, overwriting any local file.
pub fn retrieve_history(
    provider: &dyn HistoryProvider,
    symbol: &str,
    folder: &Path,
) -> Result<PathBuf, DataError> {
    std::fs::create_dir_all(folder)?;
    let path = folder.join(symbol_file_name(symbol));
    info!(provider = provider.name(), symbol, path = %path.display(), "downloading full history");
    let bars = provider.fetch(symbol, None)?;
    series::write_daily(&path, &bars, WriteMode::Overwrite)?;
    Ok(path)
}

/// Incrementally update one symbol's local file.
///
/// Missing, empty, or unreadable local files trigger a full re-download.
/// Otherwise only the range after the last stored date is fetched and merged
/// (newer rows win on date collisions); the merged file is rewritten through
/// a temp file so a failed fetch never truncates good data.
pub fn update_history(
    provider: &dyn HistoryProvider,
    symbol: &str,
    folder: &Path,
    today: NaiveDate,
) -> Result<UpdateOutcome, DataError> {
    let path = folder.join(symbol_file_name(symbol));
    if !path.is_file() {
        retrieve_history(provider, symbol, folder)?;
        return Ok(UpdateOutcome::Downloaded);
    }

    let existing = match series::load_daily(&path) {
        Ok(bars) if !bars.is_empty() => bars,
        Ok(_) => {
            warn!(symbol, path = %path.display(), "local file is empty, re-downloading");
            retrieve_history(provider, symbol, folder)?;
            return Ok(UpdateOutcome::Downloaded);
        }
        Err(e) => {
            warn!(symbol, path = %path.display(), error = %e, "local file unreadable, re-downloading");
            retrieve_history(provider, symbol, folder)?;
            return Ok(UpdateOutcome::Downloaded);
        }
    };

    let last_date = existing.last().map(|b| b.date).unwrap_or(today);
    if today - last_date < Duration::days(FRESH_WITHIN_DAYS) {
        debug!(symbol, %last_date, "local file is fresh");
        return Ok(UpdateOutcome::Fresh);
    }

    info!(symbol, from = %last_date, to = %today, "updating history");
    let range = DateRange {
        start: last_date + Duration::days(1),
        end: today,
    };
    let fetched = provider.fetch(symbol, Some(range))?;
    let (merged, added) = merge_by_date(existing, fetched);

    let tmp = path.with_extension("csv.tmp");
    series::write_daily(&tmp, &merged, WriteMode::Overwrite)?;
    std::fs::rename(&tmp, &path)?;
    Ok(UpdateOutcome::Updated(added))
}

/// Merge two date-sorted series; rows from `update` replace same-date rows
/// from `existing`. Returns the merged series and the count of new dates.
fn merge_by_date(existing: Vec<Bar>, update: Vec<Bar>) -> (Vec<Bar>, usize) {
    let mut by_date: BTreeMap<NaiveDate, Bar> =
        existing.into_iter().map(|b| (b.date, b)).collect();
    let before = by_date.len();
    for bar in update {
        by_date.insert(bar.date, bar);
    }
    let added = by_date.len() - before;
    (by_date.into_values().collect(), added)
}

/// Summary of a batch update sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    pub total: usize,
    pub downloaded: usize,
    pub updated: usize,
    pub fresh: usize,
    pub failed: usize,
}

/// Update every symbol in the list, in parallel across the rayon pool.
///
/// Symbols are independent; results are joined into a single summary after
/// the sweep. Per-symbol failures never cancel the batch.
pub fn update_batch(
    provider: &dyn HistoryProvider,
    symbols: &[String],
    folder: &Path,
    today: NaiveDate,
) -> UpdateSummary {
    let outcomes: Vec<Result<UpdateOutcome, DataError>> = symbols
        .par_iter()
        .map(|symbol| {
            let result = update_history(provider, symbol, folder, today);
            if let Err(e) = &result {
                warn!(symbol, error = %e, "update failed, continuing batch");
            }
            result
        })
        .collect();

    let mut summary = UpdateSummary {
        total: symbols.len(),
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Ok(UpdateOutcome::Downloaded) => summary.downloaded += 1,
            Ok(UpdateOutcome::Updated(_)) => summary.updated += 1,
            Ok(UpdateOutcome::Fresh) => summary.fresh += 1,
            Err(_) => summary.failed += 1,
        }
    }
    info!(
        total = summary.total,
        downloaded = summary.downloaded,
        updated = summary.updated,
        fresh = summary.fresh,
        failed = summary.failed,
        "batch update complete"
    );
    summary
}
