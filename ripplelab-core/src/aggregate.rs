//! Intraday→daily bar aggregation.
//!
//! Collapses 5-minute bars into one daily bar per calendar date. A date whose
//! intraday opening prices swing more than the exchange limit (with margin)
//! is tagged invalid and dropped from the output — corrupt vendor rows show
//! up as impossible intraday jumps.

use crate::data::series::{self, WriteMode};
use crate::domain::{Bar, IntradayBar};
use crate::error::DataError;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Allowed intraday swing on the opening-price series: `(max - min) / min`
/// must stay below this. The daily limit is 10%; consecutive-session drift
/// inside one raw file pushes the practical bound to 22.3%.
pub const MAX_INTRADAY_SWING: f64 = 0.223;

/// Aggregation result for one calendar date.
///
/// Invalid dates are tagged explicitly rather than zero-filled, so genuine
/// prices can never collide with a sentinel value.
#[derive(Debug, Clone, PartialEq)]
pub enum DayAggregate {
    Valid(Bar),
    Invalid {
        date: NaiveDate,
        volume: f64,
        amount: f64,
    },
}

impl DayAggregate {
    pub fn into_valid(self) -> Option<Bar> {
        match self {
            DayAggregate::Valid(bar) => Some(bar),
            DayAggregate::Invalid { .. } => None,
        }
    }
}

/// Whether a date's opening-price series stays inside the swing bound.
fn valid_price_swing(rows: &[IntradayBar]) -> bool {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in rows {
        min = min.min(row.opening_price);
        max = max.max(row.opening_price);
    }
    min > 0.0 && (max - min) / min < MAX_INTRADAY_SWING
}

/// Aggregate one date's intraday rows into a daily bar.
///
/// Rows are ordered by time before picking first/last. Volume and amount sum
/// unconditionally; prices are only kept when the swing check passes.
pub fn aggregate_day(date: NaiveDate, rows: &[IntradayBar]) -> DayAggregate {
    let volume: f64 = rows.iter().map(|r| r.volume).sum();
    let amount: f64 = rows.iter().map(|r| r.amount).sum();

    if rows.is_empty() || !valid_price_swing(rows) {
        return DayAggregate::Invalid {
            date,
            volume,
            amount,
        };
    }

    let mut ordered: Vec<&IntradayBar> = rows.iter().collect();
    ordered.sort_by_key(|r| r.time);

    let opening = ordered.first().map(|r| r.opening_price).unwrap_or(0.0);
    let closing = ordered.last().map(|r| r.closing_price).unwrap_or(0.0);
    let ceiling = rows
        .iter()
        .map(|r| r.ceiling_price)
        .fold(f64::NEG_INFINITY, f64::max);
    let floor = rows.iter().map(|r| r.floor_price).fold(f64::INFINITY, f64::min);

    DayAggregate::Valid(Bar {
        date,
        opening_price: opening,
        ceiling_price: ceiling,
        floor_price: floor,
        closing_price: closing,
        volume,
        amount,
    })
}

/// Convert one intraday file into daily rows appended to `output`.
///
/// A missing input file is reported and skipped (`Ok(None)`), so the batch
/// sweep can keep going over directories with gaps. Returns the number of
/// daily rows written.
pub fn minutes_to_days(
    input: &Path,
    output: &Path,
    mode: WriteMode,
) -> Result<Option<usize>, DataError> {
    if !input.is_file() {
        warn!(path = %input.display(), "intraday file does not exist, skipping");
        return Ok(None);
    }

    let intraday = series::load_intraday(input)?;
    let mut by_date: BTreeMap<NaiveDate, Vec<IntradayBar>> = BTreeMap::new();
    for row in intraday {
        by_date.entry(row.date).or_default().push(row);
    }

    let total_dates = by_date.len();
    let days: Vec<Bar> = by_date
        .into_iter()
        .filter_map(|(date, rows)| aggregate_day(date, &rows).into_valid())
        .collect();
    let dropped = total_dates - days.len();
    if dropped > 0 {
        debug!(path = %input.display(), dropped, "dropped invalid dates");
    }

    series::write_daily(output, &days, mode)?;
    info!(
        rows = days.len(),
        input = %input.display(),
        output = %output.display(),
        "appended daily rows"
    );
    Ok(Some(days.len()))
}

/// Summary of a batch conversion sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Convert every intraday file under `basedir/{subdir}` into daily files
/// under `outdir`, appending across subdirs (years) that share a file name.
///
/// Missing top-level directories abort; per-file failures are logged and
/// counted.
pub fn minutes_to_days_batch(
    basedir: &Path,
    outdir: &Path,
    subdirs: &[String],
) -> Result<ConvertSummary, DataError> {
    if !basedir.is_dir() {
        return Err(DataError::MissingDirectory(basedir.to_path_buf()));
    }
    if !outdir.is_dir() {
        return Err(DataError::MissingDirectory(outdir.to_path_buf()));
    }

    let mut summary = ConvertSummary::default();
    for subdir in subdirs {
        let dir = basedir.join(subdir);
        if !dir.is_dir() {
            warn!(path = %dir.display(), "subdirectory does not exist, skipping");
            continue;
        }
        let mut entries: Vec<_> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        entries.sort();

        for input in entries {
            let Some(name) = input.file_name() else {
                continue;
            };
            let output = outdir.join(name);
            match minutes_to_days(&input, &output, WriteMode::Append) {
                Ok(Some(_)) => summary.converted += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    warn!(path = %input.display(), error = %e, "conversion failed, continuing");
                    summary.failed += 1;
                }
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use tempfile::tempdir;

    fn row(time: &str, open: f64, close: f64) -> IntradayBar {
        IntradayBar {
            date: "2007-11-29".parse().unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            opening_price: open,
            ceiling_price: open.max(close) + 0.1,
            floor_price: open.min(close) - 0.1,
            closing_price: close,
            volume: 100.0,
            amount: 1_000.0,
        }
    }

    fn date() -> NaiveDate {
        "2007-11-29".parse().unwrap()
    }

    #[test]
    fn aggregates_valid_date() {
        let rows = vec![
            row("09:35", 10.0, 10.1),
            row("09:40", 10.1, 10.3),
            row("09:45", 10.3, 10.2),
        ];
        let DayAggregate::Valid(bar) = aggregate_day(date(), &rows) else {
            panic!("expected valid day");
        };
        assert_eq!(bar.opening_price, 10.0);
        assert_eq!(bar.closing_price, 10.2);
        assert_eq!(bar.ceiling_price, 10.4); // max(open, close) + 0.1 of row 2
        assert_eq!(bar.floor_price, 9.9);
        assert_eq!(bar.volume, 300.0);
        assert_eq!(bar.amount, 3_000.0);
    }

    #[test]
    fn first_and_last_follow_time_order_not_input_order() {
        let rows = vec![
            row("09:45", 10.3, 10.2),
            row("09:35", 10.0, 10.1),
            row("09:40", 10.1, 10.3),
        ];
        let DayAggregate::Valid(bar) = aggregate_day(date(), &rows) else {
            panic!("expected valid day");
        };
        assert_eq!(bar.opening_price, 10.0);
        assert_eq!(bar.closing_price, 10.2);
    }

    #[test]
    fn excessive_swing_invalidates_date() {
        // Opens 10 -> 13: swing 0.3 >= 0.223.
        let rows = vec![
            row("09:35", 10.0, 10.1),
            row("09:40", 10.5, 10.6),
            row("09:45", 13.0, 13.1),
        ];
        let agg = aggregate_day(date(), &rows);
        let DayAggregate::Invalid { volume, amount, .. } = agg else {
            panic!("expected invalid day");
        };
        // Volume and amount still sum unconditionally.
        assert_eq!(volume, 300.0);
        assert_eq!(amount, 3_000.0);
    }

    #[test]
    fn swing_just_under_bound_is_valid() {
        let rows = vec![row("09:35", 10.0, 10.1), row("09:40", 12.2, 12.3)];
        assert!(matches!(aggregate_day(date(), &rows), DayAggregate::Valid(_)));
    }

    #[test]
    fn empty_date_is_invalid() {
        assert!(matches!(
            aggregate_day(date(), &[]),
            DayAggregate::Invalid { .. }
        ));
    }

    #[test]
    fn missing_input_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("SH600690.csv");
        let result =
            minutes_to_days(Path::new("no/such/file.csv"), &out, WriteMode::Append).unwrap();
        assert_eq!(result, None);
        assert!(!out.exists());
    }

    #[test]
    fn converts_file_and_drops_invalid_dates() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        // Two dates: the second has an illegal swing and must be dropped.
        std::fs::write(
            &input,
            "2007-11-29,09:35,10.0,10.2,9.9,10.1,100,1000\n\
             2007-11-29,09:40,10.1,10.4,10.0,10.3,100,1000\n\
             2007-11-30,09:35,10.0,10.2,9.9,10.1,100,1000\n\
             2007-11-30,09:40,13.0,13.2,12.9,13.1,100,1000\n",
        )
        .unwrap();
        let output = dir.path().join("SH600690.csv");

        let written = minutes_to_days(&input, &output, WriteMode::Append).unwrap();
        assert_eq!(written, Some(1));

        let days = series::load_daily(&output).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, "2007-11-29".parse().unwrap());
        assert_eq!(days[0].volume, 200.0);
    }

    #[test]
    fn batch_requires_directories() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = minutes_to_days_batch(&missing, dir.path(), &[]).unwrap_err();
        assert!(matches!(err, DataError::MissingDirectory(_)));
    }

    #[test]
    fn batch_appends_across_subdirs() {
        let base = tempdir().unwrap();
        let out = tempdir().unwrap();
        for (year, day) in [("2007", "2007-11-29"), ("2008", "2008-01-04")] {
            let sub = base.path().join(year);
            std::fs::create_dir(&sub).unwrap();
            std::fs::write(
                sub.join("SH600690.csv"),
                format!(
                    "{day},09:35,10.0,10.2,9.9,10.1,100,1000\n\
                     {day},09:40,10.1,10.4,10.0,10.3,100,1000\n"
                ),
            )
            .unwrap();
        }

        let summary = minutes_to_days_batch(
            base.path(),
            out.path(),
            &["2007".to_string(), "2008".to_string()],
        )
        .unwrap();
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed, 0);

        let days = series::load_daily(&out.path().join("SH600690.csv")).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2007-11-29".parse().unwrap());
    }
}
