//! Daily and intraday series CSV I/O.
//!
//! Daily files carry a header row
//! (`date,opening_price,ceiling_price,floor_price,closing_price,volume,amount`);
//! intraday raw files are headerless with a leading `date,time` pair.
//! Extra columns in daily files are ignored on load.

use crate::domain::{Bar, IntradayBar};
use crate::error::DataError;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;

/// Header policy for [`write_daily`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Append rows; a header is written only if the file does not exist yet.
    Append,
    /// Truncate and rewrite with a header.
    Overwrite,
}

/// Load a daily series, sorted by date ascending.
pub fn load_daily(path: &Path) -> Result<Vec<Bar>, DataError> {
    if !path.is_file() {
        return Err(DataError::MissingFile(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| malformed(path, e))?;
    let mut bars = Vec::new();
    for record in reader.deserialize::<Bar>() {
        bars.push(record.map_err(|e| malformed(path, e))?);
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Load a headerless intraday series, sorted by (date, time).
pub fn load_intraday(path: &Path) -> Result<Vec<IntradayBar>, DataError> {
    if !path.is_file() {
        return Err(DataError::MissingFile(path.to_path_buf()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| malformed(path, e))?;
    let mut bars = Vec::new();
    for record in reader.deserialize::<IntradayBar>() {
        bars.push(record.map_err(|e| malformed(path, e))?);
    }
    bars.sort_by_key(|b| (b.date, b.time));
    Ok(bars)
}

/// Write (or append) a daily series.
pub fn write_daily(path: &Path, bars: &[Bar], mode: WriteMode) -> Result<(), DataError> {
    let write_header = mode == WriteMode::Overwrite || !path.exists();
    let file = match mode {
        WriteMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        WriteMode::Overwrite => OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);
    for bar in bars {
        writer.serialize(bar).map_err(|e| malformed(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

/// Rows of a date-sorted series falling in `[start, end]`, inclusive.
pub fn slice_by_date(bars: &[Bar], start: NaiveDate, end: NaiveDate) -> &[Bar] {
    let lo = bars.partition_point(|b| b.date < start);
    let hi = bars.partition_point(|b| b.date <= end);
    &bars[lo..hi]
}

/// Day-over-day close change for one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyChange {
    pub date: NaiveDate,
    /// `close[t] - close[t-1]`.
    pub rise: f64,
    /// `rise / close[t-1]`.
    pub rise_ratio: f64,
}

/// Close-to-close changes for a date-sorted series (one entry per row after
/// the first).
pub fn rise_ratios(bars: &[Bar]) -> Vec<DailyChange> {
    bars.windows(2)
        .map(|pair| {
            let rise = pair[1].closing_price - pair[0].closing_price;
            DailyChange {
                date: pair[1].date,
                rise,
                rise_ratio: rise / pair[0].closing_price,
            }
        })
        .collect()
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> DataError {
    DataError::Malformed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn bar(date: &str, close: f64) -> Bar {
        Bar {
            date: date.parse().unwrap(),
            opening_price: close,
            ceiling_price: close + 0.5,
            floor_price: close - 0.5,
            closing_price: close,
            volume: 100.0,
            amount: 100.0 * close,
        }
    }

    #[test]
    fn daily_roundtrip_sorted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SH600690.csv");
        // Written out of order; loader sorts ascending.
        let bars = vec![bar("2007-11-30", 11.0), bar("2007-11-29", 10.0)];
        write_daily(&path, &bars, WriteMode::Overwrite).unwrap();
        let loaded = load_daily(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].date, "2007-11-29".parse().unwrap());
        assert_eq!(loaded[1].closing_price, 11.0);
    }

    #[test]
    fn append_writes_header_only_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SH600690.csv");
        write_daily(&path, &[bar("2007-11-29", 10.0)], WriteMode::Append).unwrap();
        write_daily(&path, &[bar("2007-11-30", 11.0)], WriteMode::Append).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let headers = content.lines().filter(|l| l.starts_with("date,")).count();
        assert_eq!(headers, 1);

        let loaded = load_daily(&path).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn overwrite_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SH600690.csv");
        write_daily(&path, &[bar("2007-11-29", 10.0)], WriteMode::Overwrite).unwrap();
        write_daily(&path, &[bar("2007-11-30", 11.0)], WriteMode::Overwrite).unwrap();
        let loaded = load_daily(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].date, "2007-11-30".parse().unwrap());
    }

    #[test]
    fn extra_columns_are_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SH600690.csv");
        std::fs::write(
            &path,
            "date,opening_price,ceiling_price,floor_price,closing_price,volume,amount,turnover\n\
             2007-11-29,10.0,10.5,9.5,10.0,100,1000,0.5\n",
        )
        .unwrap();
        let loaded = load_daily(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].volume, 100.0);
    }

    #[test]
    fn malformed_daily_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SH600690.csv");
        std::fs::write(&path, "date,opening_price\nnot-a-date,xyz\n").unwrap();
        let err = load_daily(&path).unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
    }

    #[test]
    fn intraday_loads_headerless_and_sorts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SH600690.csv");
        std::fs::write(
            &path,
            "2007-11-29,09:40,10.1,10.2,10.0,10.1,100,1010\n\
             2007-11-29,09:35,10.0,10.1,9.9,10.1,120,1200\n",
        )
        .unwrap();
        let loaded = load_intraday(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded[0].time,
            chrono::NaiveTime::from_hms_opt(9, 35, 0).unwrap()
        );
    }

    #[test]
    fn slice_by_date_is_inclusive() {
        let bars = vec![
            bar("2007-11-28", 9.0),
            bar("2007-11-29", 10.0),
            bar("2007-11-30", 11.0),
            bar("2007-12-03", 12.0),
        ];
        let slice = slice_by_date(
            &bars,
            "2007-11-29".parse().unwrap(),
            "2007-11-30".parse().unwrap(),
        );
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].closing_price, 10.0);
    }

    #[test]
    fn rise_ratios_use_previous_close() {
        let bars = vec![bar("2007-11-28", 10.0), bar("2007-11-29", 11.0)];
        let changes = rise_ratios(&bars);
        assert_eq!(changes.len(), 1);
        assert!((changes[0].rise - 1.0).abs() < 1e-12);
        assert!((changes[0].rise_ratio - 0.1).abs() < 1e-12);
    }
}
