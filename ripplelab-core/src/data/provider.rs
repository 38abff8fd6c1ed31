//! History provider trait.
//!
//! Abstracts the remote price-history source so the downloader can be
//! exercised against a mock in tests.

use crate::domain::Bar;
use crate::error::DataError;
use chrono::NaiveDate;

/// Inclusive date range for an incremental fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A source of daily price history for one instrument.
///
/// `range: None` requests the full available history. Symbols are
/// provider-native (e.g. `600690.ss`); the file stem before the first `.`
/// names the on-disk instrument file.
pub trait HistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol, date ascending.
    fn fetch(&self, symbol: &str, range: Option<DateRange>) -> Result<Vec<Bar>, DataError>;
}

/// On-disk file name for a provider symbol: stem before the first `.`,
/// with a `.csv` extension (`600690.ss` → `600690.csv`).
pub fn symbol_file_name(symbol: &str) -> String {
    let stem = symbol.split('.').next().unwrap_or(symbol);
    format!("{stem}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_file_name_strips_suffix() {
        assert_eq!(symbol_file_name("600690.ss"), "600690.csv");
        assert_eq!(symbol_file_name("000001.sz"), "000001.csv");
        assert_eq!(symbol_file_name("SH600690"), "SH600690.csv");
    }
}
