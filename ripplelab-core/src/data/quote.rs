//! Remote quote-table provider.
//!
//! Fetches per-instrument daily history from a table-CSV endpoint
//! (`table.csv?s=SYMBOL` for the full history, plus `a..f` month/day/year
//! parameters for an incremental range; months are 0-based on the wire).
//! The service has no official contract and is subject to unannounced
//! format changes; parse failures surface as structured errors.

use super::provider::{DateRange, HistoryProvider};
use crate::domain::Bar;
use crate::error::DataError;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "http://table.finance.yahoo.com/table.csv";

/// One row of the remote table CSV, newest first on the wire.
#[derive(Debug, Deserialize)]
struct QuoteRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// Blocking HTTP provider for the quote-table endpoint.
pub struct QuoteProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl QuoteProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the provider at a different endpoint (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Build the request URL. The endpoint counts months from zero.
    fn table_url(&self, symbol: &str, range: Option<DateRange>) -> String {
        match range {
            None => format!("{}?s={symbol}", self.base_url),
            Some(DateRange { start, end }) => format!(
                "{}?a={}&b={}&c={}&d={}&e={}&f={}&s={symbol}",
                self.base_url,
                start.month0(),
                start.day(),
                start.year(),
                end.month0(),
                end.day(),
                end.year(),
            ),
        }
    }

    fn parse_table(symbol: &str, body: &str) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let mut bars = Vec::new();
        for record in reader.deserialize::<QuoteRow>() {
            let row = record.map_err(|e| DataError::Http {
                symbol: symbol.to_string(),
                reason: format!("unexpected table format: {e}"),
            })?;
            // The endpoint reports volume but no turnover; approximate
            // amount from close so the daily schema stays uniform.
            bars.push(Bar {
                date: row.date,
                opening_price: row.open,
                ceiling_price: row.high,
                floor_price: row.low,
                closing_price: row.close,
                volume: row.volume,
                amount: row.volume * row.close,
            });
        }
        if bars.is_empty() {
            return Err(DataError::Http {
                symbol: symbol.to_string(),
                reason: "empty table".into(),
            });
        }
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Bar>, DataError> {
        let url = self.table_url(symbol, range);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, ?delay, "retrying fetch");
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        last_error = Some(DataError::Http {
                            symbol: symbol.to_string(),
                            reason: format!("HTTP {status}"),
                        });
                        continue;
                    }
                    let body = resp.text().map_err(|e| DataError::Http {
                        symbol: symbol.to_string(),
                        reason: format!("read body: {e}"),
                    })?;
                    return Self::parse_table(symbol, &body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::Http {
                            symbol: symbol.to_string(),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    return Err(DataError::Http {
                        symbol: symbol.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Http {
            symbol: symbol.to_string(),
            reason: "max retries exceeded".into(),
        }))
    }
}

impl Default for QuoteProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryProvider for QuoteProvider {
    fn name(&self) -> &str {
        "quote_table"
    }

    fn fetch(&self, symbol: &str, range: Option<DateRange>) -> Result<Vec<Bar>, DataError> {
        self.fetch_with_retry(symbol, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_history_url_has_symbol_only() {
        let provider = QuoteProvider::with_base_url("http://example.test/table.csv");
        assert_eq!(
            provider.table_url("600690.ss", None),
            "http://example.test/table.csv?s=600690.ss"
        );
    }

    #[test]
    fn range_url_uses_zero_based_months() {
        let provider = QuoteProvider::with_base_url("http://example.test/table.csv");
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2007, 11, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2007, 12, 31).unwrap(),
        };
        assert_eq!(
            provider.table_url("600690.ss", Some(range)),
            "http://example.test/table.csv?a=10&b=1&c=2007&d=11&e=31&f=2007&s=600690.ss"
        );
    }

    #[test]
    fn parses_newest_first_table_into_ascending_bars() {
        let body = "Date,Open,High,Low,Close,Volume,Adj Close\n\
                    2007-11-30,11.0,11.5,10.8,11.2,2000,11.2\n\
                    2007-11-29,10.0,10.5,9.8,10.2,1000,10.2\n";
        let bars = QuoteProvider::parse_table("600690.ss", body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2007, 11, 29).unwrap());
        assert_eq!(bars[1].ceiling_price, 11.5);
        assert!((bars[1].amount - 2000.0 * 11.2).abs() < 1e-9);
    }

    #[test]
    fn empty_table_is_an_error() {
        let body = "Date,Open,High,Low,Close,Volume,Adj Close\n";
        let err = QuoteProvider::parse_table("600690.ss", body).unwrap_err();
        assert!(matches!(err, DataError::Http { .. }));
    }
}
