//! Bar — the fundamental market data unit.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single instrument on a single day.
///
/// Field names follow the on-disk daily CSV schema:
/// `date, opening_price, ceiling_price, floor_price, closing_price, volume, amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub opening_price: f64,
    pub ceiling_price: f64,
    pub floor_price: f64,
    pub closing_price: f64,
    pub volume: f64,
    pub amount: f64,
}

impl Bar {
    /// Basic OHLCV sanity check: all prices finite and positive, floor at or
    /// below every other price, ceiling at or above every other price.
    ///
    /// Rows failing this are removed before any windowing, which is what
    /// guarantees a nonzero floor at ratio time.
    pub fn is_sane(&self) -> bool {
        let prices = [
            self.opening_price,
            self.ceiling_price,
            self.floor_price,
            self.closing_price,
        ];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        self.floor_price <= self.opening_price
            && self.floor_price <= self.closing_price
            && self.floor_price <= self.ceiling_price
            && self.ceiling_price >= self.opening_price
            && self.ceiling_price >= self.closing_price
    }
}

/// One intraday (e.g. 5-minute) bar, as read from the headerless raw CSV:
/// `date, time, opening_price, ceiling_price, floor_price, closing_price, volume, amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradayBar {
    pub date: NaiveDate,
    #[serde(with = "intraday_time")]
    pub time: NaiveTime,
    pub opening_price: f64,
    pub ceiling_price: f64,
    pub floor_price: f64,
    pub closing_price: f64,
    pub volume: f64,
    pub amount: f64,
}

/// Raw files carry times as `HH:MM` or `HH:MM:SS` depending on the vendor.
mod intraday_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(de)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H%M"))
            .map_err(serde::de::Error::custom)
    }
}
