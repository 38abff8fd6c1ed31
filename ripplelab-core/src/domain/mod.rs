//! Domain types: bars and stock identifiers.

pub mod bar;
pub mod instrument;

pub use bar::{Bar, IntradayBar};
pub use instrument::StockId;
