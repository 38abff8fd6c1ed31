//! Tabular I/O and remote history providers.

pub mod download;
pub mod listing;
pub mod provider;
pub mod quote;
pub mod series;

pub use download::{retrieve_history, update_batch, update_history, UpdateOutcome, UpdateSummary};
pub use listing::stock_list;
pub use provider::{DateRange, HistoryProvider};
pub use quote::QuoteProvider;
pub use series::WriteMode;
