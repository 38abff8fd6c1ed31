//! RippleLab Core — domain types, daily-bar aggregation, and the ripple pipeline.
//!
//! This crate contains:
//! - Domain types (daily and intraday bars, stock identifiers)
//! - The intraday→daily bar aggregator with its price-swing sanity filter
//! - The ripple pipeline: fixed-length row windows, the rising-window
//!   validity filter, and per-window trough-to-peak ratio aggregation
//! - CSV series I/O and the remote history downloader

pub mod aggregate;
pub mod data;
pub mod domain;
pub mod error;
pub mod ripple;

pub use error::DataError;
