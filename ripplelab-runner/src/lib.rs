//! RippleLab Runner — batch orchestration over a universe of instrument files.
//!
//! The per-instrument ripple pipeline lives in `ripplelab-core`; this crate
//! sweeps it across a data directory (in parallel), assembles the instrument
//! leaderboard, runs recent-window scans, and exports results.

pub mod config;
pub mod export;
pub mod ranker;
pub mod recent;

pub use config::RankerConfig;
pub use ranker::{rank_universe, InstrumentScore};
pub use recent::{recent_ripples, RecentRipple};
