//! Rising-window validity filter.
//!
//! A window only counts as a ripple if the price trough was observed before
//! the price peak: the row position of the minimum floor price must strictly
//! precede the row position of the maximum ceiling price. Windows where the
//! peak comes first (or lands on the same row) are downward or degenerate
//! swings and are dropped before aggregation.

use crate::domain::Bar;

/// Row positions (within the window) of the minimum floor price and the
/// maximum ceiling price. First occurrence wins on equal prices.
///
/// Returns `None` for an empty window.
pub fn trough_peak_positions(window: &[Bar]) -> Option<(usize, usize)> {
    if window.is_empty() {
        return None;
    }
    let mut trough = 0;
    let mut peak = 0;
    for (i, bar) in window.iter().enumerate() {
        if bar.floor_price < window[trough].floor_price {
            trough = i;
        }
        if bar.ceiling_price > window[peak].ceiling_price {
            peak = i;
        }
    }
    Some((trough, peak))
}

/// True iff the window's trough strictly precedes its peak.
pub fn is_rising_window(window: &[Bar]) -> bool {
    matches!(trough_peak_positions(window), Some((trough, peak)) if trough < peak)
}
