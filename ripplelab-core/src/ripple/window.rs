//! Fixed-length row windows over a daily series.
//!
//! A series of length `L` is partitioned into contiguous, non-overlapping
//! windows of `period` rows each; the final window absorbs the remainder
//! (`L mod period` rows). Window indices are 0-based and monotonically
//! increasing in row order.

use crate::domain::Bar;
use std::num::NonZeroUsize;

/// Assign a window index to every row position.
///
/// Pure and stable: rows `[0, period)` get index 0, rows `[period, 2*period)`
/// get index 1, and so on. `period >= len` yields a single window 0.
pub fn group_indices(len: usize, period: NonZeroUsize) -> Vec<usize> {
    (0..len).map(|row| row / period.get()).collect()
}

/// Iterate the windows of a series as contiguous slices, paired with their
/// window index. Slice boundaries match [`group_indices`] exactly.
pub fn windows(rows: &[Bar], period: NonZeroUsize) -> impl Iterator<Item = (usize, &[Bar])> {
    rows.chunks(period.get()).enumerate()
}
