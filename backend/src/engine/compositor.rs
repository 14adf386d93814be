//! Dual-line frame composition.

use crate::models::{CombinedFrame, CombinedRow, LineMapEntry};

/// Align two line maps row by row.
///
/// The frame has `max(left.len(), right.len())` rows. Past the end of the
/// shorter line its side is `None`. Rows are matched purely by index, so the
/// two stations in a row need not be related geographically.
pub fn combine(left: Vec<LineMapEntry>, right: Vec<LineMapEntry>) -> CombinedFrame {
    let row_count = left.len().max(right.len());
    let mut left = left.into_iter();
    let mut right = right.into_iter();

    let rows = (0..row_count)
        .map(|_| CombinedRow {
            left: left.next(),
            right: right.next(),
        })
        .collect();

    CombinedFrame { rows }
}
