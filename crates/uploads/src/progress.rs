//! Progress projections derived from the record store.
//!
//! Nothing here is stored; every value is recomputed from the records.

use crate::types::{UploadRecord, UploadSummary};

/// Rounded percentage of `done` over `total`, clamped to 100.
///
/// An empty total counts as fully transmitted: `percentage(0, 0) == 100`.
pub fn percentage(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = u128::from(done);
    let total = u128::from(total);
    let rounded = (done * 100 + total / 2) / total;
    rounded.min(100) as u8
}

/// Aggregates the pending records into one summary.
///
/// Terminal records are excluded from both byte sums. With nothing
/// pending the percentage is 100.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a UploadRecord>) -> UploadSummary {
    let mut pending = 0usize;
    let mut original = 0u64;
    let mut transmitted = 0u64;

    for record in records.into_iter().filter(|r| r.is_pending()) {
        pending += 1;
        original = original.saturating_add(record.original_size_bytes);
        transmitted = transmitted.saturating_add(record.transmitted_size_bytes);
    }

    UploadSummary {
        has_pending_uploads: pending > 0,
        pending,
        percentage: if pending == 0 {
            100
        } else {
            percentage(transmitted, original)
        },
    }
}
