//! Pure statistics over ledger history.
//!
//! No state, no side effects; callers pass a snapshot and get numbers back.

use anchor_types::{LedgerStats, TxRecord, TxStatus};

/// Aggregate `records` into session statistics.
///
/// Empty input yields all zeros rather than dividing by zero. The average
/// confirmation time considers only entries with a measured duration, so
/// pre-broadcast errors (duration zero) never drag it down. Gas cost sums
/// over confirmed entries only.
#[must_use]
pub fn compute_stats(records: &[TxRecord]) -> LedgerStats {
    let total = records.len();
    let mut stats = LedgerStats {
        total,
        ..LedgerStats::default()
    };
    if total == 0 {
        return stats;
    }

    let mut duration_sum = 0.0;
    let mut duration_count = 0usize;

    for record in records {
        match record.status {
            TxStatus::Pending => stats.pending += 1,
            TxStatus::Confirmed => {
                stats.confirmed += 1;
                stats.total_gas_cost_wei += record.gas_cost_wei;
            }
            TxStatus::Failed => stats.failed += 1,
            TxStatus::Error => stats.errored += 1,
        }
        if record.duration_secs > 0.0 {
            duration_sum += record.duration_secs;
            duration_count += 1;
        }
    }

    stats.success_rate = stats.confirmed as f64 / total as f64 * 100.0;
    if duration_count > 0 {
        stats.avg_confirmation_secs = duration_sum / duration_count as f64;
    }
    stats
}
