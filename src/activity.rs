//! Activity aggregation
//!
//! Pure computation turning a set of transaction records into the derived
//! snapshot fields: first/last transaction timestamps, transaction and
//! contract-interaction counts, and distinct-active-day counts over
//! rolling windows.

use crate::records::{ActiveDays, TransactionRecord};
use std::collections::HashSet;

/// Seconds in one UTC calendar day.
const SECONDS_PER_DAY: u64 = 86_400;

/// Derived activity fields for one address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityStats {
    pub active_days: ActiveDays,
    pub first_tx_time: Option<u64>,
    pub last_tx_time: Option<u64>,
    pub tx_count: u64,
    pub contract_count: u64,
}

/// Aggregate transaction records into activity stats.
///
/// Input order is not trusted: first/last timestamps come from an explicit
/// min/max over the set. An empty set produces zero counts and absent
/// timestamps, never an error.
pub fn aggregate(records: &[TransactionRecord], now: u64) -> ActivityStats {
    if records.is_empty() {
        return ActivityStats::default();
    }

    let first_tx_time = records.iter().map(|r| r.timestamp).min();
    let last_tx_time = records.iter().map(|r| r.timestamp).max();
    let tx_count = records.len() as u64;
    let contract_count = records
        .iter()
        .filter(|r| r.is_contract_interaction())
        .count() as u64;

    let active_days = ActiveDays {
        day: distinct_days_within(records, now, 1),
        week: distinct_days_within(records, now, 7),
        month: distinct_days_within(records, now, 30),
    };

    ActivityStats {
        active_days,
        first_tx_time,
        last_tx_time,
        tx_count,
        contract_count,
    }
}

/// Count distinct UTC calendar days among records no older than `days`
/// before `now`.
///
/// The window lower bound is inclusive: a record exactly `days` old still
/// counts. Days are bucketed as `timestamp / 86400`, so two records one
/// second apart across midnight land in different buckets.
fn distinct_days_within(records: &[TransactionRecord], now: u64, days: u64) -> u32 {
    let cutoff = now.saturating_sub(days * SECONDS_PER_DAY);
    let buckets: HashSet<u64> = records
        .iter()
        .filter(|r| r.timestamp >= cutoff)
        .map(|r| r.timestamp / SECONDS_PER_DAY)
        .collect();
    buckets.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, B256, U256};

    const DAY: u64 = 86_400;
    /// Midnight UTC, 2023-12-09 (day number 19700).
    const MIDNIGHT: u64 = 19_700 * DAY;

    fn record_at(timestamp: u64) -> TransactionRecord {
        TransactionRecord {
            hash: B256::ZERO,
            block_number: 1,
            timestamp,
            from: address!("0742d35Cc6634C0532925a3b844Bc9e7595f0bEb"),
            to: Some(address!("1234567890123456789012345678901234567890")),
            value: U256::from(1000u64),
            payload: Vec::new(),
        }
    }

    fn contract_record_at(timestamp: u64) -> TransactionRecord {
        TransactionRecord {
            payload: vec![0xa9, 0x05, 0x9c, 0xbb],
            ..record_at(timestamp)
        }
    }

    #[test]
    fn test_empty_records() {
        let stats = aggregate(&[], MIDNIGHT);
        assert_eq!(stats, ActivityStats::default());
        assert_eq!(stats.tx_count, 0);
        assert!(stats.first_tx_time.is_none());
        assert!(stats.last_tx_time.is_none());
    }

    #[test]
    fn test_counts_and_extremes_from_unsorted_input() {
        let now = MIDNIGHT + 10 * DAY;
        let records = vec![
            record_at(MIDNIGHT + 5 * DAY),
            record_at(MIDNIGHT + 9 * DAY),
            record_at(MIDNIGHT + 2 * DAY),
        ];

        let stats = aggregate(&records, now);
        assert_eq!(stats.tx_count, 3);
        assert_eq!(stats.first_tx_time, Some(MIDNIGHT + 2 * DAY));
        assert_eq!(stats.last_tx_time, Some(MIDNIGHT + 9 * DAY));
    }

    #[test]
    fn test_contract_count_depends_on_payload() {
        let now = MIDNIGHT + DAY;
        let records = vec![
            record_at(MIDNIGHT),
            contract_record_at(MIDNIGHT + 100),
            contract_record_at(MIDNIGHT + 200),
        ];

        let stats = aggregate(&records, now);
        assert_eq!(stats.tx_count, 3);
        assert_eq!(stats.contract_count, 2);
    }

    #[test]
    fn test_same_day_transactions_count_once() {
        let now = MIDNIGHT + 12 * 3600;
        let records = vec![
            record_at(MIDNIGHT + 3600),
            record_at(MIDNIGHT + 7200),
            record_at(MIDNIGHT + 10_800),
        ];

        let stats = aggregate(&records, now);
        assert_eq!(stats.active_days.day, 1);
        assert_eq!(stats.active_days.week, 1);
        assert_eq!(stats.active_days.month, 1);
    }

    #[test]
    fn test_windows_are_nested() {
        let now = MIDNIGHT + 29 * DAY;
        let records = vec![
            // Today
            record_at(now - 3600),
            // Three days ago
            record_at(now - 3 * DAY),
            // Twenty days ago
            record_at(now - 20 * DAY),
        ];

        let stats = aggregate(&records, now);
        assert_eq!(stats.active_days.day, 1);
        assert_eq!(stats.active_days.week, 2);
        assert_eq!(stats.active_days.month, 3);
        assert!(stats.active_days.day <= stats.active_days.week);
        assert!(stats.active_days.week <= stats.active_days.month);
    }

    #[test]
    fn test_window_lower_bound_is_inclusive() {
        let now = MIDNIGHT + 12 * 3600;
        // Exactly one day old: still inside the day window
        let records = vec![record_at(now - DAY)];

        let stats = aggregate(&records, now);
        assert_eq!(stats.active_days.day, 1);
    }

    #[test]
    fn test_one_second_outside_window_is_excluded() {
        let now = MIDNIGHT + 12 * 3600;
        let records = vec![record_at(now - DAY - 1)];

        let stats = aggregate(&records, now);
        assert_eq!(stats.active_days.day, 0);
        // Still visible in the wider windows
        assert_eq!(stats.active_days.week, 1);
        assert_eq!(stats.active_days.month, 1);
    }

    #[test]
    fn test_day_window_crossing_from_midnight() {
        // Transactions at t0, t0+1h, t0+25h with t0 on a midnight boundary.
        // The day window holds the 1h and 25h records, which sit on
        // different calendar days.
        let t0 = MIDNIGHT;
        let now = t0 + 90_000;
        let records = vec![record_at(t0), record_at(t0 + 3600), record_at(t0 + 90_000)];

        let stats = aggregate(&records, now);
        assert_eq!(stats.active_days.day, 2);
        assert_eq!(stats.active_days.week, 2);
        assert_eq!(stats.tx_count, 3);
    }

    #[test]
    fn test_day_window_crossing_from_midday() {
        // Same shape anchored at noon: the two in-window records are a full
        // calendar day apart, so the count is again 2.
        let t0 = MIDNIGHT + 12 * 3600;
        let now = t0 + 90_000;
        let records = vec![record_at(t0), record_at(t0 + 3600), record_at(t0 + 90_000)];

        let stats = aggregate(&records, now);
        assert_eq!(stats.active_days.day, 2);
        assert_eq!(stats.active_days.week, 2);
    }

    #[test]
    fn test_day_window_single_calendar_day() {
        // All activity within one calendar day and one day window
        let t0 = MIDNIGHT + 100;
        let now = t0 + 3600;
        let records = vec![record_at(t0), record_at(t0 + 1800), record_at(t0 + 3600)];

        let stats = aggregate(&records, now);
        assert_eq!(stats.active_days.day, 1);
        assert_eq!(stats.active_days.week, 1);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let now = MIDNIGHT + 10 * DAY;
        let records = vec![
            record_at(MIDNIGHT + DAY),
            contract_record_at(MIDNIGHT + 4 * DAY),
            record_at(MIDNIGHT + 9 * DAY + 3600),
        ];

        assert_eq!(aggregate(&records, now), aggregate(&records, now));
    }
}
