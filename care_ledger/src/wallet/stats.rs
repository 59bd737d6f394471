//! Pure aggregation over transaction lists.
//!
//! These folds are kept free of SQL so the counting rules stay unit-testable;
//! [`super::TransactionManager`] fetches the rows and delegates here.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use super::models::{Transaction, TransactionStatus};

/// Aggregate counters over one user's transactions.
///
/// Every status is counted, but the monetary sums only cover completed
/// transactions - pending or cancelled rows never moved money.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatistics {
    pub total_transactions: u64,
    pub completed: u64,
    pub pending: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub total_amount: Decimal,
    pub total_platform_fees: Decimal,
    pub total_net_amount: Decimal,
}

/// One calendar month of platform-wide ledger activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// `YYYY-MM`, UTC.
    pub month: String,
    pub transactions: u64,
    pub total_amount: Decimal,
    pub platform_fees: Decimal,
    pub net_amount: Decimal,
}

/// Fold a user's transactions into [`TransactionStatistics`].
pub fn summarize(transactions: &[Transaction]) -> TransactionStatistics {
    let mut stats = TransactionStatistics::default();

    for transaction in transactions {
        stats.total_transactions += 1;
        match transaction.status {
            TransactionStatus::Completed => {
                stats.completed += 1;
                stats.total_amount += transaction.amount;
                stats.total_platform_fees += transaction.platform_fee;
                stats.total_net_amount += transaction.net_amount;
            }
            TransactionStatus::Pending => stats.pending += 1,
            TransactionStatus::Failed => stats.failed += 1,
            TransactionStatus::Cancelled => stats.cancelled += 1,
        }
    }

    stats
}

/// Ceiling on the monthly-history window; requests beyond it are clamped.
pub const MAX_HISTORY_MONTHS: u32 = 120;

/// Bucket completed transactions by creation month: the `months` most recent
/// calendar months up to `now` (inclusive), oldest first. Months without
/// activity appear with zero counts; transactions older than the window are
/// dropped, and pending, failed or cancelled rows never count.
pub fn monthly_history(
    transactions: &[Transaction],
    months: u32,
    now: DateTime<Utc>,
) -> Vec<MonthlyBucket> {
    let months = months.min(MAX_HISTORY_MONTHS);
    let mut buckets: Vec<MonthlyBucket> = Vec::with_capacity(months as usize);
    let mut index: HashMap<String, usize> = HashMap::with_capacity(months as usize);

    // Months counted as year * 12 + month0 so the window arithmetic never
    // has to special-case year boundaries.
    let anchor = i64::from(now.year()) * 12 + i64::from(now.month0());
    for offset in (0..i64::from(months)).rev() {
        let serial = anchor - offset;
        let year = serial.div_euclid(12);
        let month = serial.rem_euclid(12) + 1;
        let key = format!("{year:04}-{month:02}");

        index.insert(key.clone(), buckets.len());
        buckets.push(MonthlyBucket {
            month: key,
            transactions: 0,
            total_amount: Decimal::ZERO,
            platform_fees: Decimal::ZERO,
            net_amount: Decimal::ZERO,
        });
    }

    for transaction in transactions {
        if transaction.status != TransactionStatus::Completed {
            continue;
        }
        let created = transaction.created_at;
        let key = format!("{:04}-{:02}", created.year(), created.month());
        if let Some(&slot) = index.get(&key) {
            let bucket = &mut buckets[slot];
            bucket.transactions += 1;
            bucket.total_amount += transaction.amount;
            bucket.platform_fees += transaction.platform_fee;
            bucket.net_amount += transaction.net_amount;
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::models::{GatewayRefs, ServiceDetails, TransactionKind};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn transaction(
        status: TransactionStatus,
        amount: Decimal,
        fee: Decimal,
        created_at: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            kind: TransactionKind::Payment,
            status,
            amount,
            platform_fee: fee,
            net_amount: amount - fee,
            currency: "EUR".to_string(),
            from_user_id: Some(1),
            to_user_id: Some(2),
            service_details: ServiceDetails::default(),
            gateway_refs: GatewayRefs::default(),
            description: None,
            notes: None,
            created_at,
            updated_at: created_at,
            completed_at: None,
            cancelled_at: None,
        }
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn summarize_counts_every_status_but_sums_only_completed() {
        let transactions = vec![
            transaction(TransactionStatus::Completed, dec!(45.00), dec!(4.50), at(2025, 1, 10)),
            transaction(TransactionStatus::Completed, dec!(20.00), dec!(2.00), at(2025, 1, 11)),
            transaction(TransactionStatus::Pending, dec!(99.00), dec!(9.90), at(2025, 1, 12)),
            transaction(TransactionStatus::Cancelled, dec!(10.00), dec!(1.00), at(2025, 1, 13)),
            transaction(TransactionStatus::Failed, dec!(5.00), dec!(0.50), at(2025, 1, 14)),
        ];

        let stats = summarize(&transactions);
        assert_eq!(stats.total_transactions, 5);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.total_amount, dec!(65.00));
        assert_eq!(stats.total_platform_fees, dec!(6.50));
        assert_eq!(stats.total_net_amount, dec!(58.50));
    }

    #[test]
    fn summarize_of_nothing_is_all_zeroes() {
        let stats = summarize(&[]);
        assert_eq!(stats, TransactionStatistics::default());
    }

    #[test]
    fn monthly_history_returns_oldest_first_with_zero_fill() {
        let now = at(2025, 3, 20);
        let transactions = vec![
            transaction(TransactionStatus::Completed, dec!(45.00), dec!(4.50), at(2025, 1, 5)),
            transaction(TransactionStatus::Pending, dec!(20.00), dec!(2.00), at(2025, 3, 1)),
            transaction(TransactionStatus::Completed, dec!(30.00), dec!(3.00), at(2025, 3, 15)),
        ];

        let history = monthly_history(&transactions, 3, now);
        assert_eq!(history.len(), 3);

        assert_eq!(history[0].month, "2025-01");
        assert_eq!(history[0].transactions, 1);
        assert_eq!(history[0].total_amount, dec!(45.00));

        assert_eq!(history[1].month, "2025-02");
        assert_eq!(history[1].transactions, 0);
        assert_eq!(history[1].total_amount, dec!(0));

        // The pending March transaction contributes nothing.
        assert_eq!(history[2].month, "2025-03");
        assert_eq!(history[2].transactions, 1);
        assert_eq!(history[2].total_amount, dec!(30.00));
        assert_eq!(history[2].platform_fees, dec!(3.00));
        assert_eq!(history[2].net_amount, dec!(27.00));
    }

    #[test]
    fn monthly_history_ignores_unsettled_volume() {
        let now = at(2025, 6, 30);
        let transactions = vec![
            transaction(TransactionStatus::Pending, dec!(10.00), dec!(1.00), at(2025, 6, 1)),
            transaction(TransactionStatus::Cancelled, dec!(10.00), dec!(1.00), at(2025, 6, 2)),
            transaction(TransactionStatus::Failed, dec!(10.00), dec!(1.00), at(2025, 6, 3)),
            transaction(TransactionStatus::Completed, dec!(45.00), dec!(4.50), at(2025, 6, 4)),
        ];

        let history = monthly_history(&transactions, 1, now);
        assert_eq!(history[0].transactions, 1);
        assert_eq!(history[0].total_amount, dec!(45.00));
        assert_eq!(history[0].platform_fees, dec!(4.50));
    }

    #[test]
    fn monthly_history_clamps_oversized_windows() {
        let history = monthly_history(&[], u32::MAX, at(2025, 1, 1));
        assert_eq!(history.len(), MAX_HISTORY_MONTHS as usize);
    }

    #[test]
    fn monthly_history_window_crosses_year_boundaries() {
        let now = at(2025, 2, 10);
        let transactions = vec![
            transaction(TransactionStatus::Completed, dec!(12.00), dec!(1.20), at(2024, 11, 30)),
            transaction(TransactionStatus::Completed, dec!(8.00), dec!(0.80), at(2024, 10, 1)),
        ];

        let history = monthly_history(&transactions, 4, now);
        let months: Vec<&str> = history.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);

        assert_eq!(history[0].transactions, 1);
        // The October transaction falls outside the four-month window.
        assert_eq!(history.iter().map(|b| b.transactions).sum::<u64>(), 1);
    }

    #[test]
    fn monthly_history_of_zero_months_is_empty() {
        assert!(monthly_history(&[], 0, at(2025, 1, 1)).is_empty());
    }
}
