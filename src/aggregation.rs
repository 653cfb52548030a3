// 📊 Aggregation helpers - monthly and per-category spending totals
//
// These feed the spending charts. Category percentages are rounded
// independently and may not add up to exactly 100.

use crate::error::AnalyticsResult;
use crate::format::{month_key, month_label, parse_calendar_date};
use crate::models::{Transaction, TransactionStatus, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// MONTHLY TOTALS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// Sortable key, `YYYY-MM`
    pub key: String,

    /// Display label, e.g. `Jan 2025`
    pub month: String,
    pub amount: f64,
    pub count: usize,
}

/// Group transactions by calendar month, ordered by month key ascending.
///
/// Fails with `InvalidDate` if any transaction date does not parse.
pub fn monthly_totals(transactions: &[Transaction]) -> AnalyticsResult<Vec<MonthlyTotal>> {
    let mut months: BTreeMap<String, MonthlyTotal> = BTreeMap::new();

    for tx in transactions {
        let date = parse_calendar_date(&tx.date)?;
        let key = month_key(date);

        let entry = months.entry(key.clone()).or_insert_with(|| MonthlyTotal {
            key,
            month: month_label(date),
            amount: 0.0,
            count: 0,
        });
        entry.amount += tx.amount;
        entry.count += 1;
    }

    Ok(months.into_values().collect())
}

// ============================================================================
// CATEGORY TOTALS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
    pub percentage: i64,
}

/// Sum amounts per category, in order of first appearance.
///
/// `percentage = round(100 * value / grand_total)`, or 0 when the grand
/// total is zero.
pub fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<(&'static str, f64)> = Vec::new();

    for tx in transactions {
        let name = tx.kind.category_label();
        match totals.iter_mut().find(|(n, _)| *n == name) {
            Some((_, value)) => *value += tx.amount,
            None => totals.push((name, tx.amount)),
        }
    }

    let grand_total: f64 = totals.iter().map(|(_, value)| value).sum();

    totals
        .into_iter()
        .map(|(name, value)| CategoryTotal {
            name: name.to_string(),
            value,
            percentage: percentage_of(value, grand_total),
        })
        .collect()
}

fn percentage_of(value: f64, total: f64) -> i64 {
    if total == 0.0 {
        return 0;
    }
    (value / total * 100.0).round() as i64
}

// ============================================================================
// SUMMARIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total_spent: f64,
    pub average_monthly: f64,
    pub transaction_count: usize,
    pub month_count: usize,
}

/// Total, per-month average and count for the analytics header.
pub fn spending_summary(transactions: &[Transaction]) -> AnalyticsResult<SpendingSummary> {
    let months = monthly_totals(transactions)?;
    let total_spent: f64 = transactions.iter().map(|tx| tx.amount).sum();

    let average_monthly = if months.is_empty() {
        0.0
    } else {
        total_spent / months.len() as f64
    };

    Ok(SpendingSummary {
        total_spent,
        average_monthly,
        transaction_count: transactions.len(),
        month_count: months.len(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotals {
    pub completed_amount: f64,
    pub pending_amount: f64,
    pub failed_amount: f64,
    pub completed_count: usize,
    pub pending_count: usize,
    pub failed_count: usize,
}

/// Amounts and counts per transaction status for the history view.
pub fn status_totals(transactions: &[Transaction]) -> StatusTotals {
    let mut totals = StatusTotals::default();

    for tx in transactions {
        match tx.status {
            TransactionStatus::Completed => {
                totals.completed_amount += tx.amount;
                totals.completed_count += 1;
            }
            TransactionStatus::Pending => {
                totals.pending_amount += tx.amount;
                totals.pending_count += 1;
            }
            TransactionStatus::Failed => {
                totals.failed_amount += tx.amount;
                totals.failed_count += 1;
            }
        }
    }

    totals
}

// ============================================================================
// REPORT CURRENCY
// ============================================================================

/// The currency code that appears most often, ties going to the first seen.
///
/// Totals are not converted between currencies; this only picks the code a
/// mixed batch is rendered in. Empty input falls back to USD.
pub fn dominant_currency<'a, I>(codes: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for code in codes {
        match counts.iter_mut().find(|(seen, _)| *seen == code) {
            Some((_, count)) => *count += 1,
            None => counts.push((code, 1)),
        }
    }

    // max_by_key keeps the last maximum, so scan back to front
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(code, _)| code.to_string())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::models::TransactionKind;

    const EPSILON: f64 = 1e-9;

    fn tx(kind: TransactionKind, date: &str, amount: f64, status: TransactionStatus) -> Transaction {
        Transaction {
            transaction_id: format!("{}-{}", date, amount),
            account_id: "acc1".to_string(),
            user_id: "0xabc".to_string(),
            description: "Test".to_string(),
            amount,
            currency: "USD".to_string(),
            kind,
            date: date.to_string(),
            status,
            is_recurring: false,
            due_date: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(TransactionKind::Subscription, "2025-02-03", 15.99, TransactionStatus::Completed),
            tx(TransactionKind::Payment, "2024-12-20", 120.0, TransactionStatus::Completed),
            tx(TransactionKind::Payment, "2025-02-10", 80.0, TransactionStatus::Pending),
            tx(TransactionKind::Transfer, "2025-01-05", 250.0, TransactionStatus::Completed),
            tx(TransactionKind::Subscription, "2025-01-03", 9.99, TransactionStatus::Failed),
        ]
    }

    #[test]
    fn test_monthly_totals_sorted_by_key() {
        let months = monthly_totals(&sample()).unwrap();

        let keys: Vec<&str> = months.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-12", "2025-01", "2025-02"]);

        assert_eq!(months[0].month, "Dec 2024");
        assert_eq!(months[2].count, 2);
        assert!((months[2].amount - 95.99).abs() < EPSILON);
    }

    #[test]
    fn test_monthly_totals_invalid_date() {
        let txs = vec![tx(TransactionKind::Payment, "last week", 1.0, TransactionStatus::Completed)];
        assert_eq!(
            monthly_totals(&txs),
            Err(AnalyticsError::InvalidDate("last week".to_string()))
        );
    }

    #[test]
    fn test_category_totals_partition_the_total() {
        let txs = sample();
        let categories = category_totals(&txs);

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Subscriptions", "Payments", "Transfers"]);

        let category_sum: f64 = categories.iter().map(|c| c.value).sum();
        let tx_sum: f64 = txs.iter().map(|t| t.amount).sum();
        assert!((category_sum - tx_sum).abs() < EPSILON);
    }

    #[test]
    fn test_category_percentages_round_independently() {
        let txs = vec![
            tx(TransactionKind::Payment, "2025-01-01", 1.0, TransactionStatus::Completed),
            tx(TransactionKind::Subscription, "2025-01-01", 1.0, TransactionStatus::Completed),
            tx(TransactionKind::Transfer, "2025-01-01", 1.0, TransactionStatus::Completed),
        ];

        let categories = category_totals(&txs);
        assert!(categories.iter().all(|c| c.percentage == 33));
        assert_eq!(categories.iter().map(|c| c.percentage).sum::<i64>(), 99);
    }

    #[test]
    fn test_category_totals_zero_total() {
        let txs = vec![tx(TransactionKind::Payment, "2025-01-01", 0.0, TransactionStatus::Completed)];
        let categories = category_totals(&txs);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].percentage, 0);
    }

    #[test]
    fn test_empty_input() {
        assert!(monthly_totals(&[]).unwrap().is_empty());
        assert!(category_totals(&[]).is_empty());

        let summary = spending_summary(&[]).unwrap();
        assert_eq!(summary.total_spent, 0.0);
        assert_eq!(summary.average_monthly, 0.0);
        assert_eq!(summary.transaction_count, 0);
    }

    #[test]
    fn test_spending_summary_average() {
        let summary = spending_summary(&sample()).unwrap();
        assert_eq!(summary.month_count, 3);
        assert_eq!(summary.transaction_count, 5);
        assert!((summary.average_monthly - summary.total_spent / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_status_totals() {
        let totals = status_totals(&sample());
        assert_eq!(totals.completed_count, 3);
        assert_eq!(totals.pending_count, 1);
        assert_eq!(totals.failed_count, 1);
        assert!((totals.completed_amount - 385.99).abs() < EPSILON);
        assert!((totals.pending_amount - 80.0).abs() < EPSILON);
    }

    #[test]
    fn test_dominant_currency() {
        assert_eq!(dominant_currency(["EUR", "USD", "EUR"]), "EUR");
        assert_eq!(dominant_currency(["GBP", "JPY"]), "GBP");
        assert_eq!(dominant_currency(Vec::<&str>::new()), "USD");

        let txs = sample();
        assert_eq!(dominant_currency(txs.iter().map(|tx| tx.currency.as_str())), "USD");
    }
}
