// 🚨 Anomaly Detector - flag transactions far above the batch mean
//
// One global threshold over the whole input: amount > 2 x mean(amount).
// The baseline is the batch that was passed in, not a historical window.

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::Transaction;
use serde::{Deserialize, Serialize};

/// Amounts strictly above `HIGH_AMOUNT_FACTOR * mean` are anomalous
pub const HIGH_AMOUNT_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyType {
    HighAmount,
}

/// A transaction annotated with why it was flagged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub anomaly_type: AnomalyType,
    #[serde(alias = "anomalyReason")]
    pub reason: String,
}

/// Mean transaction amount, or `EmptyInput` for an empty batch.
pub fn mean_amount(transactions: &[Transaction]) -> AnalyticsResult<f64> {
    if transactions.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let total: f64 = transactions.iter().map(|tx| tx.amount).sum();
    Ok(total / transactions.len() as f64)
}

/// Return the transactions whose amount exceeds twice the batch mean.
///
/// Equality with the threshold is not anomalous. Input order is kept.
pub fn detect_anomalies(transactions: &[Transaction]) -> AnalyticsResult<Vec<Anomaly>> {
    let mean = mean_amount(transactions)?;
    let threshold = mean * HIGH_AMOUNT_FACTOR;

    let anomalies: Vec<Anomaly> = transactions
        .iter()
        .filter(|tx| tx.amount > threshold)
        .map(|tx| {
            // mean > 0 here: some amount exceeded 2 x mean and amounts are non-negative
            let multiplier = (tx.amount / mean).round();
            Anomaly {
                transaction: tx.clone(),
                anomaly_type: AnomalyType::HighAmount,
                reason: format!("Amount is {}x higher than average", multiplier),
            }
        })
        .collect();

    tracing::debug!(
        total = transactions.len(),
        flagged = anomalies.len(),
        mean,
        "anomaly detection finished"
    );

    Ok(anomalies)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionKind, TransactionStatus};

    fn tx(id: &str, amount: f64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            account_id: "acc1".to_string(),
            user_id: "0xabc".to_string(),
            description: format!("Purchase {}", id),
            amount,
            currency: "USD".to_string(),
            kind: TransactionKind::Payment,
            date: "2025-01-10".to_string(),
            status: TransactionStatus::Completed,
            is_recurring: false,
            due_date: None,
        }
    }

    #[test]
    fn test_flags_only_the_outlier() {
        let txs = vec![tx("a", 100.0), tx("b", 100.0), tx("c", 500.0)];

        let anomalies = detect_anomalies(&txs).unwrap();

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].transaction.transaction_id, "c");
        assert_eq!(anomalies[0].anomaly_type, AnomalyType::HighAmount);
        assert_eq!(anomalies[0].reason, "Amount is 2x higher than average");
    }

    #[test]
    fn test_uniform_amounts_have_no_anomalies() {
        let txs: Vec<Transaction> = (0..6).map(|i| tx(&i.to_string(), 49.99)).collect();
        assert!(detect_anomalies(&txs).unwrap().is_empty());
    }

    #[test]
    fn test_single_transaction_is_never_anomalous() {
        assert!(detect_anomalies(&[tx("only", 10_000.0)]).unwrap().is_empty());
        assert!(detect_anomalies(&[tx("zero", 0.0)]).unwrap().is_empty());
    }

    #[test]
    fn test_threshold_equality_is_not_anomalous() {
        // mean = 40, threshold = 80
        let txs = vec![tx("a", 0.0), tx("b", 0.0), tx("c", 80.0), tx("d", 80.0)];
        assert!(detect_anomalies(&txs).unwrap().is_empty());
    }

    #[test]
    fn test_multiplier_is_rounded() {
        // mean = 100, 1050 / 100 = 10.5 rounds up to 11
        let mut txs: Vec<Transaction> = (0..19).map(|i| tx(&i.to_string(), 50.0)).collect();
        txs.push(tx("big", 1050.0));

        let anomalies = detect_anomalies(&txs).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].reason, "Amount is 11x higher than average");
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert_eq!(detect_anomalies(&[]), Err(AnalyticsError::EmptyInput));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let txs = vec![tx("a", 1.0), tx("b", 1.0), tx("c", 9.0)];
        let before = txs.clone();
        let _ = detect_anomalies(&txs).unwrap();
        assert_eq!(txs, before);
    }

    #[test]
    fn test_anomaly_serializes_flat() {
        let txs = vec![tx("a", 1.0), tx("b", 1.0), tx("c", 9.0)];
        let anomalies = detect_anomalies(&txs).unwrap();
        let json = serde_json::to_value(&anomalies[0]).unwrap();

        assert_eq!(json["transactionId"], "c");
        assert_eq!(json["anomalyType"], "high-amount");
        assert_eq!(json["reason"], "Amount is 2x higher than average");
    }

    #[test]
    fn test_anomaly_accepts_legacy_reason_key() {
        let json = serde_json::json!({
            "transactionId": "c",
            "accountId": "acc1",
            "userId": "0xabc",
            "description": "Laptop",
            "amount": 500.0,
            "type": "payment",
            "date": "2025-03-01",
            "status": "completed",
            "anomalyType": "high-amount",
            "anomalyReason": "Amount is 2x higher than average"
        });

        let anomaly: Anomaly = serde_json::from_value(json).unwrap();
        assert_eq!(anomaly.reason, "Amount is 2x higher than average");
        assert_eq!(anomaly.transaction.transaction_id, "c");
    }
}
