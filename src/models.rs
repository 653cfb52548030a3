// 💳 Payment Models - transactions, subscriptions, notifications
//
// These are plain value records. The analytics functions borrow them and
// return freshly built derived records; nothing here is mutated in place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Payment,
    Subscription,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Payment => "payment",
            TransactionKind::Subscription => "subscription",
            TransactionKind::Transfer => "transfer",
        }
    }

    /// Chart category used by the spending breakdown
    pub fn category_label(&self) -> &'static str {
        match self {
            TransactionKind::Subscription => "Subscriptions",
            TransactionKind::Payment => "Payments",
            TransactionKind::Transfer => "Transfers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Weekly => "weekly",
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    Overdue,
    Anomaly,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Reminder => "reminder",
            NotificationKind::Overdue => "overdue",
            NotificationKind::Anomaly => "anomaly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Wallet,
    Bank,
    CreditCard,
}

/// Error returned when a stored or submitted enum label is unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! impl_from_str {
    ($ty:ty, $kind:literal, [$($label:literal => $variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

impl_from_str!(TransactionKind, "transaction type", [
    "payment" => TransactionKind::Payment,
    "subscription" => TransactionKind::Subscription,
    "transfer" => TransactionKind::Transfer,
]);

impl_from_str!(TransactionStatus, "transaction status", [
    "pending" => TransactionStatus::Pending,
    "completed" => TransactionStatus::Completed,
    "failed" => TransactionStatus::Failed,
]);

impl_from_str!(BillingCycle, "billing cycle", [
    "weekly" => BillingCycle::Weekly,
    "monthly" => BillingCycle::Monthly,
    "yearly" => BillingCycle::Yearly,
]);

impl_from_str!(SubscriptionStatus, "subscription status", [
    "active" => SubscriptionStatus::Active,
    "paused" => SubscriptionStatus::Paused,
    "cancelled" => SubscriptionStatus::Cancelled,
]);

impl_from_str!(NotificationKind, "notification type", [
    "reminder" => NotificationKind::Reminder,
    "overdue" => NotificationKind::Overdue,
    "anomaly" => NotificationKind::Anomaly,
]);

// ============================================================================
// TRANSACTION
// ============================================================================

pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// A single payment, subscription charge or transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: String,

    /// Owner wallet address
    pub user_id: String,
    pub description: String,
    pub amount: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Occurrence date (`YYYY-MM-DD` or RFC 3339)
    pub date: String,
    pub status: TransactionStatus,

    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,
    pub user_id: String,
    pub service_name: String,
    pub billing_cycle: BillingCycle,
    pub next_billing_date: String,
    pub amount: f64,

    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: SubscriptionStatus,
    pub category: String,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

// ============================================================================
// USERS, ACCOUNTS, NOTIFICATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,

    /// How many days ahead of a due date reminders are sent
    pub reminder_days: u32,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        NotificationPreferences {
            email: false,
            push: true,
            reminder_days: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub wallet_address: String,
    pub notification_preferences: NotificationPreferences,
    pub premium_status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAccount {
    pub account_id: String,
    pub user_id: String,
    pub account_type: AccountType,
    pub account_identifier: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotification {
    pub id: String,
    pub user_id: String,

    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

// ============================================================================
// PAYMENT SUMMARY
// ============================================================================

/// How many completed transactions the dashboard shows as "recent"
pub const RECENT_TRANSACTION_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_due: f64,
    pub upcoming_payments: Vec<Transaction>,
    pub recent_transactions: Vec<Transaction>,
    pub subscriptions: Vec<Subscription>,
}

impl PaymentSummary {
    /// Build the dashboard summary for one wallet.
    ///
    /// Upcoming payments are pending transactions with a due date, earliest
    /// first. Recent transactions are completed ones, newest first.
    /// Dates are ISO strings, so lexical order is chronological order.
    pub fn build(transactions: &[Transaction], subscriptions: &[Subscription]) -> Self {
        let mut upcoming_payments: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| tx.is_pending() && tx.due_date.is_some())
            .cloned()
            .collect();
        upcoming_payments.sort_by(|a, b| a.due_date.cmp(&b.due_date));

        let mut recent_transactions: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| tx.is_completed())
            .cloned()
            .collect();
        recent_transactions.sort_by(|a, b| b.date.cmp(&a.date));
        recent_transactions.truncate(RECENT_TRANSACTION_LIMIT);

        let total_due = upcoming_payments.iter().map(|tx| tx.amount).sum();

        PaymentSummary {
            total_due,
            upcoming_payments,
            recent_transactions,
            subscriptions: subscriptions.to_vec(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, status: TransactionStatus, date: &str, due: Option<&str>, amount: f64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            account_id: "acc1".to_string(),
            user_id: "0xabc".to_string(),
            description: format!("Payment {}", id),
            amount,
            currency: "USD".to_string(),
            kind: TransactionKind::Payment,
            date: date.to_string(),
            status,
            is_recurring: false,
            due_date: due.map(|d| d.to_string()),
        }
    }

    #[test]
    fn test_transaction_json_uses_camel_case_and_type() {
        let t = tx("t1", TransactionStatus::Pending, "2025-01-10", Some("2025-01-15"), 42.0);
        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["transactionId"], "t1");
        assert_eq!(json["type"], "payment");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["dueDate"], "2025-01-15");
        assert_eq!(json["isRecurring"], false);
    }

    #[test]
    fn test_transaction_currency_defaults_to_usd() {
        let json = serde_json::json!({
            "transactionId": "t9",
            "accountId": "acc1",
            "userId": "0xabc",
            "description": "Coffee",
            "amount": 4.5,
            "type": "payment",
            "date": "2025-02-01",
            "status": "completed"
        });

        let t: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(t.currency, "USD");
        assert!(!t.is_recurring);
        assert!(t.due_date.is_none());
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("yearly".parse::<BillingCycle>().unwrap(), BillingCycle::Yearly);
        assert_eq!("failed".parse::<TransactionStatus>().unwrap(), TransactionStatus::Failed);

        let err = "biweekly".parse::<BillingCycle>().unwrap_err();
        assert_eq!(err.to_string(), "unknown billing cycle: \"biweekly\"");
    }

    #[test]
    fn test_category_label() {
        assert_eq!(TransactionKind::Subscription.category_label(), "Subscriptions");
        assert_eq!(TransactionKind::Payment.category_label(), "Payments");
        assert_eq!(TransactionKind::Transfer.category_label(), "Transfers");
    }

    #[test]
    fn test_payment_summary_build() {
        let transactions = vec![
            tx("a", TransactionStatus::Pending, "2025-01-01", Some("2025-01-20"), 30.0),
            tx("b", TransactionStatus::Pending, "2025-01-02", Some("2025-01-10"), 20.0),
            tx("c", TransactionStatus::Pending, "2025-01-03", None, 99.0),
            tx("d", TransactionStatus::Completed, "2025-01-04", None, 5.0),
            tx("e", TransactionStatus::Completed, "2025-01-06", None, 6.0),
            tx("f", TransactionStatus::Failed, "2025-01-07", None, 7.0),
        ];

        let summary = PaymentSummary::build(&transactions, &[]);

        let upcoming: Vec<&str> = summary
            .upcoming_payments
            .iter()
            .map(|t| t.transaction_id.as_str())
            .collect();
        assert_eq!(upcoming, vec!["b", "a"]);
        assert_eq!(summary.total_due, 50.0);

        let recent: Vec<&str> = summary
            .recent_transactions
            .iter()
            .map(|t| t.transaction_id.as_str())
            .collect();
        assert_eq!(recent, vec!["e", "d"]);
    }

    #[test]
    fn test_recent_transactions_are_capped() {
        let transactions: Vec<Transaction> = (1..=8)
            .map(|i| {
                tx(
                    &format!("t{}", i),
                    TransactionStatus::Completed,
                    &format!("2025-01-0{}", i),
                    None,
                    1.0,
                )
            })
            .collect();

        let summary = PaymentSummary::build(&transactions, &[]);
        assert_eq!(summary.recent_transactions.len(), RECENT_TRANSACTION_LIMIT);
        assert_eq!(summary.recent_transactions[0].transaction_id, "t8");
    }
}
