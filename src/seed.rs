// 🌱 Demo data - a single wallet's payments, subscriptions and notifications
//
// Dates are relative to the day the data is generated so due-status
// classification produces a realistic mix of due / upcoming / overdue.

use crate::models::{
    BillingCycle, NotificationKind, PaymentNotification, Subscription, SubscriptionStatus,
    Transaction, TransactionKind, TransactionStatus,
};
use crate::store::MemoryStore;
use chrono::{Duration, NaiveDate, Utc};

/// Wallet address owning every demo record
pub const DEMO_WALLET: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

fn day(today: NaiveDate, offset: i64) -> String {
    (today + Duration::days(offset)).format("%Y-%m-%d").to_string()
}

#[allow(clippy::too_many_arguments)]
fn transaction(
    id: &str,
    description: &str,
    amount: f64,
    kind: TransactionKind,
    date: String,
    status: TransactionStatus,
    is_recurring: bool,
    due_date: Option<String>,
) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        account_id: "acc1".to_string(),
        user_id: DEMO_WALLET.to_string(),
        description: description.to_string(),
        amount,
        currency: "USD".to_string(),
        kind,
        date,
        status,
        is_recurring,
        due_date,
    }
}

pub fn demo_transactions_for(today: NaiveDate) -> Vec<Transaction> {
    use crate::models::TransactionKind as K;
    use crate::models::TransactionStatus as S;

    vec![
        transaction("tx1", "Electricity bill", 84.5, K::Payment, day(today, -10), S::Pending, true, Some(day(today, 2))),
        transaction("tx2", "Netflix", 15.99, K::Subscription, day(today, -5), S::Completed, true, None),
        transaction("tx3", "Credit card payment", 320.0, K::Payment, day(today, -20), S::Pending, true, Some(day(today, 9))),
        transaction("tx4", "Internet service", 59.99, K::Payment, day(today, -35), S::Pending, true, Some(day(today, -1))),
        transaction("tx5", "Spotify", 9.99, K::Subscription, day(today, -33), S::Completed, true, None),
        transaction("tx6", "Rent transfer", 1450.0, K::Transfer, day(today, -40), S::Completed, true, None),
        transaction("tx7", "Grocery delivery", 72.35, K::Payment, day(today, -12), S::Completed, false, None),
        transaction("tx8", "Gym membership", 39.0, K::Subscription, day(today, -62), S::Failed, true, None),
        transaction("tx9", "Phone bill", 45.0, K::Payment, day(today, -64), S::Completed, true, None),
        transaction("tx10", "Cloud storage", 2.99, K::Subscription, day(today, -3), S::Completed, true, None),
    ]
}

pub fn demo_transactions() -> Vec<Transaction> {
    demo_transactions_for(Utc::now().date_naive())
}

fn subscription(
    id: &str,
    service_name: &str,
    billing_cycle: BillingCycle,
    next_billing_date: String,
    amount: f64,
    status: SubscriptionStatus,
    category: &str,
) -> Subscription {
    Subscription {
        subscription_id: id.to_string(),
        user_id: DEMO_WALLET.to_string(),
        service_name: service_name.to_string(),
        billing_cycle,
        next_billing_date,
        amount,
        currency: "USD".to_string(),
        status,
        category: category.to_string(),
    }
}

pub fn demo_subscriptions_for(today: NaiveDate) -> Vec<Subscription> {
    use crate::models::BillingCycle::*;
    use crate::models::SubscriptionStatus::*;

    vec![
        subscription("sub1", "Netflix", Monthly, day(today, 25), 15.99, Active, "Entertainment"),
        subscription("sub2", "Spotify", Monthly, day(today, 4), 9.99, Active, "Music"),
        subscription("sub3", "Adobe Creative Cloud", Yearly, day(today, 120), 599.88, Active, "Productivity"),
        subscription("sub4", "Meal kit", Weekly, day(today, 3), 59.94, Paused, "Food"),
        subscription("sub5", "Gym membership", Monthly, day(today, 12), 39.0, Cancelled, "Health"),
    ]
}

pub fn demo_subscriptions() -> Vec<Subscription> {
    demo_subscriptions_for(Utc::now().date_naive())
}

pub fn demo_notifications_for(today: NaiveDate) -> Vec<PaymentNotification> {
    let created_at = day(today, 0);

    vec![
        PaymentNotification {
            id: "n1".to_string(),
            user_id: DEMO_WALLET.to_string(),
            kind: NotificationKind::Reminder,
            title: "Electricity bill due soon".to_string(),
            message: "Your electricity bill of $84.50 is due in 2 days".to_string(),
            amount: Some(84.5),
            due_date: Some(day(today, 2)),
            is_read: false,
            created_at: created_at.clone(),
        },
        PaymentNotification {
            id: "n2".to_string(),
            user_id: DEMO_WALLET.to_string(),
            kind: NotificationKind::Overdue,
            title: "Internet service overdue".to_string(),
            message: "Your internet service payment of $59.99 is overdue".to_string(),
            amount: Some(59.99),
            due_date: Some(day(today, -1)),
            is_read: false,
            created_at: created_at.clone(),
        },
        PaymentNotification {
            id: "n3".to_string(),
            user_id: DEMO_WALLET.to_string(),
            kind: NotificationKind::Anomaly,
            title: "Unusual spending detected".to_string(),
            message: "Rent transfer of $1,450.00 is well above your average".to_string(),
            amount: Some(1450.0),
            due_date: None,
            is_read: true,
            created_at,
        },
    ]
}

pub fn demo_notifications() -> Vec<PaymentNotification> {
    demo_notifications_for(Utc::now().date_naive())
}

/// Memory store seeded with today's demo records
pub fn demo_memory_store() -> MemoryStore {
    MemoryStore::with_records(demo_transactions(), demo_subscriptions(), demo_notifications())
}
