// ⏰ Due-Status Classifier - upcoming / due / overdue
//
// Day difference is ceil((due - now) / 1 day), so a date-only due date of
// today counts as day 0 and anything in a previous day is negative.

use crate::error::AnalyticsResult;
use crate::format::parse_date;
use crate::models::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payments due within this many days are reported as `Due`
pub const DUE_SOON_DAYS: i64 = 3;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Upcoming,
    Due,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Upcoming => "upcoming",
            PaymentStatus::Due => "due",
            PaymentStatus::Overdue => "overdue",
        }
    }

    /// Classify a whole-day difference
    pub fn from_days(days: i64) -> Self {
        if days < 0 {
            PaymentStatus::Overdue
        } else if days <= DUE_SOON_DAYS {
            PaymentStatus::Due
        } else {
            PaymentStatus::Upcoming
        }
    }
}

/// Whole days from `now` until `due_date`, rounded up.
pub fn days_until_due_at(due_date: &str, now: DateTime<Utc>) -> AnalyticsResult<i64> {
    let due = parse_date(due_date)?;
    let diff = due.signed_duration_since(now);
    let days = (diff.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY).ceil();
    Ok(days as i64)
}

/// Whole days from the current wall clock until `due_date`.
pub fn days_until_due(due_date: &str) -> AnalyticsResult<i64> {
    days_until_due_at(due_date, Utc::now())
}

pub fn payment_status_at(due_date: &str, now: DateTime<Utc>) -> AnalyticsResult<PaymentStatus> {
    days_until_due_at(due_date, now).map(PaymentStatus::from_days)
}

/// Classify `due_date` against the current wall clock.
pub fn payment_status(due_date: &str) -> AnalyticsResult<PaymentStatus> {
    payment_status_at(due_date, Utc::now())
}

/// A pending transaction whose due date has already passed.
///
/// Transactions without a due date are never overdue.
pub fn is_overdue(tx: &Transaction, now: DateTime<Utc>) -> AnalyticsResult<bool> {
    if !tx.is_pending() {
        return Ok(false);
    }

    match &tx.due_date {
        Some(due) => Ok(parse_date(due)? < now),
        None => Ok(false),
    }
}

/// Pending transactions past their due date, in input order.
pub fn overdue_transactions(
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> AnalyticsResult<Vec<Transaction>> {
    let mut overdue = Vec::new();
    for tx in transactions {
        if is_overdue(tx, now)? {
            overdue.push(tx.clone());
        }
    }
    Ok(overdue)
}

// ============================================================================
// TESTS
// ============================================================================
