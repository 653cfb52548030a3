// PayNoti - Core Library
// Payment tracking, subscription analytics and spending notifications
// keyed on a wallet address. Exposes all modules for the CLI, API server,
// and tests.

pub mod error;
pub mod models;
pub mod format;       // Currency + date rendering
pub mod due;          // Due-status classifier
pub mod anomaly;      // High-amount anomaly detection
pub mod savings;      // Subscription savings estimates
pub mod aggregation;  // Monthly + category totals for charts
pub mod store;        // Repository trait + in-memory store
pub mod db;           // SQLite store + CSV import
pub mod seed;         // Demo wallet data
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{AnalyticsError, AnalyticsResult, StoreError, StoreResult};
pub use models::{
    AccountType, BillingCycle, NotificationKind, NotificationPreferences, PaymentAccount,
    PaymentNotification, PaymentSummary, Subscription, SubscriptionStatus, Transaction,
    TransactionKind, TransactionStatus, User,
};
pub use format::{format_currency, format_date, parse_date};
pub use due::{days_until_due, is_overdue, payment_status, payment_status_at, PaymentStatus};
pub use anomaly::{detect_anomalies, Anomaly, AnomalyType};
pub use savings::{
    calculate_savings_opportunities, monthly_cost, total_monthly_spend, total_potential_savings,
    SavingsOpportunity,
};
pub use aggregation::{
    category_totals, dominant_currency, monthly_totals, spending_summary, status_totals,
    CategoryTotal, MonthlyTotal, SpendingSummary, StatusTotals,
};
pub use store::{MemoryStore, PaymentStore};
pub use db::{load_transactions_csv, ImportStats, SqliteStore};
pub use config::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the fmt subscriber used by both binaries (`RUST_LOG` filters).
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
