// 🗄️ SQLite Payment Store - CSV import + WAL-mode persistence
//
// Every write also appends to the `events` audit table so changes to
// payments and notifications can be traced after the fact.

use crate::error::{StoreError, StoreResult};
use crate::format::parse_date;
use crate::models::{
    BillingCycle, NotificationKind, NotificationPreferences, PaymentNotification, Subscription,
    SubscriptionStatus, Transaction, TransactionKind, TransactionStatus, DEFAULT_CURRENCY,
};
use crate::store::PaymentStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// AUDIT EVENTS
// ============================================================================

/// Event for audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // WAL for crash recovery; in-memory databases report "memory" instead
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            transaction_id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            kind TEXT NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            due_date TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            subscription_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            service_name TEXT NOT NULL,
            billing_cycle TEXT NOT NULL,
            next_billing_date TEXT NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            status TEXT NOT NULL,
            category TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            amount REAL,
            due_date TEXT,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS notification_preferences (
            user_id TEXT PRIMARY KEY,
            email INTEGER NOT NULL,
            push INTEGER NOT NULL,
            reminder_days INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_user ON subscriptions(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> StoreResult<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, oldest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> StoreResult<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY id",
    )?;

    let rows = stmt.query_map(params![entity_type, entity_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (event_id, timestamp, event_type, entity_type, entity_id, data, actor) = row?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| StoreError::InvalidValue(format!("event timestamp {}: {}", timestamp, e)))?
            .with_timezone(&Utc);

        events.push(Event {
            event_id,
            timestamp,
            event_type,
            entity_type,
            entity_id,
            data: serde_json::from_str(&data)?,
            actor,
        });
    }

    Ok(events)
}

// ============================================================================
// CSV IMPORT
// ============================================================================

/// Load transactions from a CSV file with camelCase headers
/// (`transactionId,accountId,userId,description,amount,currency,type,...`).
///
/// Blank ids get a fresh UUID and blank currencies fall back to USD.
pub fn load_transactions_csv(csv_path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut transactions = Vec::new();

    for (index, result) in rdr.deserialize().enumerate() {
        let mut transaction: Transaction = result
            .with_context(|| format!("Failed to deserialize transaction on record {}", index + 1))?;

        if transaction.transaction_id.trim().is_empty() {
            transaction.transaction_id = uuid::Uuid::new_v4().to_string();
        }
        if transaction.currency.trim().is_empty() {
            transaction.currency = DEFAULT_CURRENCY.to_string();
        }
        anyhow::ensure!(
            transaction.amount >= 0.0,
            "negative amount on record {} ({})",
            index + 1,
            transaction.transaction_id
        );

        parse_date(&transaction.date)
            .with_context(|| format!("Bad date on record {} ({})", index + 1, transaction.transaction_id))?;
        if let Some(due) = &transaction.due_date {
            parse_date(due).with_context(|| {
                format!("Bad due date on record {} ({})", index + 1, transaction.transaction_id)
            })?;
        }

        transactions.push(transaction);
    }

    Ok(transactions)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Insert a batch, skipping ids that already exist.
pub fn insert_transactions(conn: &Connection, transactions: &[Transaction]) -> StoreResult<ImportStats> {
    let mut stats = ImportStats::default();

    for tx in transactions {
        match insert_transaction_row(conn, tx) {
            Ok(()) => {
                stats.inserted += 1;
                record_transaction_added(conn, tx, "csv_importer");
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                stats.duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(
        inserted = stats.inserted,
        duplicates = stats.duplicates,
        "transactions imported"
    );

    Ok(stats)
}

fn insert_transaction_row(conn: &Connection, tx: &Transaction) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO transactions (
            transaction_id, account_id, user_id, description, amount, currency,
            kind, date, status, is_recurring, due_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            tx.transaction_id,
            tx.account_id,
            tx.user_id,
            tx.description,
            tx.amount,
            tx.currency,
            tx.kind.as_str(),
            tx.date,
            tx.status.as_str(),
            tx.is_recurring,
            tx.due_date,
        ],
    )?;
    Ok(())
}

fn record_transaction_added(conn: &Connection, tx: &Transaction, actor: &str) {
    let event = Event::new(
        "transaction_added",
        "transaction",
        &tx.transaction_id,
        serde_json::json!({
            "user_id": tx.user_id,
            "amount": tx.amount,
            "currency": tx.currency,
        }),
        actor,
    );
    if let Err(e) = insert_event(conn, &event) {
        tracing::warn!(error = %e, transaction_id = %tx.transaction_id, "failed to record audit event");
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn parse_label<T>(value: String) -> StoreResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| StoreError::InvalidValue(e.to_string()))
}

struct TransactionRow {
    transaction_id: String,
    account_id: String,
    user_id: String,
    description: String,
    amount: f64,
    currency: String,
    kind: String,
    date: String,
    status: String,
    is_recurring: bool,
    due_date: Option<String>,
}

const TRANSACTION_COLUMNS: &str = "transaction_id, account_id, user_id, description, amount, \
     currency, kind, date, status, is_recurring, due_date";

impl TransactionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TransactionRow {
            transaction_id: row.get(0)?,
            account_id: row.get(1)?,
            user_id: row.get(2)?,
            description: row.get(3)?,
            amount: row.get(4)?,
            currency: row.get(5)?,
            kind: row.get(6)?,
            date: row.get(7)?,
            status: row.get(8)?,
            is_recurring: row.get(9)?,
            due_date: row.get(10)?,
        })
    }

    fn into_transaction(self) -> StoreResult<Transaction> {
        Ok(Transaction {
            transaction_id: self.transaction_id,
            account_id: self.account_id,
            user_id: self.user_id,
            description: self.description,
            amount: self.amount,
            currency: self.currency,
            kind: parse_label::<TransactionKind>(self.kind)?,
            date: self.date,
            status: parse_label::<TransactionStatus>(self.status)?,
            is_recurring: self.is_recurring,
            due_date: self.due_date,
        })
    }
}

struct SubscriptionRow {
    subscription_id: String,
    user_id: String,
    service_name: String,
    billing_cycle: String,
    next_billing_date: String,
    amount: f64,
    currency: String,
    status: String,
    category: String,
}

const SUBSCRIPTION_COLUMNS: &str = "subscription_id, user_id, service_name, billing_cycle, \
     next_billing_date, amount, currency, status, category";

impl SubscriptionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SubscriptionRow {
            subscription_id: row.get(0)?,
            user_id: row.get(1)?,
            service_name: row.get(2)?,
            billing_cycle: row.get(3)?,
            next_billing_date: row.get(4)?,
            amount: row.get(5)?,
            currency: row.get(6)?,
            status: row.get(7)?,
            category: row.get(8)?,
        })
    }

    fn into_subscription(self) -> StoreResult<Subscription> {
        Ok(Subscription {
            subscription_id: self.subscription_id,
            user_id: self.user_id,
            service_name: self.service_name,
            billing_cycle: parse_label::<BillingCycle>(self.billing_cycle)?,
            next_billing_date: self.next_billing_date,
            amount: self.amount,
            currency: self.currency,
            status: parse_label::<SubscriptionStatus>(self.status)?,
            category: self.category,
        })
    }
}

struct NotificationRow {
    id: String,
    user_id: String,
    kind: String,
    title: String,
    message: String,
    amount: Option<f64>,
    due_date: Option<String>,
    is_read: bool,
    created_at: String,
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, message, amount, due_date, is_read, created_at";

impl NotificationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(NotificationRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: row.get(2)?,
            title: row.get(3)?,
            message: row.get(4)?,
            amount: row.get(5)?,
            due_date: row.get(6)?,
            is_read: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_notification(self) -> StoreResult<PaymentNotification> {
        Ok(PaymentNotification {
            id: self.id,
            user_id: self.user_id,
            kind: parse_label::<NotificationKind>(self.kind)?,
            title: self.title,
            message: self.message,
            amount: self.amount,
            due_date: self.due_date,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// `PaymentStore` backed by a single SQLite connection
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::from_connection(conn).context("Failed to initialize database schema")
    }

    /// Fresh private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Bulk import, skipping transactions whose id already exists
    pub fn import_transactions(&self, transactions: &[Transaction]) -> StoreResult<ImportStats> {
        let conn = self.conn()?;
        insert_transactions(&conn, transactions)
    }

    /// Number of stored transactions
    pub fn count_transactions(&self) -> StoreResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Audit trail for one entity
    pub fn events_for(&self, entity_type: &str, entity_id: &str) -> StoreResult<Vec<Event>> {
        let conn = self.conn()?;
        get_events_for_entity(&conn, entity_type, entity_id)
    }

    /// Copy all records of another store's wallet into this database
    pub fn seed_from(&self, source: &dyn PaymentStore, user: &str) -> StoreResult<()> {
        let transactions = source.list_transactions(user)?;
        self.import_transactions(&transactions)?;

        for sub in source.list_subscriptions(user)? {
            if self.get_subscription(&sub.subscription_id)?.is_none() {
                self.insert_subscription(&sub)?;
            }
        }

        for notification in source.list_notifications(user, false)? {
            if self.get_notification(&notification.id)?.is_none() {
                self.insert_notification(&notification)?;
            }
        }

        Ok(())
    }
}

impl PaymentStore for SqliteStore {
    fn list_transactions(&self, user: &str) -> StoreResult<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE user_id = ?1 ORDER BY rowid",
            TRANSACTION_COLUMNS
        ))?;

        let rows = stmt.query_map(params![user], TransactionRow::from_row)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?.into_transaction()?);
        }
        Ok(transactions)
    }

    fn get_transaction(&self, id: &str) -> StoreResult<Option<Transaction>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE transaction_id = ?1",
                    TRANSACTION_COLUMNS
                ),
                params![id],
                TransactionRow::from_row,
            )
            .optional()?;

        row.map(TransactionRow::into_transaction).transpose()
    }

    fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        let conn = self.conn()?;
        insert_transaction_row(&conn, tx)?;
        record_transaction_added(&conn, tx, "api");
        Ok(())
    }

    fn update_transaction_status(&self, id: &str, status: TransactionStatus) -> StoreResult<Transaction> {
        {
            let conn = self.conn()?;
            let changed = conn.execute(
                "UPDATE transactions SET status = ?1 WHERE transaction_id = ?2",
                params![status.as_str(), id],
            )?;
            if changed == 0 {
                return Err(StoreError::not_found("transaction", id));
            }

            let event = Event::new(
                "transaction_status_changed",
                "transaction",
                id,
                serde_json::json!({ "status": status.as_str() }),
                "api",
            );
            insert_event(&conn, &event)?;
        }

        self.get_transaction(id)?
            .ok_or_else(|| StoreError::not_found("transaction", id))
    }

    fn list_subscriptions(&self, user: &str) -> StoreResult<Vec<Subscription>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = ?1 ORDER BY rowid",
            SUBSCRIPTION_COLUMNS
        ))?;

        let rows = stmt.query_map(params![user], SubscriptionRow::from_row)?;

        let mut subscriptions = Vec::new();
        for row in rows {
            subscriptions.push(row?.into_subscription()?);
        }
        Ok(subscriptions)
    }

    fn get_subscription(&self, id: &str) -> StoreResult<Option<Subscription>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM subscriptions WHERE subscription_id = ?1",
                    SUBSCRIPTION_COLUMNS
                ),
                params![id],
                SubscriptionRow::from_row,
            )
            .optional()?;

        row.map(SubscriptionRow::into_subscription).transpose()
    }

    fn insert_subscription(&self, sub: &Subscription) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO subscriptions (
                subscription_id, user_id, service_name, billing_cycle, next_billing_date,
                amount, currency, status, category
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                sub.subscription_id,
                sub.user_id,
                sub.service_name,
                sub.billing_cycle.as_str(),
                sub.next_billing_date,
                sub.amount,
                sub.currency,
                sub.status.as_str(),
                sub.category,
            ],
        )?;
        Ok(())
    }

    fn update_subscription_status(
        &self,
        id: &str,
        status: SubscriptionStatus,
    ) -> StoreResult<Subscription> {
        {
            let conn = self.conn()?;
            let changed = conn.execute(
                "UPDATE subscriptions SET status = ?1 WHERE subscription_id = ?2",
                params![status.as_str(), id],
            )?;
            if changed == 0 {
                return Err(StoreError::not_found("subscription", id));
            }

            let event = Event::new(
                "subscription_status_changed",
                "subscription",
                id,
                serde_json::json!({ "status": status.as_str() }),
                "api",
            );
            insert_event(&conn, &event)?;
        }

        self.get_subscription(id)?
            .ok_or_else(|| StoreError::not_found("subscription", id))
    }

    fn list_notifications(&self, user: &str, unread_only: bool) -> StoreResult<Vec<PaymentNotification>> {
        let conn = self.conn()?;
        let sql = if unread_only {
            format!(
                "SELECT {} FROM notifications WHERE user_id = ?1 AND is_read = 0 ORDER BY rowid",
                NOTIFICATION_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM notifications WHERE user_id = ?1 ORDER BY rowid",
                NOTIFICATION_COLUMNS
            )
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user], NotificationRow::from_row)?;

        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?.into_notification()?);
        }
        Ok(notifications)
    }

    fn get_notification(&self, id: &str) -> StoreResult<Option<PaymentNotification>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM notifications WHERE id = ?1", NOTIFICATION_COLUMNS),
                params![id],
                NotificationRow::from_row,
            )
            .optional()?;

        row.map(NotificationRow::into_notification).transpose()
    }

    fn insert_notification(&self, notification: &PaymentNotification) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO notifications (
                id, user_id, kind, title, message, amount, due_date, is_read, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                notification.id,
                notification.user_id,
                notification.kind.as_str(),
                notification.title,
                notification.message,
                notification.amount,
                notification.due_date,
                notification.is_read,
                notification.created_at,
            ],
        )?;
        Ok(())
    }

    fn update_notification_read(&self, id: &str, is_read: bool) -> StoreResult<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE notifications SET is_read = ?1 WHERE id = ?2",
            params![is_read, id],
        )?;

        if changed == 0 {
            return Ok(false);
        }

        let event = Event::new(
            "notification_read_changed",
            "notification",
            id,
            serde_json::json!({ "is_read": is_read }),
            "api",
        );
        insert_event(&conn, &event)?;

        Ok(true)
    }

    fn get_preferences(&self, user: &str) -> StoreResult<NotificationPreferences> {
        let conn = self.conn()?;
        let prefs = conn
            .query_row(
                "SELECT email, push, reminder_days FROM notification_preferences WHERE user_id = ?1",
                params![user],
                |row| {
                    Ok(NotificationPreferences {
                        email: row.get(0)?,
                        push: row.get(1)?,
                        reminder_days: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(prefs.unwrap_or_default())
    }

    fn save_preferences(&self, user: &str, prefs: &NotificationPreferences) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO notification_preferences (user_id, email, push, reminder_days)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                email = excluded.email,
                push = excluded.push,
                reminder_days = excluded.reminder_days",
            params![user, prefs.email, prefs.push, prefs.reminder_days],
        )?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{self, DEMO_WALLET};
    use std::io::Write;

    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.seed_from(&seed::demo_memory_store(), DEMO_WALLET).unwrap();
        store
    }

    fn temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.csv", name, uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_seeded_store_round_trips_records() {
        let store = seeded_store();

        assert_eq!(store.list_transactions(DEMO_WALLET).unwrap(), seed::demo_transactions());
        assert_eq!(store.list_subscriptions(DEMO_WALLET).unwrap(), seed::demo_subscriptions());
        assert_eq!(
            store.list_notifications(DEMO_WALLET, false).unwrap(),
            seed::demo_notifications()
        );
    }

    #[test]
    fn test_import_skips_duplicates() {
        let store = SqliteStore::open_in_memory().unwrap();
        let txs = seed::demo_transactions();

        let first = store.import_transactions(&txs).unwrap();
        assert_eq!(first.inserted, txs.len());
        assert_eq!(first.duplicates, 0);

        let second = store.import_transactions(&txs).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, txs.len());
        assert_eq!(store.count_transactions().unwrap(), txs.len() as i64);
    }

    #[test]
    fn test_update_transaction_status_records_event() {
        let store = seeded_store();

        let updated = store
            .update_transaction_status("tx1", TransactionStatus::Completed)
            .unwrap();
        assert!(updated.is_completed());

        let events = store.events_for("transaction", "tx1").unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["transaction_added", "transaction_status_changed"]);

        assert!(matches!(
            store.update_transaction_status("nope", TransactionStatus::Failed),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_notification_read_flag() {
        let store = seeded_store();

        assert_eq!(store.list_notifications(DEMO_WALLET, true).unwrap().len(), 2);
        assert!(store.update_notification_read("n1", true).unwrap());
        assert_eq!(store.list_notifications(DEMO_WALLET, true).unwrap().len(), 1);
        assert!(!store.update_notification_read("missing", true).unwrap());
    }

    #[test]
    fn test_subscription_status_update() {
        let store = seeded_store();
        let updated = store
            .update_subscription_status("sub1", SubscriptionStatus::Cancelled)
            .unwrap();
        assert_eq!(updated.status, SubscriptionStatus::Cancelled);
    }

    #[test]
    fn test_preferences_upsert() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get_preferences("0xabc").unwrap(), NotificationPreferences::default());

        let mut prefs = NotificationPreferences {
            email: true,
            push: true,
            reminder_days: 5,
        };
        store.save_preferences("0xabc", &prefs).unwrap();
        prefs.reminder_days = 1;
        store.save_preferences("0xabc", &prefs).unwrap();

        assert_eq!(store.get_preferences("0xabc").unwrap(), prefs);
    }

    #[test]
    fn test_invalid_stored_label_is_reported() {
        let store = seeded_store();
        {
            let conn = store.conn().unwrap();
            conn.execute(
                "UPDATE transactions SET kind = 'refund' WHERE transaction_id = 'tx1'",
                [],
            )
            .unwrap();
        }

        assert!(matches!(
            store.get_transaction("tx1"),
            Err(StoreError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_load_transactions_csv() {
        let path = temp_csv(
            "paynoti-import",
            "transactionId,accountId,userId,description,amount,currency,type,date,status,isRecurring,dueDate\n\
             t1,acc1,0xabc,Coffee,4.5,USD,payment,2025-01-02,completed,false,\n\
             ,acc1,0xabc,Rent,1200,,transfer,2025-01-01,pending,true,2025-01-05\n",
        );

        let txs = load_transactions_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].transaction_id, "t1");
        assert_eq!(txs[0].due_date, None);
        assert!(!txs[1].transaction_id.is_empty());
        assert_eq!(txs[1].currency, "USD");
        assert_eq!(txs[1].kind, TransactionKind::Transfer);
        assert_eq!(txs[1].due_date.as_deref(), Some("2025-01-05"));
    }

    #[test]
    fn test_load_transactions_csv_rejects_negative_amounts() {
        let path = temp_csv(
            "paynoti-negative",
            "transactionId,accountId,userId,description,amount,currency,type,date,status,isRecurring,dueDate\n\
             t1,acc1,0xabc,Refund,-4.5,USD,payment,2025-01-02,completed,false,\n",
        );

        let result = load_transactions_csv(&path);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_load_transactions_csv_rejects_bad_dates() {
        let path = temp_csv(
            "paynoti-bad-date",
            "transactionId,accountId,userId,description,amount,currency,type,date,status,isRecurring,dueDate\n\
             t1,acc1,0xabc,Coffee,4.5,USD,payment,2025-01-02,completed,false,\n\
             t2,acc1,0xabc,Rent,1200,USD,transfer,last tuesday,pending,true,\n",
        );
        let result = load_transactions_csv(&path);
        std::fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("record 2"), "{}", err);

        let path = temp_csv(
            "paynoti-bad-due-date",
            "transactionId,accountId,userId,description,amount,currency,type,date,status,isRecurring,dueDate\n\
             t3,acc1,0xabc,Rent,1200,USD,transfer,2025-01-01,pending,true,whenever\n",
        );
        let result = load_transactions_csv(&path);
        std::fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Bad due date on record 1"), "{}", err);
    }
}
