// 🗂️ Payment Store - repository abstraction over transactions,
// subscriptions, notifications and notification preferences
//
// Callers fetch collections here and hand them to the pure analytics
// functions; the analytics code never reaches into a store itself.

use crate::error::{StoreError, StoreResult};
use crate::models::{
    NotificationPreferences, PaymentNotification, Subscription, SubscriptionStatus, Transaction,
    TransactionStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// list / get / update access to the dashboard's records.
///
/// `user` is the owner wallet address.
pub trait PaymentStore: Send + Sync {
    fn list_transactions(&self, user: &str) -> StoreResult<Vec<Transaction>>;
    fn get_transaction(&self, id: &str) -> StoreResult<Option<Transaction>>;
    fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()>;
    fn update_transaction_status(&self, id: &str, status: TransactionStatus) -> StoreResult<Transaction>;

    fn list_subscriptions(&self, user: &str) -> StoreResult<Vec<Subscription>>;
    fn get_subscription(&self, id: &str) -> StoreResult<Option<Subscription>>;
    fn insert_subscription(&self, sub: &Subscription) -> StoreResult<()>;
    fn update_subscription_status(
        &self,
        id: &str,
        status: SubscriptionStatus,
    ) -> StoreResult<Subscription>;

    fn list_notifications(&self, user: &str, unread_only: bool) -> StoreResult<Vec<PaymentNotification>>;
    fn get_notification(&self, id: &str) -> StoreResult<Option<PaymentNotification>>;
    fn insert_notification(&self, notification: &PaymentNotification) -> StoreResult<()>;

    /// Set the read flag. Returns `false` when no such notification exists.
    fn update_notification_read(&self, id: &str, is_read: bool) -> StoreResult<bool>;

    /// Stored preferences, or the defaults for an unknown wallet
    fn get_preferences(&self, user: &str) -> StoreResult<NotificationPreferences>;
    fn save_preferences(&self, user: &str, prefs: &NotificationPreferences) -> StoreResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Default)]
struct MemoryState {
    transactions: Vec<Transaction>,
    subscriptions: Vec<Subscription>,
    notifications: Vec<PaymentNotification>,
    preferences: HashMap<String, NotificationPreferences>,
}

/// Process-local store backed by RwLock-guarded vectors
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the given records
    pub fn with_records(
        transactions: Vec<Transaction>,
        subscriptions: Vec<Subscription>,
        notifications: Vec<PaymentNotification>,
    ) -> Self {
        MemoryStore {
            state: Arc::new(RwLock::new(MemoryState {
                transactions,
                subscriptions,
                notifications,
                preferences: HashMap::new(),
            })),
        }
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, MemoryState>> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

impl PaymentStore for MemoryStore {
    fn list_transactions(&self, user: &str) -> StoreResult<Vec<Transaction>> {
        let state = self.read()?;
        Ok(state
            .transactions
            .iter()
            .filter(|tx| tx.user_id == user)
            .cloned()
            .collect())
    }

    fn get_transaction(&self, id: &str) -> StoreResult<Option<Transaction>> {
        let state = self.read()?;
        Ok(state
            .transactions
            .iter()
            .find(|tx| tx.transaction_id == id)
            .cloned())
    }

    fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        let mut state = self.write()?;
        state.transactions.push(tx.clone());
        Ok(())
    }

    fn update_transaction_status(&self, id: &str, status: TransactionStatus) -> StoreResult<Transaction> {
        let mut state = self.write()?;
        let tx = state
            .transactions
            .iter_mut()
            .find(|tx| tx.transaction_id == id)
            .ok_or_else(|| StoreError::not_found("transaction", id))?;
        tx.status = status;
        Ok(tx.clone())
    }

    fn list_subscriptions(&self, user: &str) -> StoreResult<Vec<Subscription>> {
        let state = self.read()?;
        Ok(state
            .subscriptions
            .iter()
            .filter(|sub| sub.user_id == user)
            .cloned()
            .collect())
    }

    fn get_subscription(&self, id: &str) -> StoreResult<Option<Subscription>> {
        let state = self.read()?;
        Ok(state
            .subscriptions
            .iter()
            .find(|sub| sub.subscription_id == id)
            .cloned())
    }

    fn insert_subscription(&self, sub: &Subscription) -> StoreResult<()> {
        let mut state = self.write()?;
        state.subscriptions.push(sub.clone());
        Ok(())
    }

    fn update_subscription_status(
        &self,
        id: &str,
        status: SubscriptionStatus,
    ) -> StoreResult<Subscription> {
        let mut state = self.write()?;
        let sub = state
            .subscriptions
            .iter_mut()
            .find(|sub| sub.subscription_id == id)
            .ok_or_else(|| StoreError::not_found("subscription", id))?;
        sub.status = status;
        Ok(sub.clone())
    }

    fn list_notifications(&self, user: &str, unread_only: bool) -> StoreResult<Vec<PaymentNotification>> {
        let state = self.read()?;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.user_id == user && (!unread_only || !n.is_read))
            .cloned()
            .collect())
    }

    fn get_notification(&self, id: &str) -> StoreResult<Option<PaymentNotification>> {
        let state = self.read()?;
        Ok(state.notifications.iter().find(|n| n.id == id).cloned())
    }

    fn insert_notification(&self, notification: &PaymentNotification) -> StoreResult<()> {
        let mut state = self.write()?;
        state.notifications.push(notification.clone());
        Ok(())
    }

    fn update_notification_read(&self, id: &str, is_read: bool) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.is_read = is_read;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_preferences(&self, user: &str) -> StoreResult<NotificationPreferences> {
        let state = self.read()?;
        Ok(state.preferences.get(user).cloned().unwrap_or_default())
    }

    fn save_preferences(&self, user: &str, prefs: &NotificationPreferences) -> StoreResult<()> {
        let mut state = self.write()?;
        state.preferences.insert(user.to_string(), prefs.clone());
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
