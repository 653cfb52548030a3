// ⚠️ Error taxonomy for the analytics core and the payment store

use thiserror::Error;

/// Errors surfaced by the pure analytics functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A date-bearing field could not be parsed. Never silently defaulted.
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// Anomaly detection needs at least one transaction to compute a mean.
    #[error("Cannot analyze an empty transaction list")]
    EmptyInput,
}

/// Errors surfaced by a `PaymentStore` implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    /// A lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
