// 🌐 REST API - payments, notifications and analytics over a PaymentStore
//
// Every body is wrapped in `{ success, data?, error?, message? }`.
// Request payloads are validated here before any analytics code runs.

use crate::aggregation::{
    category_totals, monthly_totals, spending_summary, status_totals, CategoryTotal,
    MonthlyTotal, SpendingSummary, StatusTotals,
};
use crate::anomaly::{detect_anomalies, Anomaly};
use crate::due::overdue_transactions;
use crate::error::{AnalyticsError, StoreError};
use crate::format::parse_date;
use crate::models::{
    NotificationPreferences, PaymentNotification, PaymentSummary, Subscription,
    SubscriptionStatus, Transaction, TransactionKind, TransactionStatus, DEFAULT_CURRENCY,
};
use crate::savings::{
    calculate_savings_opportunities, total_monthly_spend, total_potential_savings,
    SavingsOpportunity,
};
use crate::store::PaymentStore;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PaymentStore>,
}

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    fn ok_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.to_string()),
        }
    }
}

impl ApiResponse<()> {
    fn message(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.to_string()),
        }
    }

    fn failure(error: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            message: None,
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    Internal,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        ApiError::BadRequest(message.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::NotFound(format!("{} not found: {}", entity, id)),
            other => {
                tracing::error!(error = %other, "store operation failed");
                ApiError::Internal
            }
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        tracing::warn!(error = %err, "analytics rejected stored data");
        ApiError::Unprocessable(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ApiResponse::failure(&message))).into_response()
    }
}

fn require_wallet(wallet: Option<String>) -> Result<String, ApiError> {
    wallet
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .ok_or_else(|| ApiError::bad_request("Wallet address required"))
}

/// JSON body extractor whose rejections use the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

// ============================================================================
// REQUEST SCHEMAS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentsQuery {
    pub wallet: Option<String>,
    #[serde(rename = "type")]
    pub view: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    pub wallet: Option<String>,
    pub unread: Option<String>,
}

/// Amounts arrive either as JSON numbers or numeric strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    fn to_amount(&self) -> Result<f64, ApiError> {
        let amount = match self {
            AmountInput::Number(n) => *n,
            AmountInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ApiError::bad_request("Invalid amount"))?,
        };

        if !amount.is_finite() {
            return Err(ApiError::bad_request("Invalid amount"));
        }
        if amount < 0.0 {
            return Err(ApiError::bad_request("Amount must be non-negative"));
        }
        Ok(amount)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub wallet_address: Option<String>,
    pub description: Option<String>,
    pub amount: Option<AmountInput>,
    pub currency: Option<String>,
    pub due_date: Option<String>,
    pub is_recurring: Option<bool>,
    pub account_id: Option<String>,
}

impl CreatePaymentRequest {
    /// Validate and turn the request into a new pending payment dated `today`
    pub fn into_transaction(self, today: &str) -> Result<Transaction, ApiError> {
        let wallet = self.wallet_address.filter(|w| !w.trim().is_empty());
        let description = self.description.filter(|d| !d.trim().is_empty());

        let (Some(wallet), Some(description), Some(amount)) = (wallet, description, self.amount) else {
            return Err(ApiError::bad_request("Missing required fields"));
        };

        let amount = amount.to_amount()?;
        if amount == 0.0 {
            return Err(ApiError::bad_request("Missing required fields"));
        }

        let due_date = match self.due_date.filter(|d| !d.trim().is_empty()) {
            Some(due) => {
                parse_date(&due).map_err(|e| ApiError::BadRequest(e.to_string()))?;
                due
            }
            None => today.to_string(),
        };

        let currency = self
            .currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Ok(Transaction {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            account_id: self.account_id.unwrap_or_else(|| "default".to_string()),
            user_id: wallet.trim().to_string(),
            description: description.trim().to_string(),
            amount,
            currency,
            kind: TransactionKind::Payment,
            date: today.to_string(),
            status: TransactionStatus::Pending,
            is_recurring: self.is_recurring.unwrap_or(false),
            due_date: Some(due_date),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    pub status: TransactionStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub status: SubscriptionStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationRequest {
    pub notification_id: Option<String>,
    pub is_read: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    pub wallet_address: Option<String>,
    pub device_token: Option<String>,
    pub preferences: Option<NotificationPreferences>,
}

// ============================================================================
// RESPONSE BODIES
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PaymentsData {
    Summary(PaymentSummary),
    Transactions(Vec<Transaction>),
    Subscriptions(Vec<Subscription>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub summary: SpendingSummary,
    pub status_totals: StatusTotals,
    pub monthly: Vec<MonthlyTotal>,
    pub categories: Vec<CategoryTotal>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsResponse {
    pub opportunities: Vec<SavingsOpportunity>,
    pub total_monthly_spend: f64,
    pub total_potential_savings: f64,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/health
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/payments?wallet=&type=summary|upcoming|recent|subscriptions|completed|pending|overdue
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentsQuery>,
) -> ApiResult<PaymentsData> {
    let wallet = require_wallet(query.wallet)?;
    let transactions = state.store.list_transactions(&wallet)?;

    let data = match query.view.as_deref() {
        Some("summary") => {
            let subscriptions = state.store.list_subscriptions(&wallet)?;
            PaymentsData::Summary(PaymentSummary::build(&transactions, &subscriptions))
        }
        Some("upcoming") => {
            PaymentsData::Transactions(PaymentSummary::build(&transactions, &[]).upcoming_payments)
        }
        Some("recent") => {
            PaymentsData::Transactions(PaymentSummary::build(&transactions, &[]).recent_transactions)
        }
        Some("subscriptions") => PaymentsData::Subscriptions(state.store.list_subscriptions(&wallet)?),
        Some("completed") => PaymentsData::Transactions(
            transactions.into_iter().filter(|tx| tx.is_completed()).collect(),
        ),
        Some("pending") => PaymentsData::Transactions(
            transactions.into_iter().filter(|tx| tx.is_pending()).collect(),
        ),
        Some("overdue") => PaymentsData::Transactions(overdue_transactions(&transactions, Utc::now())?),
        _ => PaymentsData::Transactions(transactions),
    };

    Ok(Json(ApiResponse::ok(data)))
}

/// POST /api/payments
async fn create_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> ApiResult<Transaction> {
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let transaction = request.into_transaction(&today)?;

    state.store.insert_transaction(&transaction)?;
    tracing::info!(
        transaction_id = %transaction.transaction_id,
        amount = transaction.amount,
        "payment added"
    );

    Ok(Json(ApiResponse::ok_with_message(
        transaction,
        "Payment added successfully",
    )))
}

/// PATCH /api/payments/:id - e.g. mark a payment as paid
async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateTransactionRequest>,
) -> ApiResult<Transaction> {
    let updated = state.store.update_transaction_status(&id, request.status)?;
    Ok(Json(ApiResponse::ok_with_message(
        updated,
        "Payment updated successfully",
    )))
}

/// PATCH /api/subscriptions/:id - pause, resume or cancel
async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateSubscriptionRequest>,
) -> ApiResult<Subscription> {
    let updated = state.store.update_subscription_status(&id, request.status)?;
    Ok(Json(ApiResponse::ok_with_message(
        updated,
        "Subscription updated successfully",
    )))
}

/// GET /api/notifications?wallet=&unread=true
async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> ApiResult<Vec<PaymentNotification>> {
    let wallet = require_wallet(query.wallet)?;
    let unread_only = query.unread.as_deref() == Some("true");

    let notifications = state.store.list_notifications(&wallet, unread_only)?;
    Ok(Json(ApiResponse::ok(notifications)))
}

/// PATCH /api/notifications
async fn update_notification(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateNotificationRequest>,
) -> ApiResult<()> {
    let id = request
        .notification_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Notification ID required"))?;
    let is_read = request.is_read.unwrap_or(true);

    if !state.store.update_notification_read(&id, is_read)? {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(ApiResponse::message("Notification updated successfully")))
}

/// POST /api/notifications - register a device and store preferences
async fn register_device(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterDeviceRequest>,
) -> ApiResult<NotificationPreferences> {
    let wallet = request.wallet_address.filter(|w| !w.trim().is_empty());
    let token = request.device_token.filter(|t| !t.trim().is_empty());

    let (Some(wallet), Some(_token)) = (wallet, token) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    if let Some(prefs) = &request.preferences {
        state.store.save_preferences(&wallet, prefs)?;
    }
    let prefs = state.store.get_preferences(&wallet)?;

    tracing::debug!(wallet = %wallet, "device registered for notifications");

    Ok(Json(ApiResponse::ok_with_message(
        prefs,
        "Notification preferences updated successfully",
    )))
}

/// GET /api/analytics?wallet=
async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> ApiResult<AnalyticsResponse> {
    let wallet = require_wallet(query.wallet)?;
    let transactions = state.store.list_transactions(&wallet)?;

    // No history means nothing to compare against
    let anomalies = if transactions.is_empty() {
        Vec::new()
    } else {
        detect_anomalies(&transactions)?
    };

    Ok(Json(ApiResponse::ok(AnalyticsResponse {
        summary: spending_summary(&transactions)?,
        status_totals: status_totals(&transactions),
        monthly: monthly_totals(&transactions)?,
        categories: category_totals(&transactions),
        anomalies,
    })))
}

/// GET /api/subscriptions/savings?wallet=
async fn get_savings(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> ApiResult<SavingsResponse> {
    let wallet = require_wallet(query.wallet)?;
    let subscriptions = state.store.list_subscriptions(&wallet)?;
    let opportunities = calculate_savings_opportunities(&subscriptions);

    Ok(Json(ApiResponse::ok(SavingsResponse {
        total_monthly_spend: total_monthly_spend(&subscriptions),
        total_potential_savings: total_potential_savings(&opportunities),
        opportunities,
    })))
}

// ============================================================================
// ROUTER
// ============================================================================

/// API routes, mounted under `/api`
pub fn router(store: Arc<dyn PaymentStore>) -> Router {
    let state = AppState { store };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/:id", patch(update_payment))
        .route("/subscriptions/:id", patch(update_subscription))
        .route("/subscriptions/savings", get(get_savings))
        .route(
            "/notifications",
            get(list_notifications)
                .patch(update_notification)
                .post(register_device),
        )
        .route("/analytics", get(get_analytics))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
