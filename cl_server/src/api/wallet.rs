//! Wallet and transaction API handlers.
//!
//! All endpoints here sit behind the Bearer-token middleware; the verified
//! [`Actor`] arrives through request extensions and is the only identity the
//! ledger ever sees. The admin endpoints additionally sit behind the role
//! gate, so the handlers themselves re-check nothing.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use care_ledger::{
    users::Actor,
    wallet::{
        NewTransaction, TransactionFilter, TransactionId, TransactionKind, TransactionStatus,
        WithdrawalAction,
    },
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::{ApiError, AppState, fail, ok, wallet_error};

/// Optional filters for transaction listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Turn the raw query strings into a typed filter, rejecting values
    /// outside the known statuses and kinds.
    fn filter(&self) -> Result<TransactionFilter, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(|raw| {
                TransactionStatus::parse(raw)
                    .ok_or_else(|| (StatusCode::BAD_REQUEST, fail("Filtro de status inválido")))
            })
            .transpose()?;

        let kind = self
            .kind
            .as_deref()
            .map(|raw| {
                TransactionKind::parse(raw)
                    .ok_or_else(|| (StatusCode::BAD_REQUEST, fail("Filtro de tipo inválido")))
            })
            .transpose()?;

        Ok(TransactionFilter { status, kind })
    }
}

/// `GET /api/wallet/my-wallet` - the caller's wallet, created on first read.
pub async fn my_wallet(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ApiError> {
    let wallet = state
        .wallets
        .get_or_create(actor.user_id)
        .await
        .map_err(wallet_error)?;

    Ok(ok(wallet))
}

/// `GET /api/wallet/my-transactions` - the caller's transactions, newest
/// first, each tagged `sent` or `received`. Supports `status`, `type` and
/// `limit` query parameters.
pub async fn my_transactions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = query.filter()?;

    let mut transactions = state
        .transactions
        .find_by_user(actor.user_id, filter)
        .await
        .map_err(wallet_error)?;

    if let Some(limit) = query.limit {
        transactions.truncate(limit);
    }

    Ok(ok(transactions))
}

/// `GET /api/wallet/my-statistics` - aggregate counters over the caller's
/// transactions; sums cover completed rows only.
pub async fn my_statistics(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ApiError> {
    let statistics = state
        .transactions
        .statistics(actor.user_id)
        .await
        .map_err(wallet_error)?;

    Ok(ok(statistics))
}

/// `POST /api/wallet/transactions` - record a pending payment from the
/// caller to a care provider.
///
/// # Request Body
///
/// ```json
/// {
///   "toUserId": 7,
///   "serviceType": "caregiving",
///   "hours": 3,
///   "hourlyRate": 15.0,
///   "serviceDate": "2026-08-20T09:00:00Z",
///   "description": "Cuidados domiciliares"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing recipient, or hours/rate not positive
/// - `404 Not Found`: recipient id matches no account
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let transaction = state
        .transactions
        .create_transaction(actor, input)
        .await
        .map_err(wallet_error)?;

    Ok((StatusCode::CREATED, ok(transaction)))
}

/// `POST /api/wallet/transactions/{id}/process` - settle a pending payment.
/// Only the payer may call this; balances move atomically with the status
/// change.
///
/// # Errors
///
/// - `404 Not Found`: unknown transaction id
/// - `403 Forbidden`: caller is not the payer
/// - `400 Bad Request`: transaction is not a pending payment
pub async fn process_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, ApiError> {
    let transaction = state
        .transactions
        .process_payment(actor, transaction_id)
        .await
        .map_err(wallet_error)?;

    Ok(ok(transaction))
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalPayload {
    pub amount: Decimal,
}

/// `POST /api/wallet/withdrawal` - reserve part of the caller's balance for
/// withdrawal, pending an admin decision.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not a caregiver or nurse
/// - `400 Bad Request`: amount not positive, or balance too low
pub async fn request_withdrawal(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<WithdrawalPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let transaction = state
        .transactions
        .request_withdrawal(actor, payload.amount)
        .await
        .map_err(wallet_error)?;

    Ok((StatusCode::CREATED, ok(transaction)))
}

/// `GET /api/wallet/admin/transactions` - every transaction on the platform,
/// newest first, with the same `status`/`type` filters as the user listing.
pub async fn admin_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = query.filter()?;

    let mut transactions = state
        .transactions
        .find_all(filter)
        .await
        .map_err(wallet_error)?;

    if let Some(limit) = query.limit {
        transactions.truncate(limit);
    }

    Ok(ok(transactions))
}

#[derive(Debug, Deserialize)]
pub struct MonthlyHistoryQuery {
    pub months: Option<u32>,
}

/// `GET /api/wallet/admin/monthly-history` - completed platform activity
/// bucketed by calendar month, oldest first. Defaults to the trailing 12
/// months; windows beyond 120 months are clamped.
pub async fn admin_monthly_history(
    State(state): State<AppState>,
    Query(query): Query<MonthlyHistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let months = query.months.unwrap_or(12);

    let history = state
        .transactions
        .monthly_history(months)
        .await
        .map_err(wallet_error)?;

    Ok(ok(history))
}

#[derive(Debug, Deserialize)]
pub struct ProcessWithdrawalPayload {
    pub action: String,
    pub notes: Option<String>,
}

/// `POST /api/wallet/admin/withdrawals/{id}/process` - decide a pending
/// withdrawal. `approve` completes it and releases the reserved funds;
/// `reject` cancels it and restores the balance.
///
/// # Errors
///
/// - `400 Bad Request`: action is neither `approve` nor `reject`, or the
///   transaction is not a pending withdrawal
/// - `404 Not Found`: unknown transaction id
pub async fn process_withdrawal(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<ProcessWithdrawalPayload>,
) -> Result<Json<Value>, ApiError> {
    let action = WithdrawalAction::parse(&payload.action).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            fail("Ação inválida. Use approve ou reject"),
        )
    })?;

    let transaction = state
        .transactions
        .process_withdrawal(transaction_id, action, payload.notes)
        .await
        .map_err(wallet_error)?;

    Ok(ok(transaction))
}
