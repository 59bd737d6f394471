//! HTTP API for the care-marketplace wallet ledger.
//!
//! This module provides the REST surface over the ledger library: wallet and
//! transaction endpoints, the admin withdrawal queue, login, and the
//! password-recovery flow.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework
//! - **Tower**: Middleware for CORS and request IDs
//! - **JWT**: Bearer access tokens carrying the caller's id and role
//!
//! # Modules
//!
//! - [`auth`]: Login and access-token issuing
//! - [`wallet`]: Wallet, transaction, and admin withdrawal endpoints
//! - [`password`]: Forgot/verify/reset password-recovery flow
//! - [`middleware`]: Bearer-token authentication and the admin gate
//! - [`request_id`]: Request ID correlation
//!
//! # Endpoints Overview
//!
//! ## Public
//! - `GET  /health` - Server health status
//! - `POST /api/auth/login` - Login with email and password
//! - `POST /api/password/forgot` - Request a reset code
//! - `POST /api/password/verify-code` - Check a reset code
//! - `POST /api/password/reset` - Set a new password with a valid code
//!
//! ## Wallet (Bearer token required)
//! - `GET  /api/wallet/my-wallet` - Caller's wallet
//! - `GET  /api/wallet/my-transactions` - Caller's transaction history
//! - `GET  /api/wallet/my-statistics` - Caller's aggregate statistics
//! - `POST /api/wallet/transactions` - Create a payment transaction
//! - `POST /api/wallet/transactions/{id}/process` - Settle a pending payment
//! - `POST /api/wallet/withdrawal` - Request a withdrawal (care providers)
//!
//! ## Admin (Bearer token with admin role)
//! - `GET  /api/wallet/admin/transactions` - All platform transactions
//! - `GET  /api/wallet/admin/monthly-history` - Monthly activity buckets
//! - `POST /api/wallet/admin/withdrawals/{id}/process` - Approve or reject
//!
//! # Response Envelope
//!
//! Every JSON response uses the same envelope:
//!
//! ```json
//! { "success": true, "data": { }, "message": "optional" }
//! ```
//!
//! Error responses carry `success: false` and a client-safe `message`;
//! storage errors are logged server-side and never leak details.

pub mod auth;
pub mod middleware;
pub mod password;
pub mod request_id;
pub mod wallet;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use care_ledger::{
    recovery::{RecoveryError, ResetThrottle},
    users::{UserError, UserStore},
    wallet::{TransactionManager, WalletError, WalletStore},
};
use serde::Serialize;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::SecurityConfig;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap due to Arc wrappers).
///
/// # Fields
///
/// - `transactions`: Creates transactions and drives their lifecycle
/// - `wallets`: Lazily created per-user wallets
/// - `users`: Account lookups and password storage
/// - `resets`: Password-reset code issuing and verification
/// - `security`: JWT secret and password pepper
/// - `pool`: Database connection pool for the health check
#[derive(Clone)]
pub struct AppState {
    pub transactions: Arc<TransactionManager>,
    pub wallets: Arc<WalletStore>,
    pub users: Arc<UserStore>,
    pub resets: Arc<ResetThrottle>,
    pub security: Arc<SecurityConfig>,
    pub pool: Arc<PgPool>,
}

/// Error half of every handler: a status code plus an enveloped message.
pub type ApiError = (StatusCode, Json<Value>);

/// Envelope for a successful response carrying data.
pub(crate) fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Envelope for a successful response carrying only a message.
pub(crate) fn ok_message(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

/// Envelope for a failed response.
pub(crate) fn fail(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "message": message }))
}

/// Map a ledger error onto a status code and enveloped client message.
pub(crate) fn wallet_error(err: WalletError) -> ApiError {
    let status = match &err {
        WalletError::Database(_) | WalletError::UnknownKind(_) | WalletError::UnknownStatus(_) => {
            tracing::error!("Wallet operation failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        WalletError::TransactionNotFound | WalletError::RecipientNotFound => StatusCode::NOT_FOUND,
        WalletError::Forbidden => StatusCode::FORBIDDEN,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, fail(&err.client_message()))
}

/// Map a password-recovery error onto a status code and enveloped message.
pub(crate) fn recovery_error(err: RecoveryError) -> ApiError {
    let status = match &err {
        RecoveryError::Database(_) => {
            tracing::error!("Password-recovery operation failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        RecoveryError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, fail(&err.client_message()))
}

/// Map a user-store error onto a status code and enveloped message.
pub(crate) fn user_error(err: UserError) -> ApiError {
    let status = match &err {
        UserError::Database(_) | UserError::UnknownUserType(_) => {
            tracing::error!("User operation failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        UserError::NotFound => StatusCode::NOT_FOUND,
        UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, fail(&err.client_message()))
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Arguments
///
/// - `state`: Application state with the ledger stores and managers
///
/// # Returns
///
/// Configured Axum router ready to serve requests
///
/// # Example
///
/// ```rust,no_run
/// # use cl_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    // Admin endpoints sit behind the role gate on top of the Bearer check.
    let admin_routes = Router::new()
        .route("/admin/transactions", get(wallet::admin_transactions))
        .route("/admin/monthly-history", get(wallet::admin_monthly_history))
        .route(
            "/admin/withdrawals/{transaction_id}/process",
            post(wallet::process_withdrawal),
        )
        .layer(axum::middleware::from_fn(middleware::require_admin));

    let wallet_routes = Router::new()
        .route("/my-wallet", get(wallet::my_wallet))
        .route("/my-transactions", get(wallet::my_transactions))
        .route("/my-statistics", get(wallet::my_statistics))
        .route("/transactions", post(wallet::create_transaction))
        .route(
            "/transactions/{transaction_id}/process",
            post(wallet::process_payment),
        )
        .route("/withdrawal", post(wallet::request_withdrawal))
        .merge(admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(auth::login))
        .route("/api/password/forgot", post(password::forgot))
        .route("/api/password/verify-code", post(password::verify_code))
        .route("/api/password/reset", post(password::reset));

    Router::new()
        .merge(public_routes)
        .nest("/api/wallet", wallet_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Executes a trivial query to prove database connectivity.
///
/// Returns `200 OK` when the database answers, `503 Service Unavailable`
/// otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","database":true,"timestamp":"2026-08-29T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(state.pool.as_ref())
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
