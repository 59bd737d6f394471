//! Authentication API handlers.
//!
//! Login with email and password, returning a 24-hour Bearer token whose
//! claims carry the caller's id and marketplace role. Accounts are
//! provisioned directly through the ledger's `UserStore`; there is no
//! self-registration endpoint on this surface.
//!
//! # Examples
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:3000/api/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "ana@example.com", "password": "s3nh4-forte"}'
//! ```

use axum::{Json, extract::State, http::StatusCode};
use care_ledger::users::{UserAccount, password};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, AppState, fail, ok, user_error};
use super::middleware::AccessTokenClaims;

/// Access-token lifetime.
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Authenticate a user and issue an access token.
///
/// # Request Body
///
/// ```json
/// { "email": "ana@example.com", "password": "s3nh4-forte" }
/// ```
///
/// # Response
///
/// On success, returns `200 OK`:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiIs...",
///     "user": { "id": 42, "email": "ana@example.com", "userType": "caregiver" }
///   }
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password - same message for
///   both, so the endpoint cannot be used to enumerate accounts
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invalid_credentials = || (StatusCode::UNAUTHORIZED, fail("Email ou senha inválidos"));

    let (user, password_hash) = state
        .users
        .credentials_by_email(&payload.email)
        .await
        .map_err(user_error)?
        .ok_or_else(invalid_credentials)?;

    if password::verify_password(
        &payload.password,
        &password_hash,
        &state.security.password_pepper,
    )
    .is_err()
    {
        crate::logging::log_security_event(
            "failed_login",
            Some(user.id),
            "Invalid password attempt",
        );
        return Err(invalid_credentials());
    }

    let token = issue_access_token(&user, &state.security.jwt_secret).map_err(|err| {
        tracing::error!("Failed to sign access token: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            fail("Internal server error"),
        )
    })?;

    tracing::info!("User {} logged in", user.id);

    Ok(ok(json!({ "token": token, "user": user })))
}

/// Sign a 24-hour HS256 access token for an account.
pub fn issue_access_token(
    user: &UserAccount,
    jwt_secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = AccessTokenClaims {
        sub: user.id,
        user_type: user.user_type,
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
}
