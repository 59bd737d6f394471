//! Password-recovery API handlers.
//!
//! The forgot/verify/reset flow over [`care_ledger::recovery::ResetThrottle`].
//! Email delivery is simulated: issued codes are written to the server log
//! instead of an outbox.
//!
//! The forgot endpoint answers with the same generic message whether or not
//! the email is registered, so it cannot be used to enumerate accounts.

use axum::{Json, extract::State, http::StatusCode};
use care_ledger::users::password;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, AppState, fail, ok, ok_message, recovery_error, user_error};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// Generic answer for the forgot endpoint, identical for known and unknown
/// emails.
const FORGOT_MESSAGE: &str =
    "Se o email estiver cadastrado, um código de recuperação foi enviado";

#[derive(Debug, Deserialize)]
pub struct ForgotPayload {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodePayload {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPayload {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// `POST /api/password/forgot` - issue a reset code for a registered email.
///
/// Unknown emails get the generic `200 OK` without touching the throttle;
/// known emails are rate-limited to 3 codes per rolling hour.
///
/// # Errors
///
/// - `429 Too Many Requests`: the email's issue cap is reached
pub async fn forgot(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPayload>,
) -> Result<Json<Value>, ApiError> {
    if !state
        .users
        .email_exists(&payload.email)
        .await
        .map_err(user_error)?
    {
        return Ok(ok_message(FORGOT_MESSAGE));
    }

    state
        .resets
        .check_rate_limit(&payload.email)
        .await
        .map_err(recovery_error)?;

    let issued = state
        .resets
        .create(&payload.email)
        .await
        .map_err(recovery_error)?;

    // Simulated email delivery.
    tracing::info!(
        "Password-reset code for {}: {} (expires {})",
        issued.email,
        issued.code,
        issued.expires_at
    );

    Ok(ok_message(FORGOT_MESSAGE))
}

/// `POST /api/password/verify-code` - check a code without consuming it.
///
/// A successful check still burns one of the code's 5 attempts; only a
/// completed reset marks the code used.
///
/// # Errors
///
/// - `400 Bad Request`: wrong code, expired code, or attempts exhausted
pub async fn verify_code(
    State(state): State<AppState>,
    Json(payload): Json<VerifyCodePayload>,
) -> Result<Json<Value>, ApiError> {
    state
        .resets
        .verify(&payload.email, &payload.code)
        .await
        .map_err(recovery_error)?;

    Ok(ok(json!({ "valid": true })))
}

/// `POST /api/password/reset` - set a new password with a valid code.
///
/// Verifies the code, stores the new Argon2id hash, then marks the code
/// used so it cannot authorize a second change.
///
/// # Errors
///
/// - `400 Bad Request`: password too short, or the code is wrong, expired,
///   or exhausted
pub async fn reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetPayload>,
) -> Result<Json<Value>, ApiError> {
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err((
            StatusCode::BAD_REQUEST,
            fail("A senha deve ter pelo menos 6 caracteres"),
        ));
    }

    let claim = state
        .resets
        .verify(&payload.email, &payload.code)
        .await
        .map_err(recovery_error)?;

    let password_hash = password::hash_password(
        &payload.new_password,
        &state.security.password_pepper,
    )
    .map_err(user_error)?;

    state
        .users
        .set_password(&claim.email, &password_hash)
        .await
        .map_err(user_error)?;

    state
        .resets
        .mark_used(claim.reset_id)
        .await
        .map_err(recovery_error)?;

    tracing::info!("Password reset completed for {}", claim.email);

    Ok(ok_message("Senha alterada com sucesso"))
}
