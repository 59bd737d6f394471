//! Password-recovery data models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Reset record ID type
pub type ResetId = Uuid;

/// Freshly issued reset code. The code itself leaves the system only through
/// the (simulated) email channel, never through an API response.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub id: ResetId,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Proof that a caller presented the correct, live code for an email.
/// Holds the reset id so the caller can mark the record used after the
/// password actually changes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetClaim {
    pub reset_id: ResetId,
    pub email: String,
}
