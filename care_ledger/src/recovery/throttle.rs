//! Password-reset throttle implementation.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    errors::{RecoveryError, RecoveryResult},
    models::{IssuedCode, ResetClaim, ResetId},
};

/// Minutes a code stays valid after issue.
pub const CODE_TTL_MINUTES: i64 = 15;

/// Verification attempts before a code is exhausted.
pub const MAX_ATTEMPTS: i32 = 5;

/// Codes allowed per email within the rolling rate-limit window.
pub const MAX_CODES_PER_WINDOW: i64 = 3;

/// Length of the rolling rate-limit window in minutes.
pub const RATE_LIMIT_WINDOW_MINUTES: i64 = 60;

/// Issues, verifies and consumes one-time password-reset codes, capping both
/// how often codes are issued per email and how often a code may be guessed.
#[derive(Clone)]
pub struct ResetThrottle {
    pool: Arc<PgPool>,
}

impl ResetThrottle {
    /// Create a new reset throttle.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Issue a fresh code for an email, invalidating any unused predecessors.
    /// Latest-code-wins: predecessors are marked used in the same commit as
    /// the insert, so the email never has two live codes. The retired rows
    /// stay in place until [`ResetThrottle::cleanup_expired`] reaps them,
    /// which keeps the issuance history [`ResetThrottle::check_rate_limit`]
    /// counts over.
    ///
    /// Callers must pass the rate limit first; `create` itself does not
    /// consult it.
    pub async fn create(&self, email: &str) -> RecoveryResult<IssuedCode> {
        let email = normalize_email(email);
        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE password_resets SET used = TRUE, used_at = NOW() WHERE email = $1 AND used = FALSE",
        )
        .bind(&email)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            r#"
            INSERT INTO password_resets (id, email, code, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(&code)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!("Issued password-reset code for {email}");

        Ok(IssuedCode {
            id: row.get("id"),
            email,
            code,
            expires_at: row.get("expires_at"),
        })
    }

    /// Enforce the per-email issue cap: at most [`MAX_CODES_PER_WINDOW`]
    /// codes within the trailing [`RATE_LIMIT_WINDOW_MINUTES`]. Every issued
    /// code counts, used or not.
    ///
    /// # Errors
    ///
    /// * `RecoveryError::RateLimited` - The cap is already reached
    pub async fn check_rate_limit(&self, email: &str) -> RecoveryResult<()> {
        let email = normalize_email(email);

        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS recent
            FROM password_resets
            WHERE email = $1
              AND created_at > NOW() - make_interval(mins => $2)
            "#,
        )
        .bind(&email)
        .bind(RATE_LIMIT_WINDOW_MINUTES as i32)
        .fetch_one(self.pool.as_ref())
        .await?;

        let recent: i64 = row.get("recent");
        if recent >= MAX_CODES_PER_WINDOW {
            log::warn!("Password-reset rate limit hit for {email}");
            return Err(RecoveryError::RateLimited);
        }

        Ok(())
    }

    /// Check a code against the newest unused record for the email.
    ///
    /// Expired records reject without burning anything. Every other
    /// verification increments the attempt counter first, whatever the
    /// outcome, so wrong guesses spend the budget and the call that reaches
    /// [`MAX_ATTEMPTS`] is answered with exhaustion even when the code is
    /// right. Verification never consumes the code; only
    /// [`ResetThrottle::mark_used`] does.
    ///
    /// # Errors
    ///
    /// * `RecoveryError::InvalidCode` - No live record, or the code is wrong
    /// * `RecoveryError::ExpiredCode` - The record's 15 minutes are up
    /// * `RecoveryError::TooManyAttempts` - The attempt budget is spent
    pub async fn verify(&self, email: &str, code: &str) -> RecoveryResult<ResetClaim> {
        let email = normalize_email(email);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, code, expires_at
            FROM password_resets
            WHERE email = $1 AND used = FALSE
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RecoveryError::InvalidCode)?;

        let expires_at: DateTime<Utc> = row.get("expires_at");
        if Utc::now() > expires_at {
            // Left in place for the cleanup job to reap.
            return Err(RecoveryError::ExpiredCode);
        }

        let reset_id: ResetId = row.get("id");
        let attempts: i32 = sqlx::query(
            "UPDATE password_resets SET attempts = attempts + 1 WHERE id = $1 RETURNING attempts",
        )
        .bind(reset_id)
        .fetch_one(&mut *tx)
        .await?
        .get("attempts");

        // The burned attempt persists even when the verdict below is a
        // rejection.
        tx.commit().await?;

        if attempts >= MAX_ATTEMPTS {
            return Err(RecoveryError::TooManyAttempts);
        }

        let stored: String = row.get("code");
        if stored != code {
            return Err(RecoveryError::InvalidCode);
        }

        Ok(ResetClaim { reset_id, email })
    }

    /// Consume a verified code after the password actually changed.
    ///
    /// # Errors
    ///
    /// * `RecoveryError::ResetNotFound` - Unknown id, or already used
    pub async fn mark_used(&self, reset_id: ResetId) -> RecoveryResult<()> {
        let result = sqlx::query(
            "UPDATE password_resets SET used = TRUE, used_at = NOW() WHERE id = $1 AND used = FALSE",
        )
        .bind(reset_id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RecoveryError::ResetNotFound);
        }

        Ok(())
    }

    /// Reap expired records. Meant for a periodic job, not the request path.
    /// Returns how many rows were deleted.
    pub async fn cleanup_expired(&self) -> RecoveryResult<u64> {
        let result = sqlx::query("DELETE FROM password_resets WHERE expires_at < NOW()")
            .execute(self.pool.as_ref())
            .await?;

        let reaped = result.rows_affected();
        if reaped > 0 {
            log::info!("Reaped {reaped} expired password-reset codes");
        }

        Ok(reaped)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Six uniformly random digits, never with a leading zero.
fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits_in_range() {
        for _ in 0..1_000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().expect("code is numeric");
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }
}
