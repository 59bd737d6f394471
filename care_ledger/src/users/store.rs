//! User account persistence.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use super::{
    errors::{UserError, UserResult},
    models::{NewUser, UserAccount, UserId, UserType},
};

/// Store for user accounts.
#[derive(Clone)]
pub struct UserStore {
    pool: Arc<PgPool>,
}

impl UserStore {
    /// Create a new user store.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Provision a user account. The email is normalised to lowercase.
    ///
    /// # Errors
    ///
    /// * `UserError::EmailTaken` - Another account already uses the email
    pub async fn create(&self, new_user: NewUser) -> UserResult<UserAccount> {
        let email = new_user.email.trim().to_lowercase();

        let existing = sqlx::query("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if existing.is_some() {
            return Err(UserError::EmailTaken);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO users (email, display_name, user_type, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, display_name, user_type, created_at, updated_at
            "#,
        )
        .bind(&email)
        .bind(&new_user.display_name)
        .bind(new_user.user_type.as_str())
        .bind(&new_user.password_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        account_from_row(&row)
    }

    /// Look up an account by id.
    pub async fn find_by_id(&self, user_id: UserId) -> UserResult<Option<UserAccount>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, display_name, user_type, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    /// Look up an account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<UserAccount>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, display_name, user_type, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    /// Look up an account together with its password hash, for login.
    pub async fn credentials_by_email(
        &self,
        email: &str,
    ) -> UserResult<Option<(UserAccount, String)>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, display_name, user_type, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(r) => {
                let hash: String = r.get("password_hash");
                Ok(Some((account_from_row(&r)?, hash)))
            }
            None => Ok(None),
        }
    }

    /// Whether any account uses the email.
    pub async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let row = sqlx::query("SELECT 1 AS one FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.is_some())
    }

    /// Replace the password hash for the account with the given email.
    ///
    /// # Errors
    ///
    /// * `UserError::NotFound` - No account uses the email
    pub async fn set_password(&self, email: &str, password_hash: &str) -> UserResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email.trim().to_lowercase())
        .bind(password_hash)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        Ok(())
    }
}

fn account_from_row(row: &PgRow) -> UserResult<UserAccount> {
    let raw_type: String = row.get("user_type");
    let user_type =
        UserType::parse(&raw_type).ok_or_else(|| UserError::UnknownUserType(raw_type))?;

    Ok(UserAccount {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        user_type,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
