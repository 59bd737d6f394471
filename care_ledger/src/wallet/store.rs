//! Wallet persistence with lazy row creation.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::sync::Arc;

use super::errors::WalletResult;
use super::models::Wallet;
use crate::users::UserId;

pub(crate) const WALLET_COLUMNS: &str =
    "user_id, balance, pending_balance, total_earnings, total_spent, currency, created_at, updated_at";

/// Store for per-user wallets. Rows come into existence on first touch, so
/// reads never fail for a user without ledger activity.
#[derive(Clone)]
pub struct WalletStore {
    pool: Arc<PgPool>,
}

impl WalletStore {
    /// Create a new wallet store.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Fetch a user's wallet, creating a zeroed row first when none exists.
    pub async fn get_or_create(&self, user_id: UserId) -> WalletResult<Wallet> {
        sqlx::query("INSERT INTO wallets (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        let row = sqlx::query(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(wallet_from_row(&row))
    }
}

/// Lock a user's wallet row inside `tx`, creating it first when missing.
/// Concurrent mutations of the same wallet serialize on this lock.
pub(crate) async fn lock_wallet(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> WalletResult<Wallet> {
    sqlx::query("INSERT INTO wallets (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    let row = sqlx::query(&format!(
        "SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(wallet_from_row(&row))
}

pub(crate) fn wallet_from_row(row: &PgRow) -> Wallet {
    Wallet {
        user_id: row.get("user_id"),
        balance: row.get("balance"),
        pending_balance: row.get("pending_balance"),
        total_earnings: row.get("total_earnings"),
        total_spent: row.get("total_spent"),
        currency: row.get("currency"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
