//! Transaction manager implementation.
//!
//! Every mutating operation runs inside a single database transaction: the
//! status change and the wallet balance moves either all commit or all roll
//! back, so a crash mid-operation can never strand money.

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    errors::{WalletError, WalletResult},
    models::{
        GatewayRefs, NewTransaction, ServiceDetails, TaggedTransaction, Transaction,
        TransactionFilter, TransactionId, TransactionKind, TransactionStatus, WithdrawalAction,
    },
    stats::{self, MonthlyBucket, TransactionStatistics},
    store,
};
use crate::money;
use crate::users::{Actor, UserId};

const TRANSACTION_COLUMNS: &str = "id, kind, status, amount, platform_fee, net_amount, currency, \
     from_user_id, to_user_id, service_kind, service_hours, service_hourly_rate, service_date, \
     payment_intent_ref, charge_ref, transfer_ref, refund_ref, description, notes, \
     created_at, updated_at, completed_at, cancelled_at";

/// Transaction manager
#[derive(Clone)]
pub struct TransactionManager {
    pool: Arc<PgPool>,
}

impl TransactionManager {
    /// Create a new transaction manager.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Record a pending transaction. No wallet is touched until the
    /// transaction is processed.
    ///
    /// The kind defaults to `payment` and the service kind to `caregiving`.
    /// The amount is `hours * hourly_rate` rounded to cents; payments and
    /// commissions surrender the 10% platform fee, withdrawals and refunds
    /// keep the full amount. The status is always `pending`, whatever the
    /// caller asked for.
    ///
    /// # Errors
    ///
    /// * `WalletError::InvalidInput` - Missing or non-positive hours/rate,
    ///   or no recipient
    /// * `WalletError::RecipientNotFound` - Recipient id matches no account
    pub async fn create_transaction(
        &self,
        actor: Actor,
        input: NewTransaction,
    ) -> WalletResult<Transaction> {
        let kind = input.kind.unwrap_or(TransactionKind::Payment);

        // Absent numeric fields count as zero, which validation then rejects.
        let hours = input.hours.unwrap_or(Decimal::ZERO);
        let hourly_rate = input.hourly_rate.unwrap_or(Decimal::ZERO);

        if hours <= Decimal::ZERO {
            return Err(WalletError::InvalidInput("hours must be positive".into()));
        }
        if hourly_rate <= Decimal::ZERO {
            return Err(WalletError::InvalidInput(
                "hourly rate must be positive".into(),
            ));
        }
        let to_user_id = input
            .to_user_id
            .ok_or_else(|| WalletError::InvalidInput("recipient not specified".into()))?;

        let recipient = sqlx::query("SELECT 1 AS one FROM users WHERE id = $1")
            .bind(to_user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if recipient.is_none() {
            return Err(WalletError::RecipientNotFound);
        }

        let split = money::payment_breakdown(hours, hourly_rate);
        let (platform_fee, net_amount) = if kind.carries_fee() {
            (split.platform_fee, split.net_amount)
        } else {
            (Decimal::ZERO, split.amount)
        };

        let service_kind = input
            .service_type
            .unwrap_or_else(|| "caregiving".to_string());

        let sql = format!(
            r#"
            INSERT INTO transactions
                (id, kind, status, amount, platform_fee, net_amount, currency,
                 from_user_id, to_user_id, service_kind, service_hours,
                 service_hourly_rate, service_date, description)
            VALUES ($1, $2, 'pending', $3, $4, $5, 'EUR', $6, $7, $8, $9, $10, $11, $12)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(kind.as_str())
            .bind(split.amount)
            .bind(platform_fee)
            .bind(net_amount)
            .bind(actor.user_id)
            .bind(to_user_id)
            .bind(&service_kind)
            .bind(hours)
            .bind(hourly_rate)
            .bind(input.service_date)
            .bind(&input.description)
            .fetch_one(self.pool.as_ref())
            .await?;

        let transaction = transaction_from_row(&row)?;
        log::info!(
            "Created {} transaction {} from user {} to user {} over {}",
            transaction.kind,
            transaction.id,
            actor.user_id,
            to_user_id,
            transaction.amount
        );

        Ok(transaction)
    }

    /// Settle a pending payment. Only the payer may do this.
    ///
    /// In one atomic step: the transaction becomes `completed` with gateway
    /// references stamped, the payer's lifetime spend grows by the gross
    /// amount, and the recipient's balance and lifetime earnings grow by the
    /// net amount.
    ///
    /// # Errors
    ///
    /// * `WalletError::TransactionNotFound` - Unknown id
    /// * `WalletError::Forbidden` - Caller is not the payer
    /// * `WalletError::NotAPayment` - Transaction is not a payment
    /// * `WalletError::AlreadyProcessed` - Status is no longer pending
    pub async fn process_payment(
        &self,
        actor: Actor,
        transaction_id: TransactionId,
    ) -> WalletResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WalletError::TransactionNotFound)?;
        let transaction = transaction_from_row(&row)?;

        if transaction.from_user_id != Some(actor.user_id) {
            return Err(WalletError::Forbidden);
        }
        if transaction.kind != TransactionKind::Payment {
            return Err(WalletError::NotAPayment);
        }
        if transaction.status != TransactionStatus::Pending {
            return Err(WalletError::AlreadyProcessed);
        }
        let to_user_id = transaction
            .to_user_id
            .ok_or(WalletError::MissingCounterparty)?;

        // Simulated gateway settlement; a real integration would confirm the
        // charge before this point.
        let stamp = chrono::Utc::now().timestamp_millis();
        let sql = format!(
            r#"
            UPDATE transactions
            SET status = 'completed', completed_at = NOW(), updated_at = NOW(),
                payment_intent_ref = $2, charge_ref = $3
            WHERE id = $1
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(transaction_id)
            .bind(format!("pi_simulated_{stamp}"))
            .bind(format!("ch_simulated_{stamp}"))
            .fetch_one(&mut *tx)
            .await?;
        let completed = transaction_from_row(&row)?;

        // Payer: lifetime spend grows by the gross amount.
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, total_spent, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                total_spent = wallets.total_spent + EXCLUDED.total_spent,
                updated_at = NOW()
            "#,
        )
        .bind(actor.user_id)
        .bind(completed.amount)
        .execute(&mut *tx)
        .await?;

        // Recipient: balance and lifetime earnings grow by the net amount.
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, balance, total_earnings, updated_at)
            VALUES ($1, $2, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                balance = wallets.balance + EXCLUDED.balance,
                total_earnings = wallets.total_earnings + EXCLUDED.total_earnings,
                updated_at = NOW()
            "#,
        )
        .bind(to_user_id)
        .bind(completed.net_amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "Payment {} completed: {} gross from user {} | {} net to user {}",
            completed.id,
            completed.amount,
            actor.user_id,
            completed.net_amount,
            to_user_id
        );

        Ok(completed)
    }

    /// Ask to withdraw earnings. Care providers only.
    ///
    /// The amount moves from `balance` to `pending_balance` in the same
    /// database transaction that records the pending withdrawal, with the
    /// wallet row locked across the balance check.
    ///
    /// # Errors
    ///
    /// * `WalletError::Forbidden` - Caller is not a care provider
    /// * `WalletError::InvalidAmount` - Amount is zero or negative
    /// * `WalletError::InsufficientFunds` - Balance below the requested amount
    pub async fn request_withdrawal(
        &self,
        actor: Actor,
        amount: Decimal,
    ) -> WalletResult<Transaction> {
        if !actor.user_type.is_care_provider() {
            return Err(WalletError::Forbidden);
        }

        let amount = money::round_to_cents(amount);
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(amount));
        }

        let mut tx = self.pool.begin().await?;

        let wallet = store::lock_wallet(&mut tx, actor.user_id).await?;
        if wallet.balance < amount {
            return Err(WalletError::InsufficientFunds {
                available: wallet.balance,
                required: amount,
            });
        }

        let sql = format!(
            r#"
            INSERT INTO transactions
                (id, kind, status, amount, platform_fee, net_amount, currency,
                 from_user_id, service_kind, description)
            VALUES ($1, 'withdrawal', 'pending', $2, 0, $2, 'EUR', $3, 'withdrawal', $4)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(amount)
            .bind(actor.user_id)
            .bind("Solicitação de saque")
            .fetch_one(&mut *tx)
            .await?;
        let transaction = transaction_from_row(&row)?;

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance - $1, pending_balance = pending_balance + $1, updated_at = NOW()
            WHERE user_id = $2
            "#,
        )
        .bind(amount)
        .bind(actor.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "Withdrawal {} requested: user {} reserved {}",
            transaction.id,
            actor.user_id,
            amount
        );

        Ok(transaction)
    }

    /// Decide a pending withdrawal. Approving completes it and releases the
    /// reserved funds; rejecting cancels it and returns them to the balance.
    /// Role enforcement (admin) happens at the API layer.
    ///
    /// # Errors
    ///
    /// * `WalletError::TransactionNotFound` - Unknown id
    /// * `WalletError::NotAWithdrawal` - Transaction is not a withdrawal
    /// * `WalletError::AlreadyProcessed` - Status is no longer pending
    pub async fn process_withdrawal(
        &self,
        transaction_id: TransactionId,
        action: WithdrawalAction,
        notes: Option<String>,
    ) -> WalletResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WalletError::TransactionNotFound)?;
        let transaction = transaction_from_row(&row)?;

        if transaction.kind != TransactionKind::Withdrawal {
            return Err(WalletError::NotAWithdrawal);
        }
        if transaction.status != TransactionStatus::Pending {
            return Err(WalletError::AlreadyProcessed);
        }
        let requester = transaction
            .from_user_id
            .ok_or(WalletError::MissingCounterparty)?;

        let decided = match action {
            WithdrawalAction::Approve => {
                let stamp = chrono::Utc::now().timestamp_millis();
                let notes = notes.unwrap_or_else(|| "Saque aprovado e processado".to_string());

                let sql = format!(
                    r#"
                    UPDATE transactions
                    SET status = 'completed', completed_at = NOW(), updated_at = NOW(),
                        transfer_ref = $2, notes = $3
                    WHERE id = $1
                    RETURNING {TRANSACTION_COLUMNS}
                    "#
                );
                let row = sqlx::query(&sql)
                    .bind(transaction_id)
                    .bind(format!("tr_simulated_{stamp}"))
                    .bind(&notes)
                    .fetch_one(&mut *tx)
                    .await?;

                // The reserved funds leave the platform.
                sqlx::query(
                    r#"
                    UPDATE wallets
                    SET pending_balance = pending_balance - $1, updated_at = NOW()
                    WHERE user_id = $2
                    "#,
                )
                .bind(transaction.amount)
                .bind(requester)
                .execute(&mut *tx)
                .await?;

                transaction_from_row(&row)?
            }
            WithdrawalAction::Reject => {
                let notes = notes.unwrap_or_else(|| "Saque rejeitado".to_string());

                let sql = format!(
                    r#"
                    UPDATE transactions
                    SET status = 'cancelled', cancelled_at = NOW(), updated_at = NOW(), notes = $2
                    WHERE id = $1
                    RETURNING {TRANSACTION_COLUMNS}
                    "#
                );
                let row = sqlx::query(&sql)
                    .bind(transaction_id)
                    .bind(&notes)
                    .fetch_one(&mut *tx)
                    .await?;

                // The reserved funds go back to the withdrawable balance.
                sqlx::query(
                    r#"
                    UPDATE wallets
                    SET pending_balance = pending_balance - $1, balance = balance + $1,
                        updated_at = NOW()
                    WHERE user_id = $2
                    "#,
                )
                .bind(transaction.amount)
                .bind(requester)
                .execute(&mut *tx)
                .await?;

                transaction_from_row(&row)?
            }
        };

        tx.commit().await?;

        log::info!(
            "Withdrawal {} for user {} over {} -> {}",
            decided.id,
            requester,
            decided.amount,
            decided.status
        );

        Ok(decided)
    }

    /// List a user's transactions (sent or received), newest first, each
    /// tagged with its direction. Optional status/kind filters.
    pub async fn find_by_user(
        &self,
        user_id: UserId,
        filter: TransactionFilter,
    ) -> WalletResult<Vec<TaggedTransaction>> {
        let sql = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE (from_user_id = $1 OR to_user_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR kind = $3)
            ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.kind.map(|k| k.as_str()))
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.iter()
            .map(|row| Ok(TaggedTransaction::new(transaction_from_row(row)?, user_id)))
            .collect()
    }

    /// List every transaction on the platform, newest first. Optional
    /// status/kind filters.
    pub async fn find_all(&self, filter: TransactionFilter) -> WalletResult<Vec<Transaction>> {
        let sql = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR kind = $2)
            ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.kind.map(|k| k.as_str()))
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    /// Fetch a single transaction.
    pub async fn find_by_id(
        &self,
        transaction_id: TransactionId,
    ) -> WalletResult<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(transaction_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.as_ref().map(transaction_from_row).transpose()
    }

    /// Aggregate counters over all of a user's transactions.
    pub async fn statistics(&self, user_id: UserId) -> WalletResult<TransactionStatistics> {
        let sql = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE from_user_id = $1 OR to_user_id = $1
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        let transactions: Vec<Transaction> =
            rows.iter().map(transaction_from_row).collect::<WalletResult<_>>()?;

        Ok(stats::summarize(&transactions))
    }

    /// Platform-wide completed activity bucketed by calendar month, oldest
    /// first, covering the most recent `months` months (clamped to
    /// [`stats::MAX_HISTORY_MONTHS`]).
    pub async fn monthly_history(&self, months: u32) -> WalletResult<Vec<MonthlyBucket>> {
        let sql =
            format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE status = 'completed'");
        let rows = sqlx::query(&sql).fetch_all(self.pool.as_ref()).await?;

        let transactions: Vec<Transaction> =
            rows.iter().map(transaction_from_row).collect::<WalletResult<_>>()?;

        Ok(stats::monthly_history(
            &transactions,
            months,
            chrono::Utc::now(),
        ))
    }
}

fn transaction_from_row(row: &PgRow) -> WalletResult<Transaction> {
    let raw_kind: String = row.get("kind");
    let kind = TransactionKind::parse(&raw_kind).ok_or(WalletError::UnknownKind(raw_kind))?;

    let raw_status: String = row.get("status");
    let status =
        TransactionStatus::parse(&raw_status).ok_or(WalletError::UnknownStatus(raw_status))?;

    Ok(Transaction {
        id: row.get("id"),
        kind,
        status,
        amount: row.get("amount"),
        platform_fee: row.get("platform_fee"),
        net_amount: row.get("net_amount"),
        currency: row.get("currency"),
        from_user_id: row.get("from_user_id"),
        to_user_id: row.get("to_user_id"),
        service_details: ServiceDetails {
            kind: row.get("service_kind"),
            hours: row.get("service_hours"),
            hourly_rate: row.get("service_hourly_rate"),
            date: row.get("service_date"),
        },
        gateway_refs: GatewayRefs {
            payment_intent: row.get("payment_intent_ref"),
            charge: row.get("charge_ref"),
            transfer: row.get("transfer_ref"),
            refund: row.get("refund_ref"),
        },
        description: row.get("description"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        completed_at: row.get("completed_at"),
        cancelled_at: row.get("cancelled_at"),
    })
}
