//! Wallet module providing the marketplace's EUR ledger.
//!
//! This module implements:
//! - Lazily created per-user wallets (balance, pending balance, lifetime totals)
//! - Payment transactions with a 10% platform fee split
//! - The pending → completed | cancelled transaction lifecycle
//! - Withdrawal requests with funds reserved until an admin decision
//! - ACID-compliant wallet updates (status change and balance moves commit together)
//! - Per-user statistics and platform-wide monthly history
//!
//! ## Example
//!
//! ```no_run
//! use care_ledger::db::Database;
//! use care_ledger::users::{Actor, UserType};
//! use care_ledger::wallet::{NewTransaction, TransactionManager};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let manager = TransactionManager::new(Arc::new(db.pool().clone()));
//!
//!     let client = Actor::new(1, UserType::Client);
//!     let transaction = manager
//!         .create_transaction(
//!             client,
//!             NewTransaction {
//!                 to_user_id: Some(2),
//!                 hours: Some(Decimal::new(3, 0)),
//!                 hourly_rate: Some(Decimal::new(1500, 2)),
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!
//!     // The payer settles the pending transaction; balances move atomically.
//!     let completed = manager.process_payment(client, transaction.id).await?;
//!     println!("net credited to caregiver: {}", completed.net_amount);
//!
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod stats;
pub mod store;

pub use errors::{WalletError, WalletResult};
pub use manager::TransactionManager;
pub use models::{
    Direction, GatewayRefs, NewTransaction, ServiceDetails, TaggedTransaction, Transaction,
    TransactionFilter, TransactionId, TransactionKind, TransactionStatus, Wallet,
    WithdrawalAction,
};
pub use stats::{
    monthly_history, summarize, MonthlyBucket, TransactionStatistics, MAX_HISTORY_MONTHS,
};
pub use store::WalletStore;
