//! # Care Ledger
//!
//! Wallet and transaction ledger for a caregiver-services marketplace.
//!
//! Clients pay caregivers and nurses for booked service hours; the platform
//! keeps a 10% fee and caregivers withdraw their earnings after an admin
//! decision. This library owns that money flow end to end, plus the
//! rate-limited password-recovery codes the auth flow depends on.
//!
//! ## Architecture
//!
//! Every money movement is a [`wallet::Transaction`] driven through a small
//! state machine:
//!
//! - **pending**: created, no balances touched yet
//! - **completed**: settled; the payer's lifetime spend and the recipient's
//!   balance/earnings moved in the same database transaction
//! - **cancelled**: reversed; reserved funds returned to the wallet
//!
//! Wallet rows are created lazily and only ever mutated inside the same
//! database transaction that changes the paired transaction row, so a crash
//! or a concurrent request can never strand or double-count money.
//!
//! ## Core Modules
//!
//! - [`wallet`]: wallets, transactions, the [`wallet::TransactionManager`]
//! - [`money`]: two-decimal EUR arithmetic and the platform fee split
//! - [`recovery`]: one-time password-reset codes with expiry and rate limits
//! - [`users`]: the thin account slice the ledger needs, plus [`users::Actor`]
//! - [`db`]: PostgreSQL pool construction and schema migrations
//!
//! ## Example
//!
//! ```
//! use care_ledger::money;
//! use rust_decimal::Decimal;
//!
//! // 3 hours of care at 15.00/h: the platform keeps 4.50, the caregiver
//! // nets 40.50.
//! let split = money::payment_breakdown(Decimal::from(3), Decimal::new(1500, 2));
//! assert_eq!(split.net_amount + split.platform_fee, split.amount);
//! ```

/// PostgreSQL connection pooling and schema management.
pub mod db;

/// Two-decimal EUR arithmetic and the platform fee split.
pub mod money;

/// Rate-limited one-time password-reset codes.
pub mod recovery;

/// User accounts and verified caller identity.
pub mod users;

/// Wallets, transactions, and the transaction state machine.
pub mod wallet;

pub use money::{payment_breakdown, PaymentBreakdown, PLATFORM_FEE_RATE};
pub use users::{Actor, UserId, UserType};
pub use wallet::{TransactionManager, WalletStore};
