//! Wallet error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Wallet and transaction errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Transaction not found
    #[error("Transaction not found")]
    TransactionNotFound,

    /// Payment recipient does not exist
    #[error("Recipient not found")]
    RecipientNotFound,

    /// Caller is not allowed to perform this operation
    #[error("Not authorized to perform this operation")]
    Forbidden,

    /// Transaction already left the pending state
    #[error("Transaction already processed")]
    AlreadyProcessed,

    /// Operation requires a payment transaction
    #[error("Not a payment transaction")]
    NotAPayment,

    /// Operation requires a withdrawal transaction
    #[error("Not a withdrawal transaction")]
    NotAWithdrawal,

    /// Transaction row lacks the counterparty the operation needs
    #[error("Transaction is missing a counterparty")]
    MissingCounterparty,

    /// Balance too low for the requested amount
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },

    /// Amount must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Request failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored kind column held a value outside the known kinds
    #[error("Unknown transaction kind: {0}")]
    UnknownKind(String),

    /// Stored status column held a value outside the known statuses
    #[error("Unknown transaction status: {0}")]
    UnknownStatus(String),
}

impl WalletError {
    /// Get a client-safe error message that doesn't leak sensitive information.
    ///
    /// Database errors and corrupt-row decodes are sanitized so SQL details
    /// and raw column values never reach a client.
    pub fn client_message(&self) -> String {
        match self {
            WalletError::Database(_)
            | WalletError::UnknownKind(_)
            | WalletError::UnknownStatus(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
