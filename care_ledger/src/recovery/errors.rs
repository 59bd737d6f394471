//! Password-recovery error types.

use thiserror::Error;

/// Password-reset throttle errors
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Too many codes issued for this email in the rolling window
    #[error("Too many reset requests for this email")]
    RateLimited,

    /// No unused code matches, or the supplied code is wrong
    #[error("Invalid reset code")]
    InvalidCode,

    /// The code exists but its 15-minute window has passed
    #[error("Reset code expired")]
    ExpiredCode,

    /// The code burned through its verification attempts
    #[error("Too many verification attempts")]
    TooManyAttempts,

    /// `mark_used` was called with an unknown reset id
    #[error("Reset record not found")]
    ResetNotFound,
}

impl RecoveryError {
    /// Client-facing message. The recovery flow speaks Portuguese to match
    /// the rest of the marketplace UI; storage details are never exposed.
    pub fn client_message(&self) -> String {
        match self {
            RecoveryError::Database(_) => "Internal server error".to_string(),
            RecoveryError::RateLimited => {
                "Muitas solicitações. Aguarde antes de pedir outro código".to_string()
            }
            RecoveryError::InvalidCode | RecoveryError::ResetNotFound => {
                "Código inválido".to_string()
            }
            RecoveryError::ExpiredCode => "Código expirado".to_string(),
            RecoveryError::TooManyAttempts => {
                "Muitas tentativas. Solicite um novo código".to_string()
            }
        }
    }
}

/// Result type for password-recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;
