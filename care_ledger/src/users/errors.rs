//! User account error types.

use thiserror::Error;

/// User account errors
#[derive(Debug, Error)]
pub enum UserError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// User not found
    #[error("User not found")]
    NotFound,

    /// Email already exists
    #[error("Email already exists")]
    EmailTaken,

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Email or password did not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Stored user_type column held a value outside the known roles
    #[error("Unknown user type: {0}")]
    UnknownUserType(String),
}

impl UserError {
    /// Client-safe message that doesn't leak storage details.
    pub fn client_message(&self) -> String {
        match self {
            UserError::Database(_) | UserError::UnknownUserType(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for user account operations
pub type UserResult<T> = Result<T, UserError>;
