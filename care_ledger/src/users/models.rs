//! User account data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User ID type
pub type UserId = i64;

/// Marketplace role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Client,
    Caregiver,
    Nurse,
    Admin,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Caregiver => "caregiver",
            UserType::Nurse => "nurse",
            UserType::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "client" => Some(UserType::Client),
            "caregiver" => Some(UserType::Caregiver),
            "nurse" => Some(UserType::Nurse),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }

    /// Whether this role provides care services and may withdraw earnings.
    pub fn is_care_provider(self) -> bool {
        matches!(self, UserType::Caregiver | UserType::Nurse)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, UserType::Admin)
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified caller identity, taken from the access token rather than the
/// database row, and threaded into every wallet operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub user_type: UserType,
}

impl Actor {
    pub fn new(user_id: UserId, user_type: UserType) -> Self {
        Self { user_id, user_type }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type.is_admin()
    }
}

/// User account as stored, minus the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for provisioning an account. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub user_type: UserType,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_round_trips_through_strings() {
        for kind in [
            UserType::Client,
            UserType::Caregiver,
            UserType::Nurse,
            UserType::Admin,
        ] {
            assert_eq!(UserType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(UserType::parse("janitor"), None);
    }

    #[test]
    fn only_care_providers_may_withdraw() {
        assert!(UserType::Caregiver.is_care_provider());
        assert!(UserType::Nurse.is_care_provider());
        assert!(!UserType::Client.is_care_provider());
        assert!(!UserType::Admin.is_care_provider());
    }

    #[test]
    fn user_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserType::Caregiver).unwrap(),
            "\"caregiver\""
        );
    }
}
