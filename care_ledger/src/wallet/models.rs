//! Wallet and transaction data models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::users::UserId;

/// Transaction ID type
pub type TransactionId = Uuid;

/// Per-user wallet. Created lazily on first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub user_id: UserId,
    /// Withdrawable funds.
    pub balance: Decimal,
    /// Funds reserved by withdrawal requests awaiting an admin decision.
    pub pending_balance: Decimal,
    /// Lifetime net amount credited from completed payments.
    pub total_earnings: Decimal,
    /// Lifetime gross amount paid out through completed payments.
    pub total_spent: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Payment,
    Withdrawal,
    Refund,
    Commission,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Payment => "payment",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Refund => "refund",
            TransactionKind::Commission => "commission",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "payment" => Some(TransactionKind::Payment),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            "refund" => Some(TransactionKind::Refund),
            "commission" => Some(TransactionKind::Commission),
            _ => None,
        }
    }

    /// Whether the platform takes its fee from this kind of transaction.
    pub fn carries_fee(self) -> bool {
        matches!(self, TransactionKind::Payment | TransactionKind::Commission)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            "cancelled" => Some(TransactionStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a transaction relative to the queried user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

/// Service details attached to payment transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetails {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub hours: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
}

/// References handed back by the (simulated) payment gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRefs {
    pub payment_intent: Option<String>,
    pub charge: Option<String>,
    pub transfer: Option<String>,
    pub refund: Option<String>,
}

/// Ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// Gross amount.
    pub amount: Decimal,
    pub platform_fee: Decimal,
    /// Always `amount - platform_fee`.
    pub net_amount: Decimal,
    pub currency: String,
    pub from_user_id: Option<UserId>,
    pub to_user_id: Option<UserId>,
    pub service_details: ServiceDetails,
    pub gateway_refs: GatewayRefs,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Direction of this transaction from `user_id`'s point of view. A
    /// self-transaction counts as received.
    pub fn direction_for(&self, user_id: UserId) -> Direction {
        if self.to_user_id == Some(user_id) {
            Direction::Received
        } else {
            Direction::Sent
        }
    }
}

/// Transaction annotated with its direction relative to the queried user.
#[derive(Debug, Clone, Serialize)]
pub struct TaggedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub direction: Direction,
}

impl TaggedTransaction {
    pub fn new(transaction: Transaction, user_id: UserId) -> Self {
        let direction = transaction.direction_for(user_id);
        Self {
            transaction,
            direction,
        }
    }
}

/// Input for creating a transaction. Missing numeric fields are treated as
/// zero and rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub to_user_id: Option<UserId>,
    pub service_type: Option<String>,
    pub hours: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub service_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

/// Admin decision on a pending withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalAction {
    Approve,
    Reject,
}

impl WithdrawalAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approve" => Some(WithdrawalAction::Approve),
            "reject" => Some(WithdrawalAction::Reject),
            _ => None,
        }
    }
}

/// Optional filters for transaction listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_transaction(from: Option<UserId>, to: Option<UserId>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            kind: TransactionKind::Payment,
            status: TransactionStatus::Pending,
            amount: dec!(45.00),
            platform_fee: dec!(4.50),
            net_amount: dec!(40.50),
            currency: "EUR".to_string(),
            from_user_id: from,
            to_user_id: to,
            service_details: ServiceDetails::default(),
            gateway_refs: GatewayRefs::default(),
            description: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn kind_and_status_round_trip_through_strings() {
        for kind in [
            TransactionKind::Payment,
            TransactionKind::Withdrawal,
            TransactionKind::Refund,
            TransactionKind::Commission,
        ] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
            TransactionStatus::Cancelled,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TransactionKind::parse("donation"), None);
        assert_eq!(TransactionStatus::parse("archived"), None);
    }

    #[test]
    fn direction_is_relative_to_the_queried_user() {
        let tx = sample_transaction(Some(1), Some(2));
        assert_eq!(tx.direction_for(2), Direction::Received);
        assert_eq!(tx.direction_for(1), Direction::Sent);
    }

    #[test]
    fn self_transaction_counts_as_received() {
        let tx = sample_transaction(Some(7), Some(7));
        assert_eq!(tx.direction_for(7), Direction::Received);
    }

    #[test]
    fn only_payments_and_commissions_carry_the_fee() {
        assert!(TransactionKind::Payment.carries_fee());
        assert!(TransactionKind::Commission.carries_fee());
        assert!(!TransactionKind::Withdrawal.carries_fee());
        assert!(!TransactionKind::Refund.carries_fee());
    }

    #[test]
    fn transaction_kind_serializes_as_type_on_the_wire() {
        let tx = sample_transaction(Some(1), Some(2));
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "payment");
        assert_eq!(json["status"], "pending");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn tagged_transaction_flattens_with_a_direction_field() {
        let tx = sample_transaction(Some(1), Some(2));
        let tagged = TaggedTransaction::new(tx, 2);
        let json = serde_json::to_value(&tagged).unwrap();
        assert_eq!(json["direction"], "received");
        assert_eq!(json["type"], "payment");
    }

    #[test]
    fn new_transaction_tolerates_missing_fields() {
        let input: NewTransaction = serde_json::from_str("{}").unwrap();
        assert!(input.kind.is_none());
        assert!(input.hours.is_none());

        let input: NewTransaction =
            serde_json::from_str(r#"{"toUserId": 2, "hours": 3, "hourlyRate": 15}"#).unwrap();
        assert_eq!(input.to_user_id, Some(2));
        assert_eq!(input.hours, Some(dec!(3)));
        assert_eq!(input.hourly_rate, Some(dec!(15)));
    }

    #[test]
    fn withdrawal_action_parses_known_values_only() {
        assert_eq!(WithdrawalAction::parse("approve"), Some(WithdrawalAction::Approve));
        assert_eq!(WithdrawalAction::parse("reject"), Some(WithdrawalAction::Reject));
        assert_eq!(WithdrawalAction::parse("defer"), None);
    }
}
