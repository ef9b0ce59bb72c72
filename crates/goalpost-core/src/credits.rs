//! Credit transaction types.
//!
//! Every balance change creates a transaction record. The sum of signed
//! amounts for a user, starting from zero, equals the current balance at all
//! times; the cached balance on the profile is derived from this ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TransactionId, UserId};

/// An immutable ledger entry explaining one balance change.
///
/// Transactions use ULIDs for time-ordered IDs, so a user's history lists
/// chronologically without a secondary sort key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Amount in credit-minutes. Positive = purchase, negative = consumption.
    pub amount_minutes: i64,

    /// Kind of transaction.
    pub kind: TransactionKind,

    /// Balance after this transaction (in minutes).
    pub balance_after_minutes: i64,

    /// Human-readable description.
    pub description: String,

    /// Optional external reference (payment reference, session ID, etc.).
    pub reference: Option<String>,

    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    /// Create a purchase transaction. Admin credit grants are also recorded
    /// through this constructor; they are ledger entries like any other.
    #[must_use]
    pub fn purchase(
        user_id: UserId,
        amount_minutes: i64,
        balance_after_minutes: i64,
        description: String,
        reference: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            amount_minutes: amount_minutes.abs(),
            kind: TransactionKind::Purchase,
            balance_after_minutes,
            description,
            reference,
            created_at: Utc::now(),
        }
    }

    /// Create a consumption transaction. The stored amount is always
    /// negative regardless of the sign passed in.
    #[must_use]
    pub fn consumption(
        user_id: UserId,
        amount_minutes: i64,
        balance_after_minutes: i64,
        description: String,
        reference: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            amount_minutes: -amount_minutes.abs(),
            kind: TransactionKind::Consumption,
            balance_after_minutes,
            description,
            reference,
            created_at: Utc::now(),
        }
    }
}

/// Kind of credit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Credits added (purchase or admin grant).
    Purchase,

    /// Credits deducted for session usage.
    Consumption,
}

impl TransactionKind {
    /// Whether this kind adds credits.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Purchase)
    }

    /// Whether this kind removes credits.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Consumption)
    }
}
