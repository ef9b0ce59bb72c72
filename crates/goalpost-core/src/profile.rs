//! User profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A user profile with its cached credit balance.
///
/// `balance_minutes` is a projection of the user's transaction history and is
/// only mutated by the storage layer's compound ledger operations. It never
/// goes negative: a failed consumption leaves it untouched, and a session
/// stop clamps its charge to whatever balance remains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user ID.
    pub user_id: UserId,

    /// Display name.
    pub username: String,

    /// Contact email.
    pub email: String,

    /// Current credit balance. 1 credit = 1 minute of open session time.
    pub balance_minutes: i64,

    /// When the profile was created.
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Create a new profile with zero balance.
    #[must_use]
    pub fn new(user_id: UserId, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username,
            email,
            balance_minutes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the balance covers a deduction of `amount_minutes`.
    #[must_use]
    pub const fn has_balance_for(&self, amount_minutes: i64) -> bool {
        self.balance_minutes >= amount_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_has_zero_balance() {
        let profile = UserProfile::new(UserId::generate(), "eli".into(), "eli@example.com".into());
        assert_eq!(profile.balance_minutes, 0);
    }

    #[test]
    fn balance_check_is_inclusive() {
        let mut profile =
            UserProfile::new(UserId::generate(), "eli".into(), "eli@example.com".into());
        profile.balance_minutes = 10;

        assert!(profile.has_balance_for(5));
        assert!(profile.has_balance_for(10));
        assert!(!profile.has_balance_for(11));
    }
}
