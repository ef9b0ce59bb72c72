//! Credit ledger operations.

use std::sync::Arc;

use goalpost_core::{CreditTransaction, UserId, UserProfile};
use goalpost_store::{LedgerReceipt, Store, StoreError};

use crate::error::{EngineError, Result};

/// Validates and applies credit balance mutations.
///
/// One credit buys one minute of session time. Amounts are always positive
/// at this boundary; the ledger records consumptions as negative entries.
pub struct CreditLedger {
    store: Arc<dyn Store>,
}

impl CreditLedger {
    /// Create a ledger over the shared store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Grant `amount_minutes` credits to a user.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidAmount`] for non-positive amounts and
    /// [`StoreError::NotFound`] for unknown users.
    pub fn grant(
        &self,
        user_id: &UserId,
        amount_minutes: i64,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerReceipt> {
        if amount_minutes <= 0 {
            return Err(EngineError::InvalidAmount {
                amount: amount_minutes,
            });
        }

        let receipt = self
            .store
            .add_credits(user_id, amount_minutes, description, reference)?;

        tracing::info!(
            user_id = %user_id,
            amount_minutes,
            new_balance = receipt.new_balance_minutes,
            "credits granted"
        );
        Ok(receipt)
    }

    /// Consume `amount_minutes` credits, refusing to overdraw.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidAmount`] for non-positive amounts,
    /// [`StoreError::InsufficientBalance`] when the balance cannot cover the
    /// amount (no ledger entry is written in that case).
    pub fn consume(
        &self,
        user_id: &UserId,
        amount_minutes: i64,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerReceipt> {
        if amount_minutes <= 0 {
            return Err(EngineError::InvalidAmount {
                amount: amount_minutes,
            });
        }

        let receipt = self
            .store
            .consume_credits(user_id, amount_minutes, description, reference)?;

        tracing::info!(
            user_id = %user_id,
            amount_minutes,
            new_balance = receipt.new_balance_minutes,
            "credits consumed"
        );
        Ok(receipt)
    }

    /// Current balance in minutes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown users.
    pub fn balance(&self, user_id: &UserId) -> Result<i64> {
        let profile = self.profile(user_id)?;
        Ok(profile.balance_minutes)
    }

    /// Transaction history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown users.
    pub fn history(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>> {
        // Distinguish "no transactions" from "no such user".
        self.profile(user_id)?;
        Ok(self.store.list_transactions_by_user(user_id, limit, offset)?)
    }

    fn profile(&self, user_id: &UserId) -> Result<UserProfile> {
        self.store
            .get_profile(user_id)?
            .ok_or(EngineError::Store(StoreError::NotFound {
                entity: "profile",
                id: user_id.to_string(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalpost_store::RocksStore;
    use tempfile::TempDir;

    fn create_ledger() -> (CreditLedger, Arc<RocksStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        (CreditLedger::new(store.clone()), store, dir)
    }

    fn seed_user(store: &RocksStore) -> UserId {
        let user_id = UserId::generate();
        let profile = UserProfile::new(user_id, "test".into(), "t@example.com".into());
        store.put_profile(&profile).unwrap();
        user_id
    }

    #[test]
    fn grant_rejects_non_positive_amounts() {
        let (ledger, store, _dir) = create_ledger();
        let user_id = seed_user(&store);

        for amount in [0, -5] {
            let result = ledger.grant(&user_id, amount, "bad", None);
            assert!(matches!(result, Err(EngineError::InvalidAmount { .. })));
        }
        assert_eq!(ledger.balance(&user_id).unwrap(), 0);
    }

    #[test]
    fn grant_then_consume() {
        let (ledger, store, _dir) = create_ledger();
        let user_id = seed_user(&store);

        ledger.grant(&user_id, 60, "hour pack", None).unwrap();
        let receipt = ledger.consume(&user_id, 25, "session", None).unwrap();
        assert_eq!(receipt.new_balance_minutes, 35);
        assert_eq!(ledger.balance(&user_id).unwrap(), 35);
    }

    #[test]
    fn consume_refuses_overdraw() {
        let (ledger, store, _dir) = create_ledger();
        let user_id = seed_user(&store);
        ledger.grant(&user_id, 5, "small", None).unwrap();

        let result = ledger.consume(&user_id, 6, "too much", None);
        assert!(matches!(
            result,
            Err(EngineError::Store(StoreError::InsufficientBalance { .. }))
        ));
        assert_eq!(ledger.balance(&user_id).unwrap(), 5);
    }

    #[test]
    fn history_for_unknown_user_is_not_found() {
        let (ledger, _store, _dir) = create_ledger();
        let result = ledger.history(&UserId::generate(), 10, 0);
        assert!(matches!(
            result,
            Err(EngineError::Store(StoreError::NotFound { .. }))
        ));
    }
}
