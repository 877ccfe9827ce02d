//! Credit ledger with atomic compare-and-decrement semantics.
//!
//! The balance is the only contended mutable state in the system, so the
//! check and the decrement are one conditional `UPDATE`: concurrent
//! debits serialize at the storage layer and can never overdraw.

use chrono::Utc;
use pixgen_models::Credits;
use sqlx::sqlite::SqlitePool;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::StoreError;

/// Tracks and atomically adjusts per-account credit balances.
#[derive(Clone)]
pub struct CreditLedger {
    pool: SqlitePool,
}

impl CreditLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current balance; an account with no ledger row has balance 0.
    pub async fn get_balance(&self, user_id: &str) -> Result<Credits, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::balance_in(&mut conn, user_id).await
    }

    /// Atomically check `balance >= amount` and decrement by `amount`.
    ///
    /// Returns [`StoreError::InsufficientCredits`] without side effects
    /// when the balance at evaluation time is below `amount`.
    pub async fn try_debit(&self, user_id: &str, amount: Credits) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::debit_in(&mut conn, user_id, amount).await
    }

    /// Increase the balance, creating the ledger row if absent.
    ///
    /// Used for top-ups; also the compensation primitive should a refund
    /// path ever be wired up. Returns the new balance.
    pub async fn credit(&self, user_id: &str, amount: Credits) -> Result<Credits, StoreError> {
        if amount <= 0 {
            return self.get_balance(user_id).await;
        }
        let balance: Credits = sqlx::query_scalar(
            r#"
            INSERT INTO user_credits (user_id, balance, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE
                SET balance = balance + excluded.balance,
                    updated_at = excluded.updated_at
            RETURNING balance
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(user_id, amount, balance, "credited account");
        Ok(balance)
    }

    /// Balance read usable inside an open transaction.
    pub async fn balance_in(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> Result<Credits, StoreError> {
        let balance: Option<Credits> =
            sqlx::query_scalar("SELECT balance FROM user_credits WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(conn)
                .await?;
        Ok(balance.unwrap_or(0))
    }

    /// Conditional debit usable inside an open transaction, so the debit
    /// commits together with the rows it pays for.
    pub async fn debit_in(
        conn: &mut SqliteConnection,
        user_id: &str,
        amount: Credits,
    ) -> Result<(), StoreError> {
        if amount <= 0 {
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            UPDATE user_credits
            SET balance = balance - ?1, updated_at = ?2
            WHERE user_id = ?3 AND balance >= ?1
            "#,
        )
        .bind(amount)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            let available = Self::balance_in(conn, user_id).await?;
            return Err(StoreError::InsufficientCredits {
                needed: amount,
                available,
            });
        }

        debug!(user_id, amount, "debited account");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Store, StoreError};

    #[tokio::test]
    async fn test_absent_account_has_zero_balance() {
        let store = Store::in_memory().await.unwrap();
        assert_eq!(store.ledger().get_balance("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_debit_decrements_by_exact_amount() {
        let store = Store::in_memory().await.unwrap();
        let ledger = store.ledger();
        ledger.credit("u-1", 10).await.unwrap();

        ledger.try_debit("u-1", 3).await.unwrap();
        assert_eq!(ledger.get_balance("u-1").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_failed_debit_leaves_balance_unchanged() {
        let store = Store::in_memory().await.unwrap();
        let ledger = store.ledger();
        ledger.credit("u-1", 2).await.unwrap();

        let err = ledger.try_debit("u-1", 3).await.unwrap_err();
        match err {
            StoreError::InsufficientCredits { needed, available } => {
                assert_eq!(needed, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ledger.get_balance("u-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_debit_from_absent_account_is_insufficient() {
        let store = Store::in_memory().await.unwrap();
        assert!(store
            .ledger()
            .try_debit("ghost", 1)
            .await
            .unwrap_err()
            .is_insufficient_credits());
    }

    #[tokio::test]
    async fn test_concurrent_debits_cannot_double_spend() {
        let store = Store::in_memory().await.unwrap();
        let ledger = store.ledger();
        ledger.credit("u-1", 5).await.unwrap();

        // Balance of exactly 5, two racing debits of 5: exactly one may win.
        let a = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.try_debit("u-1", 5).await })
        };
        let b = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.try_debit("u-1", 5).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let losses = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_insufficient_credits()))
            .count();

        assert_eq!(wins, 1);
        assert_eq!(losses, 1);
        assert_eq!(ledger.get_balance("u-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_credit_tops_up_existing_balance() {
        let store = Store::in_memory().await.unwrap();
        let ledger = store.ledger();
        assert_eq!(ledger.credit("u-1", 4).await.unwrap(), 4);
        assert_eq!(ledger.credit("u-1", 6).await.unwrap(), 10);
    }
}
