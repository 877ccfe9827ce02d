//! Store error types.

use pixgen_models::Credits;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The conditional debit did not apply: the balance at evaluation
    /// time was below the requested amount.
    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: Credits, available: Credits },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A persisted row failed to decode into its domain type.
    #[error("corrupt row: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_insufficient_credits(&self) -> bool {
        matches!(self, StoreError::InsufficientCredits { .. })
    }

    /// Whether the underlying database reported a unique-constraint hit
    /// (duplicate provider request id).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}
