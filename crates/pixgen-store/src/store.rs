//! Pool construction and migrations.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::info;

use crate::{
    CreditLedger, GeneratedImageRepository, PackRepository, StoreError, TrainedModelRepository,
};

/// Handle to the SQLite database, shared across the application.
///
/// Cloning is cheap; all clones share the same connection pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database at `url` and run migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!().run(&pool).await?;
        info!(url, "database ready");

        Ok(Self { pool })
    }

    /// In-memory database for tests.
    ///
    /// A single connection is used so every caller sees the same memory
    /// database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap connectivity check for readiness probes.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Begin a transaction for operations that must commit as one unit.
    pub async fn begin(&self) -> Result<Transaction<'_, Sqlite>, StoreError> {
        Ok(self.pool.begin().await?)
    }

    pub fn ledger(&self) -> CreditLedger {
        CreditLedger::new(self.pool.clone())
    }

    pub fn models(&self) -> TrainedModelRepository {
        TrainedModelRepository::new(self.pool.clone())
    }

    pub fn images(&self) -> GeneratedImageRepository {
        GeneratedImageRepository::new(self.pool.clone())
    }

    pub fn packs(&self) -> PackRepository {
        PackRepository::new(self.pool.clone())
    }
}
