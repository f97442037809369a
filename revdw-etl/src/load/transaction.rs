//! Scoped data transaction
//!
//! Wraps a sqlx transaction so a batch body has exactly one exit path:
//! commit when the body returned `Ok`, roll back and hand the error back
//! otherwise. Dropping the scope without finishing also rolls back.

use sqlx::{Connection, Sqlite, SqliteConnection, Transaction};
use tracing::{debug, error, info};

use crate::error::{LoadError, LoadResult};

pub struct ScopedTransaction<'c> {
    tx: Transaction<'c, Sqlite>,
}

impl<'c> ScopedTransaction<'c> {
    pub async fn begin(conn: &'c mut SqliteConnection) -> LoadResult<Self> {
        let tx = conn.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            LoadError::Transaction(e)
        })?;
        debug!("Transaction started");
        Ok(Self { tx })
    }

    /// Connection bound to the open transaction
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commit on `Ok`, roll back on `Err`, returning the body's outcome
    pub async fn finish<T>(self, outcome: LoadResult<T>) -> LoadResult<T> {
        match outcome {
            Ok(value) => {
                self.tx.commit().await.map_err(|e| {
                    error!("Transaction commit failed: {}", e);
                    LoadError::Transaction(e)
                })?;
                info!("Transaction committed successfully");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.tx.rollback().await {
                    error!("Transaction rollback failed: {}", rollback_err);
                }
                error!("Transaction rolled back due to error: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revdw_common::db::open_memory_warehouse;

    async fn author_count(conn: &mut SqliteConnection) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM dim_author")
            .fetch_one(conn)
            .await
            .unwrap()
    }

    async fn insert_author(conn: &mut SqliteConnection) -> LoadResult<()> {
        sqlx::query("INSERT INTO dim_author (author_name) VALUES ('Alice')")
            .execute(conn)
            .await
            .map_err(LoadError::FactLoad)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_ok_outcome_commits() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let mut scope = ScopedTransaction::begin(&mut conn).await.unwrap();
        let outcome = insert_author(scope.conn()).await.map(|_| 42);
        assert_eq!(scope.finish(outcome).await.unwrap(), 42);

        assert_eq!(author_count(&mut conn).await, 1);
    }

    #[tokio::test]
    async fn test_err_outcome_rolls_back_earlier_writes() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let mut scope = ScopedTransaction::begin(&mut conn).await.unwrap();
        insert_author(scope.conn()).await.unwrap();
        let outcome: LoadResult<()> = Err(LoadError::NoFacts { skipped: 1 });
        let err = scope.finish(outcome).await.unwrap_err();

        assert!(matches!(err, LoadError::NoFacts { skipped: 1 }));
        assert_eq!(author_count(&mut conn).await, 0);
    }

    #[tokio::test]
    async fn test_dropped_scope_rolls_back() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        {
            let mut scope = ScopedTransaction::begin(&mut conn).await.unwrap();
            insert_author(scope.conn()).await.unwrap();
        }

        assert_eq!(author_count(&mut conn).await, 0);
    }
}
