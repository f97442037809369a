//! Batch coordination
//!
//! One batch = one audit row plus one data transaction:
//!
//! 1. Verify the date dimension is populated (no audit row otherwise)
//! 2. Insert the audit row as `Running` and commit it on its own
//! 3. In a single transaction: load authors, load flights, assemble and
//!    insert facts. Any failure rolls the whole transaction back.
//! 4. Mark the audit row `Completed` (with the fact count) or `Failed`
//!    (with zero) in a separate statement, so the audit survives a rollback.
//!
//! Assumes a single writer: dimension snapshots are not refreshed mid-batch.

use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{error, info};

use super::facts::{assemble_facts, insert_facts, FactStamp};
use super::loader::{load_dimension, DimensionLoadReport};
use super::resolver::DimensionSnapshot;
use super::transaction::ScopedTransaction;
use crate::error::{LoadError, LoadResult};
use crate::models::{BatchReport, BatchStatus, EtlBatch};
use crate::transform::LoadPlan;
use revdw_common::config::EtlConfig;
use revdw_common::db::verify_date_dimension;

#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    source_system: String,
    require_new_dimension_rows: bool,
}

impl BatchCoordinator {
    pub fn new(source_system: impl Into<String>) -> Self {
        Self {
            source_system: source_system.into(),
            require_new_dimension_rows: false,
        }
    }

    pub fn from_config(config: &EtlConfig) -> Self {
        Self::new(config.source_system.clone())
            .require_new_dimension_rows(config.require_new_dimension_rows)
    }

    /// Fail when a dimension load inserts nothing, even if every candidate
    /// already existed
    pub fn require_new_dimension_rows(mut self, required: bool) -> Self {
        self.require_new_dimension_rows = required;
        self
    }

    pub fn source_system(&self) -> &str {
        &self.source_system
    }

    /// Run one batch on a connection acquired from `pool`
    ///
    /// The connection is held for the whole batch and released on return,
    /// whatever the outcome.
    pub async fn run(&self, pool: &SqlitePool, plan: &LoadPlan) -> LoadResult<BatchReport> {
        let mut conn = pool.acquire().await.map_err(|e| {
            error!("Connection error: {}", e);
            LoadError::Connection(e)
        })?;
        info!("Acquired warehouse connection");

        let result = self.run_on(&mut conn, plan).await;

        drop(conn);
        info!("Released warehouse connection");
        result
    }

    /// Run one batch on an existing connection (not inside a transaction)
    pub async fn run_on(
        &self,
        conn: &mut SqliteConnection,
        plan: &LoadPlan,
    ) -> LoadResult<BatchReport> {
        let date_count = verify_date_dimension(conn)
            .await
            .map_err(|e| LoadError::Precondition(format!("Error verifying date dimension: {}", e)))?;
        if date_count == 0 {
            error!("Date dimension is empty! Populate dim_date before loading");
            return Err(LoadError::Precondition("date dimension is empty".to_string()));
        }
        info!("Verified date dimension contains {} records", date_count);

        let batch_id = start_batch(conn, &self.source_system).await?;
        info!(batch_id, "Started ETL batch with ID: {}", batch_id);

        match self.load_batch(conn, batch_id, plan).await {
            Ok(report) => {
                let records_loaded = report.facts_inserted as i64;
                if let Err(audit_err) =
                    complete_batch(conn, batch_id, BatchStatus::Completed, records_loaded).await
                {
                    error!(
                        batch_id,
                        records_loaded,
                        "Data committed but batch could not be marked completed: {}",
                        audit_err
                    );
                    return Err(audit_err);
                }
                info!(
                    batch_id,
                    authors_inserted = report.authors_inserted,
                    flights_inserted = report.flights_inserted,
                    facts_skipped = report.facts_skipped,
                    "Successfully loaded {} fact records",
                    report.facts_inserted
                );
                Ok(report)
            }
            Err(err) => {
                error!(batch_id, "Error during warehouse load: {}", err);
                if let Err(audit_err) =
                    complete_batch(conn, batch_id, BatchStatus::Failed, 0).await
                {
                    error!(batch_id, "Error marking batch as failed: {}", audit_err);
                }
                Err(err)
            }
        }
    }

    async fn load_batch(
        &self,
        conn: &mut SqliteConnection,
        batch_id: i64,
        plan: &LoadPlan,
    ) -> LoadResult<BatchReport> {
        let mut scope = ScopedTransaction::begin(conn).await?;
        let outcome = self.load_in_transaction(scope.conn(), batch_id, plan).await;
        scope.finish(outcome).await
    }

    async fn load_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        batch_id: i64,
        plan: &LoadPlan,
    ) -> LoadResult<BatchReport> {
        let authors = load_dimension(conn, &plan.authors).await?;
        self.check_dimension(&authors)?;

        let flights = load_dimension(conn, &plan.flights).await?;
        self.check_dimension(&flights)?;

        let snapshot = DimensionSnapshot::capture(conn).await?;
        let stamp = FactStamp {
            batch_id,
            source_system: self.source_system.clone(),
            load_date: revdw_common::time::now(),
        };
        let assembly = assemble_facts(&plan.facts, &snapshot, &stamp);
        if assembly.inserted == 0 {
            return Err(LoadError::NoFacts {
                skipped: assembly.skipped,
            });
        }

        let facts_inserted = insert_facts(conn, &assembly.rows).await?;

        Ok(BatchReport {
            batch_id,
            status: BatchStatus::Completed,
            authors_inserted: authors.inserted,
            flights_inserted: flights.inserted,
            facts_inserted,
            facts_skipped: assembly.skipped,
            skips: assembly.skips,
            flown_date_unresolved: assembly.flown_date_unresolved,
        })
    }

    fn check_dimension(&self, report: &DimensionLoadReport) -> LoadResult<()> {
        let nothing_new = self.require_new_dimension_rows && report.inserted == 0;
        if report.is_short() || nothing_new {
            return Err(LoadError::DimensionEmpty {
                table: report.table,
                expected: report.expected,
            });
        }
        Ok(())
    }
}

/// Insert a `Running` audit row and return its batch id
pub async fn start_batch(conn: &mut SqliteConnection, source_system: &str) -> LoadResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_etl_batch (source_system, batch_start_time, status, records_loaded)
        VALUES (?, ?, ?, 0)
        "#,
    )
    .bind(source_system)
    .bind(revdw_common::time::now())
    .bind(BatchStatus::Running.as_str())
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        error!("Error starting ETL batch: {}", e);
        LoadError::BatchStart(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Set the terminal status, end time and loaded count of a batch
pub async fn complete_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
    status: BatchStatus,
    records_loaded: i64,
) -> LoadResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE audit_etl_batch
        SET batch_end_time = ?,
            status = ?,
            records_loaded = ?
        WHERE batch_id = ?
        "#,
    )
    .bind(revdw_common::time::now())
    .bind(status.as_str())
    .bind(records_loaded)
    .bind(batch_id)
    .execute(&mut *conn)
    .await
    .map_err(|source| LoadError::Audit { batch_id, source })?;

    if result.rows_affected() == 0 {
        return Err(LoadError::Audit {
            batch_id,
            source: sqlx::Error::RowNotFound,
        });
    }

    info!(batch_id, status = %status, records_loaded, "Updated ETL batch status");
    Ok(())
}

/// Load an audit row by id
pub async fn fetch_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<Option<EtlBatch>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT batch_id, source_system, batch_start_time, batch_end_time, status, records_loaded
        FROM audit_etl_batch
        WHERE batch_id = ?
        "#,
    )
    .bind(batch_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let status: String = row.try_get("status")?;
    let status = BatchStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: format!("unknown batch status '{}'", status).into(),
    })?;

    Ok(Some(EtlBatch {
        batch_id: row.try_get("batch_id")?,
        source_system: row.try_get("source_system")?,
        batch_start_time: row.try_get("batch_start_time")?,
        batch_end_time: row.try_get("batch_end_time")?,
        status,
        records_loaded: row.try_get("records_loaded")?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use revdw_common::db::open_memory_warehouse;

    #[tokio::test]
    async fn test_start_then_complete_batch() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let batch_id = start_batch(&mut conn, "WebScraper").await.unwrap();
        let running = fetch_batch(&mut conn, batch_id).await.unwrap().unwrap();
        assert_eq!(running.status, BatchStatus::Running);
        assert_eq!(running.source_system, "WebScraper");
        assert!(running.batch_end_time.is_none());

        complete_batch(&mut conn, batch_id, BatchStatus::Completed, 12)
            .await
            .unwrap();
        let done = fetch_batch(&mut conn, batch_id).await.unwrap().unwrap();
        assert_eq!(done.status, BatchStatus::Completed);
        assert_eq!(done.records_loaded, 12);
        assert!(done.batch_end_time.unwrap() >= done.batch_start_time);
    }

    #[tokio::test]
    async fn test_complete_unknown_batch_is_audit_error() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let err = complete_batch(&mut conn, 404, BatchStatus::Failed, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Audit { batch_id: 404, .. }));
    }

    #[tokio::test]
    async fn test_batch_ids_increase() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = start_batch(&mut conn, "a").await.unwrap();
        let second = start_batch(&mut conn, "b").await.unwrap();
        assert!(second > first);
        assert!(fetch_batch(&mut conn, second + 1).await.unwrap().is_none());
    }

    #[test]
    fn test_strict_mode_rejects_empty_dimension_load() {
        let report = DimensionLoadReport {
            table: "dim_author",
            candidates: 2,
            expected: 0,
            inserted: 0,
        };

        assert!(BatchCoordinator::new("x").check_dimension(&report).is_ok());
        assert!(matches!(
            BatchCoordinator::new("x")
                .require_new_dimension_rows(true)
                .check_dimension(&report),
            Err(LoadError::DimensionEmpty { table: "dim_author", expected: 0 })
        ));
    }
}
