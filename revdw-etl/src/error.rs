//! Fatal load errors
//!
//! Field- and record-level problems never surface here; they degrade to
//! defaults or are counted. Every variant below ends the batch.

use thiserror::Error;

/// Result type for load stage operations
pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Debug, Error)]
pub enum LoadError {
    /// Could not obtain or keep the store connection
    #[error("Store connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Batch cannot start, e.g. the date dimension is empty
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Audit row for the batch could not be created
    #[error("Failed to start ETL batch: {0}")]
    BatchStart(#[source] sqlx::Error),

    /// Store error while reading or writing a dimension
    #[error("Dimension load failed for {table}: {source}")]
    DimensionLoad {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Dimension rows were expected but none were inserted
    #[error("No rows loaded into {table} ({expected} expected)")]
    DimensionEmpty { table: &'static str, expected: usize },

    /// Every record failed key resolution (or there were none)
    #[error("No fact rows assembled ({skipped} records skipped)")]
    NoFacts { skipped: usize },

    /// Store error while inserting fact rows
    #[error("Fact load failed: {0}")]
    FactLoad(#[source] sqlx::Error),

    /// Begin, commit or rollback failed
    #[error("Transaction failed: {0}")]
    Transaction(#[source] sqlx::Error),

    /// Final status of the audit row could not be written
    #[error("Audit update failed for batch {batch_id}: {source}")]
    Audit {
        batch_id: i64,
        #[source]
        source: sqlx::Error,
    },
}
