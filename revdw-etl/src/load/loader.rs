//! Dimension loading
//!
//! Inserts candidate rows whose natural key is not yet in the store. The
//! existing keys are read once at the start of the call; candidates are not
//! checked against each other (the load plan already made them distinct).

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{error, info};

use super::resolver::build_dimension_map;
use crate::error::{LoadError, LoadResult};
use crate::models::Dimension;

/// Counts from one dimension load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionLoadReport {
    pub table: &'static str,
    pub candidates: usize,
    /// Candidates whose key was missing from the store snapshot
    pub expected: usize,
    pub inserted: usize,
}

impl DimensionLoadReport {
    pub fn already_present(&self) -> usize {
        self.candidates - self.expected
    }

    /// New rows were expected but fewer were written
    pub fn is_short(&self) -> bool {
        self.inserted < self.expected
    }
}

/// Insert unseen candidates, stamped with the current time
pub async fn load_dimension<D: Dimension>(
    conn: &mut SqliteConnection,
    candidates: &[D],
) -> LoadResult<DimensionLoadReport> {
    load_dimension_at(conn, candidates, revdw_common::time::now()).await
}

/// Insert unseen candidates in input order with the given created timestamp
///
/// Any store error aborts the whole load; rows already inserted by this call
/// are only discarded if the caller rolls back its transaction.
pub async fn load_dimension_at<D: Dimension>(
    conn: &mut SqliteConnection,
    candidates: &[D],
    created_date: DateTime<Utc>,
) -> LoadResult<DimensionLoadReport> {
    let existing = build_dimension_map::<D>(conn).await.map_err(|source| {
        error!("Error reading existing keys from {}: {}", D::TABLE, source);
        LoadError::DimensionLoad {
            table: D::TABLE,
            source,
        }
    })?;

    let mut report = DimensionLoadReport {
        table: D::TABLE,
        candidates: candidates.len(),
        expected: 0,
        inserted: 0,
    };

    for row in candidates {
        if existing.contains_key(&row.natural_key()) {
            continue;
        }
        report.expected += 1;

        row.insert_query(created_date)
            .execute(&mut *conn)
            .await
            .map_err(|source| {
                error!("Error loading dimension {}: {}", D::TABLE, source);
                LoadError::DimensionLoad {
                    table: D::TABLE,
                    source,
                }
            })?;
        report.inserted += 1;
    }

    info!(
        table = D::TABLE,
        candidates = report.candidates,
        already_present = report.already_present(),
        "Inserted {} new records into {}",
        report.inserted,
        D::TABLE
    );

    Ok(report)
}
