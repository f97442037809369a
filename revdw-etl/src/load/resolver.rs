//! Dimension key resolution
//!
//! Builds natural key -> surrogate key maps from the store. The maps are
//! snapshots: taken once per batch stage and never refreshed, which is only
//! correct while no other writer touches the dimensions.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlx::{Row, SqliteConnection};
use tracing::{debug, warn};

use crate::error::{LoadError, LoadResult};
use crate::models::{AuthorDimensionRow, Dimension, FlightDimensionRow};

/// Stand-in for a NULL natural key component
pub const NULL_SENTINEL: &str = "NULL";

/// Stringified natural key
///
/// Every component is rendered as text and a missing component becomes the
/// literal [`NULL_SENTINEL`], so multi-column keys with gaps still compare
/// equal between the store snapshot and incoming records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey(Vec<String>);

impl NaturalKey {
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self(
            parts
                .into_iter()
                .map(|part| part.unwrap_or(NULL_SENTINEL).to_string())
                .collect(),
        )
    }

    /// Author key: name only
    pub fn author(author_name: &str) -> Self {
        Self::from_parts([Some(author_name)])
    }

    /// Flight key: (seat type, route, traveller type)
    pub fn flight(seat_type: &str, route: &str, type_of_traveller: &str) -> Self {
        Self::from_parts([Some(seat_type), Some(route), Some(type_of_traveller)])
    }
}

/// Natural key -> surrogate key
pub type NaturalKeyMap = HashMap<NaturalKey, i64>;

/// Calendar date -> date key
pub type DateKeyMap = HashMap<NaiveDate, i64>;

/// Read `key_column` and the natural key columns of every row in `table`
///
/// Table and column names are interpolated and must come from trusted
/// constants such as [`Dimension::TABLE`].
pub async fn build_natural_key_map(
    conn: &mut SqliteConnection,
    table: &str,
    key_column: &str,
    natural_key_columns: &[&str],
) -> Result<NaturalKeyMap, sqlx::Error> {
    let columns: Vec<String> = natural_key_columns
        .iter()
        .map(|column| format!("CAST({column} AS TEXT)"))
        .collect();
    let query = format!("SELECT {}, {} FROM {}", columns.join(", "), key_column, table);

    let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
    let key_index = natural_key_columns.len();

    let mut map = NaturalKeyMap::with_capacity(rows.len());
    for row in rows {
        let mut parts = Vec::with_capacity(key_index);
        for idx in 0..key_index {
            parts.push(row.try_get::<Option<String>, _>(idx)?);
        }
        let surrogate: i64 = row.try_get(key_index)?;
        map.insert(NaturalKey::from_parts(parts.iter().map(|p| p.as_deref())), surrogate);
    }

    debug!(table, entries = map.len(), "Built natural key map");
    Ok(map)
}

/// Natural key map for a typed dimension
pub async fn build_dimension_map<D: Dimension>(
    conn: &mut SqliteConnection,
) -> Result<NaturalKeyMap, sqlx::Error> {
    build_natural_key_map(conn, D::TABLE, D::SURROGATE_KEY, D::NATURAL_KEY_COLUMNS).await
}

/// Calendar date -> date key for every row of `dim_date`
///
/// `full_date` may be stored as a native date or as text (plain date or a
/// timestamp). Rows whose date cannot be read are skipped with a warning.
pub async fn build_date_map(conn: &mut SqliteConnection) -> Result<DateKeyMap, sqlx::Error> {
    let rows = sqlx::query("SELECT full_date, date_key FROM dim_date")
        .fetch_all(&mut *conn)
        .await?;

    let mut map = DateKeyMap::with_capacity(rows.len());
    let mut unreadable = 0usize;

    for row in rows {
        let date_key: i64 = row.try_get(1)?;
        let full_date = match row.try_get::<NaiveDate, _>(0) {
            Ok(date) => Some(date),
            Err(_) => row
                .try_get::<String, _>(0)
                .ok()
                .and_then(|text| parse_stored_date(&text)),
        };

        match full_date {
            Some(date) => {
                map.insert(date, date_key);
            }
            None => unreadable += 1,
        }
    }

    if unreadable > 0 {
        warn!(unreadable, "Skipped date dimension rows with unreadable full_date");
    }
    debug!(entries = map.len(), "Built date map");
    Ok(map)
}

/// Date from a stored text value: `YYYY-MM-DD`, with or without a time part
fn parse_stored_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// Read-only key maps for one batch
#[derive(Debug, Clone, Default)]
pub struct DimensionSnapshot {
    pub authors: NaturalKeyMap,
    pub flights: NaturalKeyMap,
    pub dates: DateKeyMap,
}

impl DimensionSnapshot {
    /// Capture all three maps
    pub async fn capture(conn: &mut SqliteConnection) -> LoadResult<Self> {
        let authors = build_dimension_map::<AuthorDimensionRow>(conn)
            .await
            .map_err(|source| LoadError::DimensionLoad {
                table: AuthorDimensionRow::TABLE,
                source,
            })?;
        let flights = build_dimension_map::<FlightDimensionRow>(conn)
            .await
            .map_err(|source| LoadError::DimensionLoad {
                table: FlightDimensionRow::TABLE,
                source,
            })?;
        let dates = build_date_map(conn)
            .await
            .map_err(|source| LoadError::DimensionLoad {
                table: revdw_common::db::DATE_TABLE,
                source,
            })?;

        Ok(Self {
            authors,
            flights,
            dates,
        })
    }
}
