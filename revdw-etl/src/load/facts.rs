//! Fact assembly and insertion
//!
//! Matching is strict on author, flight and review date: a review without
//! those anchors cannot be placed in the star schema and is skipped. The
//! flown date is informational, so a miss only leaves its key NULL.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, error, info, warn};

use super::resolver::{DimensionSnapshot, NaturalKey};
use crate::error::{LoadError, LoadResult};
use crate::models::{FactMatch, FactRow, NormalizedRecord, SkipCounts, SkipReason};

/// Batch-level values copied onto every fact row
#[derive(Debug, Clone)]
pub struct FactStamp {
    pub batch_id: i64,
    pub source_system: String,
    pub load_date: DateTime<Utc>,
}

/// Fact rows ready to insert, plus what was left behind
#[derive(Debug, Clone, Default)]
pub struct FactAssembly {
    pub rows: Vec<FactRow>,
    /// Rows assembled (equals `rows.len()`)
    pub inserted: usize,
    pub skipped: usize,
    pub skips: SkipCounts,
    /// Rows whose flown date had no date key
    pub flown_date_unresolved: usize,
}

/// Resolve the keys for one record
pub fn match_record(
    record: &NormalizedRecord,
    snapshot: &DimensionSnapshot,
    stamp: &FactStamp,
) -> FactMatch {
    let Some(&author_id) = snapshot.authors.get(&NaturalKey::author(&record.author_name)) else {
        return FactMatch::Skipped(SkipReason::UnknownAuthor);
    };

    let flight_key = NaturalKey::flight(&record.seat_type, &record.route, &record.type_of_traveller);
    let Some(&flight_detail_id) = snapshot.flights.get(&flight_key) else {
        return FactMatch::Skipped(SkipReason::UnknownFlight);
    };

    let Some(&review_date_key) = snapshot.dates.get(&record.review_date) else {
        return FactMatch::Skipped(SkipReason::UnknownReviewDate);
    };
    let date_flown_key = snapshot.dates.get(&record.date_flown).copied();

    FactMatch::Matched(FactRow {
        author_id,
        flight_detail_id,
        review_date_key,
        date_flown_key,
        rating: record.rating,
        review_title: record.review_title.clone(),
        review_text: record.review_text.clone(),
        seat_comfort: record.seat_comfort,
        cabin_staff_service: record.cabin_staff_service,
        food_beverages: record.food_beverages,
        inflight_entertainment: record.inflight_entertainment,
        ground_service: record.ground_service,
        value_for_money: record.value_for_money,
        recommended_service: record.recommended_service,
        load_date: stamp.load_date,
        source_system: stamp.source_system.clone(),
        batch_id: stamp.batch_id,
    })
}

/// Match every record against the snapshot, in input order
pub fn assemble_facts(
    records: &[NormalizedRecord],
    snapshot: &DimensionSnapshot,
    stamp: &FactStamp,
) -> FactAssembly {
    let mut assembly = FactAssembly::default();

    for (idx, record) in records.iter().enumerate() {
        match match_record(record, snapshot, stamp) {
            FactMatch::Matched(row) => {
                if row.date_flown_key.is_none() {
                    assembly.flown_date_unresolved += 1;
                }
                assembly.rows.push(row);
                assembly.inserted += 1;
            }
            FactMatch::Skipped(reason) => {
                debug!(record = idx, author = %record.author_name, ?reason, "Skipping review");
                assembly.skips.record(reason);
                assembly.skipped += 1;
            }
        }
    }

    if assembly.skipped > 0 {
        warn!(
            unknown_author = assembly.skips.unknown_author,
            unknown_flight = assembly.skips.unknown_flight,
            unknown_review_date = assembly.skips.unknown_review_date,
            "Skipped {} records due to matching issues",
            assembly.skipped
        );
    }
    if assembly.flown_date_unresolved > 0 {
        debug!(
            count = assembly.flown_date_unresolved,
            "Flown dates without a date key loaded as NULL"
        );
    }

    assembly
}

/// Insert assembled rows into `fact_reviews`
pub async fn insert_facts(conn: &mut SqliteConnection, rows: &[FactRow]) -> LoadResult<usize> {
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO fact_reviews (
                author_id, flight_detail_id, review_date_key, date_flown_key,
                rating, review_title, review_text, seat_comfort,
                cabin_staff_service, food_beverages, inflight_entertainment,
                ground_service, value_for_money, recommended_service,
                load_date, source_system, batch_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.author_id)
        .bind(row.flight_detail_id)
        .bind(row.review_date_key)
        .bind(row.date_flown_key)
        .bind(row.rating)
        .bind(&row.review_title)
        .bind(&row.review_text)
        .bind(row.seat_comfort)
        .bind(row.cabin_staff_service)
        .bind(row.food_beverages)
        .bind(row.inflight_entertainment)
        .bind(row.ground_service)
        .bind(row.value_for_money)
        .bind(row.recommended_service)
        .bind(row.load_date)
        .bind(&row.source_system)
        .bind(row.batch_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            error!("Error loading fact data: {}", e);
            LoadError::FactLoad(e)
        })?;
    }

    info!("Inserted {} fact records", rows.len());
    Ok(rows.len())
}
