//! Date dimension helpers
//!
//! `dim_date` is reference data. Batches only read it; these helpers exist for
//! bootstrap and for the empty-dimension precondition check.

use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use sqlx::{Connection, SqliteConnection};
use tracing::info;

/// Surrogate key for a calendar date: `YYYYMMDD`
pub fn date_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Number of rows in the date dimension
pub async fn verify_date_dimension(conn: &mut SqliteConnection) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dim_date")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Insert one row per day in `[from, to]`, skipping days already present
///
/// Returns the number of rows inserted.
pub async fn seed_date_dimension(
    conn: &mut SqliteConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<u64> {
    if from > to {
        return Err(Error::InvalidInput(format!(
            "Date range start {} is after end {}",
            from, to
        )));
    }

    let mut tx = conn.begin().await?;
    let mut inserted = 0u64;

    for day in from.iter_days().take_while(|d| *d <= to) {
        let result = sqlx::query("INSERT OR IGNORE INTO dim_date (date_key, full_date) VALUES (?, ?)")
            .bind(date_key(day))
            .bind(day)
            .execute(&mut *tx)
            .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;

    info!(from = %from, to = %to, inserted, "Seeded date dimension");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_warehouse;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_key_layout() {
        assert_eq!(date_key(ymd(2023, 3, 1)), 20230301);
        assert_eq!(date_key(ymd(2000, 12, 31)), 20001231);
    }

    #[tokio::test]
    async fn test_seed_counts_days_inclusive() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        assert_eq!(verify_date_dimension(&mut conn).await.unwrap(), 0);

        let inserted = seed_date_dimension(&mut conn, ymd(2024, 2, 27), ymd(2024, 3, 2))
            .await
            .unwrap();

        // 2024 is a leap year: 27, 28, 29 Feb + 1, 2 Mar
        assert_eq!(inserted, 5);
        assert_eq!(verify_date_dimension(&mut conn).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_seed_skips_existing_days() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        seed_date_dimension(&mut conn, ymd(2023, 1, 1), ymd(2023, 1, 10))
            .await
            .unwrap();
        let second = seed_date_dimension(&mut conn, ymd(2023, 1, 5), ymd(2023, 1, 15))
            .await
            .unwrap();

        assert_eq!(second, 5);
        assert_eq!(verify_date_dimension(&mut conn).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_seed_rejects_inverted_range() {
        let pool = open_memory_warehouse().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let err = seed_date_dimension(&mut conn, ymd(2024, 1, 2), ymd(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
