//! Warehouse initialization
//!
//! Opens the SQLite warehouse and creates the star schema if it is missing.
//! Statements are idempotent; existing tables are left untouched.

use crate::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the warehouse file and ensure the schema exists
pub async fn init_warehouse(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // A batch holds one connection for its whole lifetime; the rest serve
    // schema bootstrap and inspection.
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new warehouse: {}", db_path.display());
    } else {
        info!("Opened existing warehouse: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory warehouse with the full schema
///
/// Every pooled connection to `sqlite::memory:` gets its own database, so the
/// pool is capped at one connection that never expires.
pub async fn open_memory_warehouse() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every warehouse table that does not exist yet
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_author_table(pool).await?;
    create_flight_details_table(pool).await?;
    create_date_table(pool).await?;
    create_batch_table(pool).await?;
    create_fact_table(pool).await?;
    Ok(())
}

async fn create_author_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_author (
            author_id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_name TEXT NOT NULL,
            author_location TEXT,
            created_date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_flight_details_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_flight_details (
            flight_detail_id INTEGER PRIMARY KEY AUTOINCREMENT,
            seat_type TEXT,
            route TEXT,
            type_of_traveller TEXT,
            created_date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            is_current INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_date_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_date (
            date_key INTEGER PRIMARY KEY,
            full_date TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_batch_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_etl_batch (
            batch_id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_system TEXT NOT NULL,
            batch_start_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            batch_end_time TIMESTAMP,
            status TEXT NOT NULL DEFAULT 'Running'
                CHECK (status IN ('Running', 'Completed', 'Failed')),
            records_loaded INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_fact_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fact_reviews (
            review_id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER NOT NULL REFERENCES dim_author(author_id),
            flight_detail_id INTEGER NOT NULL REFERENCES dim_flight_details(flight_detail_id),
            review_date_key INTEGER NOT NULL REFERENCES dim_date(date_key),
            date_flown_key INTEGER REFERENCES dim_date(date_key),
            rating REAL NOT NULL DEFAULT 0,
            review_title TEXT,
            review_text TEXT,
            seat_comfort INTEGER,
            cabin_staff_service INTEGER,
            food_beverages INTEGER,
            inflight_entertainment INTEGER,
            ground_service INTEGER,
            value_for_money INTEGER,
            recommended_service INTEGER NOT NULL DEFAULT 0,
            load_date TIMESTAMP NOT NULL,
            source_system TEXT NOT NULL,
            batch_id INTEGER NOT NULL REFERENCES audit_etl_batch(batch_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_warehouse_has_all_tables() {
        let pool = open_memory_warehouse().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "audit_etl_batch",
                "dim_author",
                "dim_date",
                "dim_flight_details",
                "fact_reviews",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_schema_is_idempotent() {
        let pool = open_memory_warehouse().await.unwrap();
        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_batch_status_is_constrained() {
        let pool = open_memory_warehouse().await.unwrap();

        let result = sqlx::query(
            "INSERT INTO audit_etl_batch (source_system, status) VALUES ('x', 'Paused')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "Unknown batch status should be rejected");
    }
}
