//! Shared fixtures for revdw-etl integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use revdw_common::db::{open_memory_warehouse, seed_date_dimension};
use revdw_etl::source::RawRecord;
use revdw_etl::NormalizedRecord;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory warehouse with dim_date covering 2023
pub async fn seeded_warehouse() -> SqlitePool {
    let pool = open_memory_warehouse().await.unwrap();
    {
        let mut conn = pool.acquire().await.unwrap();
        seed_date_dimension(&mut conn, day(2023, 1, 1), day(2023, 12, 31))
            .await
            .unwrap();
    }
    pool
}

/// A cleaned review flown and reviewed in 2023
pub fn review(author: &str, route: &str, review_date: NaiveDate) -> NormalizedRecord {
    NormalizedRecord {
        author_name: author.to_string(),
        author_location: "United Kingdom".to_string(),
        review_date,
        date_flown: day(2023, 1, 1),
        review_title: format!("{} on {}", author, route),
        review_text: format!("{} flew {}", author, route),
        type_of_traveller: "Solo Leisure".to_string(),
        seat_type: "Economy Class".to_string(),
        route: route.to_string(),
        rating: 7.0,
        seat_comfort: 3,
        cabin_staff_service: 4,
        food_beverages: 2,
        inflight_entertainment: 0,
        ground_service: 3,
        value_for_money: 4,
        recommended_service: true,
    }
}

/// A raw scraped review as it would arrive from a feed
pub fn raw_review(author: &str, body: &str, review_date: &str, date_flown: &str) -> RawRecord {
    let value = json!({
        "AuthorName": author,
        "AuthorLocation": "(Canada)",
        "ReviewDate": review_date,
        "DateFlown": date_flown,
        "ReviewTitle": "\"Good flight\"",
        "ReviewText": body,
        "TypeOfTraveller": "Business",
        "SeatType": "Business Class",
        "Route": "London to Toronto",
        "Rating": "8",
        "SeatComfort": "4",
        "CabinStaffService": "5",
        "FoodBeverages": "4",
        "InflightEntertainment": "3",
        "GroundService": "4",
        "ValueForMoney": "3",
        "RecommendedService": "yes"
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// (status, records_loaded) of every audit row, oldest first
pub async fn batch_rows(pool: &SqlitePool) -> Vec<(String, i64)> {
    sqlx::query_as("SELECT status, records_loaded FROM audit_etl_batch ORDER BY batch_id")
        .fetch_all(pool)
        .await
        .unwrap()
}

/// Run a DDL statement (triggers, drops) against the warehouse
pub async fn execute(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql).execute(pool).await.unwrap();
}
