//! Dimension rows and their table bindings

use crate::load::NaturalKey;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// A row type that belongs to one dimension table
///
/// Ties the table name, surrogate key column and natural key columns to the
/// Rust type so the resolver and loader never take loose column strings.
pub trait Dimension {
    /// Physical table name
    const TABLE: &'static str;
    /// Store-assigned surrogate key column
    const SURROGATE_KEY: &'static str;
    /// Columns forming the natural key, in [`NaturalKey`] order
    const NATURAL_KEY_COLUMNS: &'static [&'static str];

    /// Natural key of this row, encoded the same way the resolver reads it back
    fn natural_key(&self) -> NaturalKey;

    /// Parameterized INSERT for this row, stamped with `created_date`
    fn insert_query(&self, created_date: DateTime<Utc>) -> Query<'_, Sqlite, SqliteArguments<'_>>;
}

/// Candidate row for `dim_author`; natural key = author name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorDimensionRow {
    pub author_name: String,
    pub author_location: String,
    pub created_date: DateTime<Utc>,
    pub is_active: bool,
}

impl Dimension for AuthorDimensionRow {
    const TABLE: &'static str = revdw_common::db::AUTHOR_TABLE;
    const SURROGATE_KEY: &'static str = "author_id";
    const NATURAL_KEY_COLUMNS: &'static [&'static str] = &["author_name"];

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::author(&self.author_name)
    }

    fn insert_query(&self, created_date: DateTime<Utc>) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            r#"
            INSERT INTO dim_author (author_name, author_location, created_date, is_active)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&self.author_name)
        .bind(&self.author_location)
        .bind(created_date)
        .bind(self.is_active)
    }
}

/// Candidate row for `dim_flight_details`; natural key = (seat type, route, traveller type)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlightDimensionRow {
    pub seat_type: String,
    pub route: String,
    pub type_of_traveller: String,
    pub created_date: DateTime<Utc>,
    pub is_current: bool,
}

impl Dimension for FlightDimensionRow {
    const TABLE: &'static str = revdw_common::db::FLIGHT_TABLE;
    const SURROGATE_KEY: &'static str = "flight_detail_id";
    const NATURAL_KEY_COLUMNS: &'static [&'static str] = &["seat_type", "route", "type_of_traveller"];

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::flight(&self.seat_type, &self.route, &self.type_of_traveller)
    }

    fn insert_query(&self, created_date: DateTime<Utc>) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            r#"
            INSERT INTO dim_flight_details (seat_type, route, type_of_traveller, created_date, is_current)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.seat_type)
        .bind(&self.route)
        .bind(&self.type_of_traveller)
        .bind(created_date)
        .bind(self.is_current)
    }
}
