//! Normalized review record

use chrono::NaiveDate;
use serde::Serialize;

/// A cleaned review, ready for dimension planning and fact assembly
///
/// Both dates are required and lie within the accepted year range; records
/// that fail either check never become a `NormalizedRecord`. Serializes with
/// the warehouse's column names for the intermediate CSV snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NormalizedRecord {
    pub author_name: String,
    /// Parentheses stripped
    pub author_location: String,
    pub review_date: NaiveDate,
    pub date_flown: NaiveDate,
    /// Quote characters stripped
    pub review_title: String,
    pub review_text: String,
    pub type_of_traveller: String,
    pub seat_type: String,
    pub route: String,
    /// Overall rating, 0.0 when unparsable
    pub rating: f64,
    // Star ratings, each in 0..=5
    pub seat_comfort: i64,
    pub cabin_staff_service: i64,
    pub food_beverages: i64,
    pub inflight_entertainment: i64,
    pub ground_service: i64,
    pub value_for_money: i64,
    pub recommended_service: bool,
}
