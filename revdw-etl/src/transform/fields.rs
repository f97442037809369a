//! Raw field names and lenient value coercion
//!
//! Every helper returns `None` instead of failing; the normalizer decides
//! which default applies.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const AUTHOR_NAME: &str = "AuthorName";
pub const AUTHOR_LOCATION: &str = "AuthorLocation";
pub const REVIEW_DATE: &str = "ReviewDate";
pub const DATE_FLOWN: &str = "DateFlown";
pub const REVIEW_TITLE: &str = "ReviewTitle";
pub const REVIEW_TEXT: &str = "ReviewText";
pub const TYPE_OF_TRAVELLER: &str = "TypeOfTraveller";
pub const SEAT_TYPE: &str = "SeatType";
pub const ROUTE: &str = "Route";
pub const RATING: &str = "Rating";
pub const SEAT_COMFORT: &str = "SeatComfort";
pub const CABIN_STAFF_SERVICE: &str = "CabinStaffService";
pub const FOOD_BEVERAGES: &str = "FoodBeverages";
pub const INFLIGHT_ENTERTAINMENT: &str = "InflightEntertainment";
pub const GROUND_SERVICE: &str = "GroundService";
pub const VALUE_FOR_MONEY: &str = "ValueForMoney";
pub const RECOMMENDED_SERVICE: &str = "RecommendedService";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

/// Trimmed text; `None` for missing, null or blank values
pub fn text(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// Finite number from a JSON number or numeric string
pub fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Whole-star rating in 0..=5
pub fn star_rating(value: Option<&Value>) -> Option<i64> {
    number(value)
        .filter(|n| (0.0..=5.0).contains(n))
        .map(|n| n.trunc() as i64)
}

/// YES / Y (any case) -> true, everything else -> false
pub fn recommended(value: Option<&Value>) -> bool {
    text(value)
        .map(|v| matches!(v.to_uppercase().as_str(), "YES" | "Y"))
        .unwrap_or(false)
}

/// Remove straight and curly double quotes
pub fn strip_quotes(value: &str) -> String {
    value.replace(['"', '\u{201C}', '\u{201D}'], "").trim().to_string()
}

/// Remove parentheses
pub fn strip_parentheses(value: &str) -> String {
    value.replace(['(', ')'], "").trim().to_string()
}

/// Lenient calendar date parsing
///
/// Accepts RFC 3339, ISO dates with or without a time part, `YYYY/MM/DD`,
/// `MM/DD/YYYY`, `19th March 2024` and `March 19, 2024`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    let cleaned = strip_ordinal_suffixes(value);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

/// Flown date: a two-token value must be "Month Year" (first of the month);
/// anything else goes through the general date formats
pub fn parse_flown_date(value: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if let [month, year] = tokens.as_slice() {
        let month_year = format!("1 {} {}", month, year);
        return NaiveDate::parse_from_str(&month_year, "%d %B %Y").ok();
    }
    parse_date(value)
}

/// "19th" -> "19", "19th," -> "19,", leaving non-numeric tokens alone
fn strip_ordinal_suffixes(value: &str) -> String {
    value
        .split_whitespace()
        .map(|token| {
            let word = token.trim_end_matches(|c: char| c.is_ascii_punctuation());
            let trailing = &token[word.len()..];
            for suffix in ["st", "nd", "rd", "th"] {
                if let Some(digits) = word.strip_suffix(suffix) {
                    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                        return format!("{}{}", digits, trailing);
                    }
                }
            }
            token.to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(text(Some(&json!("  Economy Class "))), Some("Economy Class".to_string()));
        assert_eq!(text(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(text(Some(&json!("   "))), None);
        assert_eq!(text(Some(&Value::Null)), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn test_number_rejects_garbage_and_non_finite() {
        assert_eq!(number(Some(&json!("4.5"))), Some(4.5));
        assert_eq!(number(Some(&json!(8))), Some(8.0));
        assert_eq!(number(Some(&json!("n/a"))), None);
        assert_eq!(number(Some(&json!("NaN"))), None);
        assert_eq!(number(Some(&json!("inf"))), None);
        assert_eq!(number(Some(&json!(true))), None);
    }

    #[test]
    fn test_star_rating_bounds() {
        assert_eq!(star_rating(Some(&json!(0))), Some(0));
        assert_eq!(star_rating(Some(&json!("5"))), Some(5));
        assert_eq!(star_rating(Some(&json!(3.9))), Some(3));
        assert_eq!(star_rating(Some(&json!(6))), None);
        assert_eq!(star_rating(Some(&json!(-1))), None);
    }

    #[test]
    fn test_recommended_flag() {
        for yes in ["yes", "YES", "y", " Y "] {
            assert!(recommended(Some(&json!(yes))), "{yes} should be true");
        }
        for no in ["no", "N", "maybe", ""] {
            assert!(!recommended(Some(&json!(no))), "{no} should be false");
        }
        assert!(!recommended(None));
        assert!(!recommended(Some(&json!(true))));
    }

    #[test]
    fn test_strip_helpers() {
        assert_eq!(strip_quotes("\u{201C}Great flight\u{201D}"), "Great flight");
        assert_eq!(strip_quotes("\"ok\" service"), "ok service");
        assert_eq!(strip_parentheses("(United Kingdom)"), "United Kingdom");
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2023-01-01"), Some(ymd(2023, 1, 1)));
        assert_eq!(parse_date("2023-01-01 08:30:00"), Some(ymd(2023, 1, 1)));
        assert_eq!(parse_date("2023-01-01T08:30:00+02:00"), Some(ymd(2023, 1, 1)));
        assert_eq!(parse_date("2023/06/15"), Some(ymd(2023, 6, 15)));
        assert_eq!(parse_date("06/15/2023"), Some(ymd(2023, 6, 15)));
        assert_eq!(parse_date("19th March 2024"), Some(ymd(2024, 3, 19)));
        assert_eq!(parse_date("1st May 2022"), Some(ymd(2022, 5, 1)));
        assert_eq!(parse_date("March 19, 2024"), Some(ymd(2024, 3, 19)));
        assert_eq!(parse_date("March 19th, 2024"), Some(ymd(2024, 3, 19)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_flown_date_month_year() {
        assert_eq!(parse_flown_date("March 2023"), Some(ymd(2023, 3, 1)));
        assert_eq!(parse_flown_date("Dec 2019"), Some(ymd(2019, 12, 1)));
        assert_eq!(parse_flown_date("2023-03-14"), Some(ymd(2023, 3, 14)));
        assert_eq!(parse_flown_date("Smarch 2023"), None);
    }

    #[test]
    fn test_two_token_flown_date_must_be_month_year() {
        assert_eq!(parse_flown_date("2023-03-14 10:00:00"), None);
        assert_eq!(parse_flown_date("14 2023"), None);
        assert_eq!(parse_flown_date("14th March 2023"), Some(ymd(2023, 3, 14)));
    }
}
