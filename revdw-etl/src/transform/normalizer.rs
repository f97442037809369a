//! Review record normalization
//!
//! Raw records become typed [`NormalizedRecord`]s. Unparsable fields degrade
//! to defaults; a record is only rejected when it duplicates an earlier
//! (author, body) pair or when either date is missing or out of range.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use super::fields;
use crate::models::NormalizedRecord;
use crate::source::RawRecord;

/// Earliest accepted review or flown year
pub const MIN_REVIEW_YEAR: i32 = 2000;

const DEFAULT_AUTHOR: &str = "Anonymous";
const DEFAULT_LOCATION: &str = "Unknown";
const DEFAULT_TITLE: &str = "No Title";
const DEFAULT_BODY: &str = "No Content";
const DEFAULT_ATTRIBUTE: &str = "Unknown";

/// Counters for one normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub input: usize,
    /// Later records repeating an (author name, review body) pair
    pub duplicates: usize,
    /// Review date or flown date missing or unparsable
    pub missing_dates: usize,
    /// A date outside the accepted year range
    pub out_of_range: usize,
    /// Fields in surviving records that fell back to a default
    pub degraded_fields: usize,
    pub output: usize,
}

impl NormalizeStats {
    pub fn rejected(&self) -> usize {
        self.duplicates + self.missing_dates + self.out_of_range
    }
}

/// Normalized records plus the counters explaining what was dropped
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<NormalizedRecord>,
    pub stats: NormalizeStats,
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    current_year: i32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Normalizer whose range filter ends at next year (wall clock)
    pub fn new() -> Self {
        Self::for_year(revdw_common::time::current_year())
    }

    /// Normalizer pinned to a given current year
    pub fn for_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Years a review or flown date may fall in
    pub fn accepted_years(&self) -> RangeInclusive<i32> {
        MIN_REVIEW_YEAR..=self.current_year + 1
    }

    /// Clean, deduplicate and range-filter records, preserving input order
    pub fn normalize(&self, raw_records: &[RawRecord]) -> Normalized {
        let mut stats = NormalizeStats {
            input: raw_records.len(),
            ..NormalizeStats::default()
        };
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut records = Vec::with_capacity(raw_records.len());
        let years = self.accepted_years();

        for (idx, raw) in raw_records.iter().enumerate() {
            let author_name = fields::text(raw.get(fields::AUTHOR_NAME));
            let review_text = fields::text(raw.get(fields::REVIEW_TEXT));

            let identity = (
                author_name.clone().unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
                review_text.clone().unwrap_or_else(|| DEFAULT_BODY.to_string()),
            );
            if !seen.insert(identity) {
                debug!(record = idx, "Dropping duplicate review");
                stats.duplicates += 1;
                continue;
            }

            let review_date = fields::text(raw.get(fields::REVIEW_DATE))
                .and_then(|v| fields::parse_date(&v));
            let date_flown = fields::text(raw.get(fields::DATE_FLOWN))
                .and_then(|v| fields::parse_flown_date(&v));

            let (Some(review_date), Some(date_flown)) = (review_date, date_flown) else {
                debug!(record = idx, "Dropping review with missing or unparsable date");
                stats.missing_dates += 1;
                continue;
            };

            if !in_range(&years, review_date) || !in_range(&years, date_flown) {
                debug!(
                    record = idx,
                    review_date = %review_date,
                    date_flown = %date_flown,
                    "Dropping review dated outside accepted range"
                );
                stats.out_of_range += 1;
                continue;
            }

            let mut cleaner = FieldCleaner {
                raw,
                degraded: 0,
            };
            let record = NormalizedRecord {
                author_name: cleaner.or_default(author_name, DEFAULT_AUTHOR),
                author_location: fields::strip_parentheses(
                    &cleaner.text(fields::AUTHOR_LOCATION, DEFAULT_LOCATION),
                ),
                review_date,
                date_flown,
                review_title: fields::strip_quotes(&cleaner.text(fields::REVIEW_TITLE, DEFAULT_TITLE)),
                review_text: cleaner.or_default(review_text, DEFAULT_BODY),
                type_of_traveller: cleaner.text(fields::TYPE_OF_TRAVELLER, DEFAULT_ATTRIBUTE),
                seat_type: cleaner.text(fields::SEAT_TYPE, DEFAULT_ATTRIBUTE),
                route: cleaner.text(fields::ROUTE, DEFAULT_ATTRIBUTE),
                rating: cleaner.rating(),
                seat_comfort: cleaner.stars(fields::SEAT_COMFORT),
                cabin_staff_service: cleaner.stars(fields::CABIN_STAFF_SERVICE),
                food_beverages: cleaner.stars(fields::FOOD_BEVERAGES),
                inflight_entertainment: cleaner.stars(fields::INFLIGHT_ENTERTAINMENT),
                ground_service: cleaner.stars(fields::GROUND_SERVICE),
                value_for_money: cleaner.stars(fields::VALUE_FOR_MONEY),
                recommended_service: fields::recommended(raw.get(fields::RECOMMENDED_SERVICE)),
            };

            stats.degraded_fields += cleaner.degraded;
            records.push(record);
        }

        stats.output = records.len();
        info!(
            input = stats.input,
            duplicates = stats.duplicates,
            missing_dates = stats.missing_dates,
            out_of_range = stats.out_of_range,
            degraded_fields = stats.degraded_fields,
            "Removed {} invalid/duplicate records, {} remain",
            stats.rejected(),
            stats.output
        );

        Normalized { records, stats }
    }
}

fn in_range(years: &RangeInclusive<i32>, date: NaiveDate) -> bool {
    years.contains(&date.year())
}

/// Per-record field reader that counts every fallback to a default
struct FieldCleaner<'a> {
    raw: &'a RawRecord,
    degraded: usize,
}

impl FieldCleaner<'_> {
    fn or_default(&mut self, value: Option<String>, default: &str) -> String {
        value.unwrap_or_else(|| {
            self.degraded += 1;
            default.to_string()
        })
    }

    fn text(&mut self, field: &str, default: &str) -> String {
        let value = fields::text(self.raw.get(field));
        self.or_default(value, default)
    }

    fn rating(&mut self) -> f64 {
        fields::number(self.raw.get(fields::RATING)).unwrap_or_else(|| {
            self.degraded += 1;
            0.0
        })
    }

    fn stars(&mut self, field: &str) -> i64 {
        fields::star_rating(self.raw.get(field)).unwrap_or_else(|| {
            self.degraded += 1;
            0
        })
    }
}
