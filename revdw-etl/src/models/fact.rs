//! Review fact rows and per-record assembly outcomes

use chrono::{DateTime, Utc};

/// One insertable `fact_reviews` row
///
/// Only produced when author, flight and review-date keys all resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub author_id: i64,
    pub flight_detail_id: i64,
    pub review_date_key: i64,
    /// Unresolved flown dates become a NULL foreign key
    pub date_flown_key: Option<i64>,
    pub rating: f64,
    pub review_title: String,
    pub review_text: String,
    pub seat_comfort: i64,
    pub cabin_staff_service: i64,
    pub food_beverages: i64,
    pub inflight_entertainment: i64,
    pub ground_service: i64,
    pub value_for_money: i64,
    pub recommended_service: bool,
    pub load_date: DateTime<Utc>,
    pub source_system: String,
    pub batch_id: i64,
}

/// Why a record produced no fact row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownAuthor,
    UnknownFlight,
    UnknownReviewDate,
}

/// Per-record assembly result
#[derive(Debug, Clone, PartialEq)]
pub enum FactMatch {
    Matched(FactRow),
    Skipped(SkipReason),
}

/// Skipped records broken down by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub unknown_author: usize,
    pub unknown_flight: usize,
    pub unknown_review_date: usize,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::UnknownAuthor => self.unknown_author += 1,
            SkipReason::UnknownFlight => self.unknown_flight += 1,
            SkipReason::UnknownReviewDate => self.unknown_review_date += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unknown_author + self.unknown_flight + self.unknown_review_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_counts_total() {
        let mut counts = SkipCounts::default();
        counts.record(SkipReason::UnknownAuthor);
        counts.record(SkipReason::UnknownAuthor);
        counts.record(SkipReason::UnknownReviewDate);

        assert_eq!(counts.unknown_author, 2);
        assert_eq!(counts.unknown_flight, 0);
        assert_eq!(counts.unknown_review_date, 1);
        assert_eq!(counts.total(), 3);
    }
}
