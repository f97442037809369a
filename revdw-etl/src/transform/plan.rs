//! Load planning: dimension candidates and fact-ready records

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::load::NaturalKey;
use crate::models::{AuthorDimensionRow, Dimension, FlightDimensionRow, NormalizedRecord};

/// Everything one batch loads
///
/// Dimension candidates are distinct by natural key (first occurrence wins),
/// so the loader only has to check them against the store.
#[derive(Debug, Clone, Default)]
pub struct LoadPlan {
    pub authors: Vec<AuthorDimensionRow>,
    pub flights: Vec<FlightDimensionRow>,
    pub facts: Vec<NormalizedRecord>,
}

impl LoadPlan {
    pub fn prepare(records: Vec<NormalizedRecord>) -> Self {
        Self::prepare_at(records, revdw_common::time::now())
    }

    pub fn prepare_at(records: Vec<NormalizedRecord>, created_date: DateTime<Utc>) -> Self {
        let authors = distinct_by_key(records.iter().map(|r| AuthorDimensionRow {
            author_name: r.author_name.clone(),
            author_location: r.author_location.clone(),
            created_date,
            is_active: true,
        }));
        info!("Prepared {} author dimension records", authors.len());

        let flights = distinct_by_key(records.iter().map(|r| FlightDimensionRow {
            seat_type: r.seat_type.clone(),
            route: r.route.clone(),
            type_of_traveller: r.type_of_traveller.clone(),
            created_date,
            is_current: true,
        }));
        info!("Prepared {} flight details dimension records", flights.len());

        Self {
            authors,
            flights,
            facts: records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

fn distinct_by_key<D: Dimension>(rows: impl Iterator<Item = D>) -> Vec<D> {
    let mut seen: HashSet<NaturalKey> = HashSet::new();
    rows.filter(|row| seen.insert(row.natural_key())).collect()
}
