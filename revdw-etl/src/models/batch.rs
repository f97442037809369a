//! ETL batch audit state

use chrono::{DateTime, Utc};

use super::SkipCounts;

/// Batch lifecycle: `Running -> Completed | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Running,
    Completed,
    Failed,
}

impl BatchStatus {
    /// Value stored in `audit_etl_batch.status`
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Running => "Running",
            BatchStatus::Completed => "Completed",
            BatchStatus::Failed => "Failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Running" => Some(BatchStatus::Running),
            "Completed" => Some(BatchStatus::Completed),
            "Failed" => Some(BatchStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `audit_etl_batch` row
#[derive(Debug, Clone, PartialEq)]
pub struct EtlBatch {
    pub batch_id: i64,
    pub source_system: String,
    pub batch_start_time: DateTime<Utc>,
    pub batch_end_time: Option<DateTime<Utc>>,
    pub status: BatchStatus,
    pub records_loaded: i64,
}

/// Outcome of a committed batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub batch_id: i64,
    pub status: BatchStatus,
    pub authors_inserted: usize,
    pub flights_inserted: usize,
    pub facts_inserted: usize,
    pub facts_skipped: usize,
    pub skips: SkipCounts,
    /// Facts loaded with a NULL flown-date key
    pub flown_date_unresolved: usize,
}
