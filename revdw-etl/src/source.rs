//! Raw record feeds
//!
//! A feed yields untyped review records one page at a time. Fetching,
//! pagination against the origin, retries and rate limiting all belong to the
//! feed; the transform stage only sees [`RawRecord`]s.

use revdw_common::{Error, Result};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One scraped review: field name -> string/number
pub type RawRecord = Map<String, Value>;

/// Source of raw review records, consumed page by page
pub trait SourceFeed {
    /// Next page of records, `None` when the feed is exhausted
    fn next_page(&mut self) -> Result<Option<Vec<RawRecord>>>;
}

/// Drain a feed in page order
pub fn collect_records<F: SourceFeed + ?Sized>(feed: &mut F) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut pages = 0usize;

    while let Some(page) = feed.next_page()? {
        pages += 1;
        debug!(page = pages, records = page.len(), "Fetched page");
        records.extend(page);
    }

    info!(pages, records = records.len(), "Collected raw records");
    Ok(records)
}

/// Pre-built pages held in memory
#[derive(Debug, Default)]
pub struct MemoryFeed {
    pages: VecDeque<Vec<RawRecord>>,
}

impl MemoryFeed {
    pub fn new(pages: Vec<Vec<RawRecord>>) -> Self {
        Self {
            pages: pages.into(),
        }
    }

    /// Single page holding every record
    pub fn single_page(records: Vec<RawRecord>) -> Self {
        Self::new(vec![records])
    }
}

impl SourceFeed for MemoryFeed {
    fn next_page(&mut self) -> Result<Option<Vec<RawRecord>>> {
        Ok(self.pages.pop_front())
    }
}

/// Records read from a JSON array or JSON-lines file
///
/// The file is parsed on the first call to `next_page`, then served in pages
/// of `page_size` records.
#[derive(Debug)]
pub struct JsonFileFeed {
    path: PathBuf,
    page_size: usize,
    pending: Option<VecDeque<RawRecord>>,
}

impl JsonFileFeed {
    pub fn new(path: impl Into<PathBuf>, page_size: usize) -> Self {
        Self {
            path: path.into(),
            page_size: page_size.max(1),
            pending: None,
        }
    }

    fn load(&self) -> Result<VecDeque<RawRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        let records = parse_records(&content, &self.path)?;
        info!(path = %self.path.display(), records = records.len(), "Read source file");
        Ok(records.into())
    }
}

impl SourceFeed for JsonFileFeed {
    fn next_page(&mut self) -> Result<Option<Vec<RawRecord>>> {
        if self.pending.is_none() {
            self.pending = Some(self.load()?);
        }

        let Some(pending) = self.pending.as_mut() else {
            return Ok(None);
        };
        if pending.is_empty() {
            return Ok(None);
        }

        let take = self.page_size.min(pending.len());
        Ok(Some(pending.drain(..take).collect()))
    }
}

/// Parse either a top-level JSON array or one JSON object per line
fn parse_records(content: &str, path: &Path) -> Result<Vec<RawRecord>> {
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed).map_err(|e| {
            Error::InvalidInput(format!("{}: invalid JSON array: {}", path.display(), e))
        })?;
        return values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| into_record(value, path, idx + 1))
            .collect();
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let value: Value = serde_json::from_str(line).map_err(|e| {
                Error::InvalidInput(format!("{} line {}: {}", path.display(), idx + 1, e))
            })?;
            into_record(value, path, idx + 1)
        })
        .collect()
}

fn into_record(value: Value, path: &Path, position: usize) -> Result<RawRecord> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidInput(format!(
            "{} entry {}: expected an object, found {}",
            path.display(),
            position,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
