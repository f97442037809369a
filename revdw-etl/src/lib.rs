//! revdw-etl - review warehouse transform and load
//!
//! Cleans scraped review records and loads them into the star schema
//! (author and flight dimensions, review facts) as one audited batch.
//!
//! Stages:
//! - [`source`]: raw record feeds
//! - [`transform`]: normalization, load planning, intermediate artifacts
//! - [`load`]: dimension resolution and loading, fact assembly, batch coordination
//! - [`pipeline`]: end-to-end runner used by the binary

pub mod error;
pub mod load;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod transform;

pub use error::{LoadError, LoadResult};
pub use load::BatchCoordinator;
pub use models::{BatchReport, BatchStatus, NormalizedRecord};
pub use pipeline::{run_pipeline, PipelineSummary};
pub use transform::{LoadPlan, Normalizer};
