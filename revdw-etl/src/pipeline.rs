//! End-to-end run: extract, normalize, stage, load

use anyhow::{bail, Context, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::load::BatchCoordinator;
use crate::models::BatchReport;
use crate::source::{collect_records, SourceFeed};
use crate::transform::{save_intermediate_data, ArtifactPaths, LoadPlan, NormalizeStats, Normalizer};
use revdw_common::config::EtlConfig;

/// What one pipeline run did
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub extracted: usize,
    pub normalize: NormalizeStats,
    /// `None` when artifacts are disabled
    pub artifacts: Option<ArtifactPaths>,
    pub batch: BatchReport,
}

/// Run the pipeline with a wall-clock normalizer
pub async fn run_pipeline<F: SourceFeed + ?Sized>(
    pool: &SqlitePool,
    feed: &mut F,
    config: &EtlConfig,
) -> Result<PipelineSummary> {
    run_pipeline_with(pool, feed, config, &Normalizer::new()).await
}

/// Run the pipeline with a caller-supplied normalizer
pub async fn run_pipeline_with<F: SourceFeed + ?Sized>(
    pool: &SqlitePool,
    feed: &mut F,
    config: &EtlConfig,
    normalizer: &Normalizer,
) -> Result<PipelineSummary> {
    info!("Starting data extraction");
    let raw = collect_records(feed).context("Extraction failed")?;
    if raw.is_empty() {
        bail!("No data extracted. Exiting");
    }
    info!("Extraction complete: {} records", raw.len());

    let normalized = normalizer.normalize(&raw);
    if normalized.records.is_empty() {
        warn!(
            rejected = normalized.stats.rejected(),
            "No records survived normalization"
        );
    }
    let plan = LoadPlan::prepare(normalized.records);
    info!(
        authors = plan.authors.len(),
        flights = plan.flights.len(),
        facts = plan.facts.len(),
        "Transformation complete"
    );

    let artifacts = if config.write_artifacts {
        let paths = save_intermediate_data(&plan, &config.output_folder)
            .context("Failed to save intermediate data")?;
        Some(paths)
    } else {
        None
    };

    let coordinator = BatchCoordinator::from_config(config);
    let batch = coordinator
        .run(pool, &plan)
        .await
        .context("Warehouse load failed")?;

    info!(
        batch_id = batch.batch_id,
        facts = batch.facts_inserted,
        skipped = batch.facts_skipped,
        "ETL pipeline completed successfully"
    );

    Ok(PipelineSummary {
        extracted: raw.len(),
        normalize: normalized.stats,
        artifacts,
        batch,
    })
}
