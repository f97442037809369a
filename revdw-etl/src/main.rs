//! revdw-etl - load scraped airline reviews into the review warehouse

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revdw_common::config::EtlConfig;
use revdw_common::db::{init_warehouse, seed_date_dimension};
use revdw_etl::run_pipeline;
use revdw_etl::source::JsonFileFeed;

/// Command-line arguments for revdw-etl
#[derive(Parser, Debug)]
#[command(name = "revdw-etl")]
#[command(about = "Review warehouse ETL loader")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite warehouse file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Raw review records (JSON array or JSON lines)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Folder for the intermediate CSV snapshots
    #[arg(short, long)]
    output_folder: Option<PathBuf>,

    /// Source system tag for the audit and fact rows
    #[arg(short, long)]
    source_system: Option<String>,

    /// Skip writing the intermediate CSV snapshots
    #[arg(long)]
    no_artifacts: bool,

    /// Create the warehouse schema and exit
    #[arg(long)]
    init_schema: bool,

    /// Populate dim_date for an inclusive range, e.g. 2015-01-01:2026-12-31
    #[arg(long, value_name = "FROM:TO", value_parser = parse_date_range)]
    seed_dates: Option<(NaiveDate, NaiveDate)>,
}

impl Args {
    fn apply_to(&self, config: &mut EtlConfig) {
        if let Some(path) = &self.database {
            config.database_path = path.clone();
        }
        if let Some(folder) = &self.output_folder {
            config.output_folder = folder.clone();
        }
        if let Some(source) = &self.source_system {
            config.source_system = source.clone();
        }
        if self.no_artifacts {
            config.write_artifacts = false;
        }
    }
}

fn parse_date_range(value: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", value))?;
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{}': {}", s, e))
    };
    Ok((parse(from)?, parse(to)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = EtlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting revdw-etl v{}", env!("CARGO_PKG_VERSION"));
    info!("Warehouse: {}", config.database_path.display());

    let pool = init_warehouse(&config.database_path)
        .await
        .context("Failed to open warehouse")?;

    if let Some((from, to)) = args.seed_dates {
        let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
        let inserted = seed_date_dimension(&mut conn, from, to)
            .await
            .context("Failed to seed date dimension")?;
        info!("Seeded {} dates between {} and {}", inserted, from, to);
    }

    if args.init_schema {
        info!("Warehouse schema ready");
        pool.close().await;
        return Ok(());
    }

    let Some(input) = args.input.as_ref() else {
        if args.seed_dates.is_some() {
            pool.close().await;
            return Ok(());
        }
        bail!("--input is required unless --init-schema or --seed-dates is given");
    };

    let mut feed = JsonFileFeed::new(input, config.page_size);
    let outcome = run_pipeline(&pool, &mut feed, &config).await;
    pool.close().await;

    match outcome {
        Ok(summary) => {
            info!(
                batch_id = summary.batch.batch_id,
                extracted = summary.extracted,
                rejected = summary.normalize.rejected(),
                facts = summary.batch.facts_inserted,
                skipped = summary.batch.facts_skipped,
                "Run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!("ETL pipeline failed: {:#}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_range() {
        let (from, to) = parse_date_range("2020-01-01:2020-12-31").unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());

        assert!(parse_date_range("2020-01-01").is_err());
        assert!(parse_date_range("2020-01-01:soon").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "revdw-etl",
            "--database",
            "/tmp/w.db",
            "--source-system",
            "Feed2",
            "--no-artifacts",
        ]);
        let mut config = EtlConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.database_path, PathBuf::from("/tmp/w.db"));
        assert_eq!(config.source_system, "Feed2");
        assert!(!config.write_artifacts);
        assert_eq!(config.output_folder, PathBuf::from("output"));
    }
}
