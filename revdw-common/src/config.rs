//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (applied by the binary, highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Overrides `database_path`
pub const ENV_DATABASE: &str = "REVDW_DATABASE";
/// Overrides `source_system`
pub const ENV_SOURCE_SYSTEM: &str = "REVDW_SOURCE_SYSTEM";
/// Overrides `output_folder`
pub const ENV_OUTPUT_FOLDER: &str = "REVDW_OUTPUT_FOLDER";

/// Source system tag written to the audit table and every fact row
pub const DEFAULT_SOURCE_SYSTEM: &str = "WebScraper";

/// ETL run configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EtlConfig {
    /// SQLite warehouse file
    pub database_path: PathBuf,
    /// Tag recorded in `audit_etl_batch.source_system` and `fact_reviews.source_system`
    pub source_system: String,
    /// Folder for the intermediate CSV snapshots
    pub output_folder: PathBuf,
    /// Write the intermediate CSV snapshots before loading
    pub write_artifacts: bool,
    /// Records per page when reading a file feed
    pub page_size: usize,
    /// Fail the batch when either dimension load inserts no rows at all
    pub require_new_dimension_rows: bool,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            source_system: DEFAULT_SOURCE_SYSTEM.to_string(),
            output_folder: PathBuf::from("output"),
            write_artifacts: true,
            page_size: 100,
            require_new_dimension_rows: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl EtlConfig {
    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Resolve configuration from TOML, environment and defaults
    ///
    /// An explicit `config_path` must exist. Without one, the platform config
    /// file is used when present and silently skipped otherwise.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => match default_config_file() {
                Some(path) => {
                    info!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                None => {
                    debug!("No config file found, using compiled defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply REVDW_* environment variables over the current values
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = env_value(ENV_DATABASE) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(source) = env_value(ENV_SOURCE_SYSTEM) {
            self.source_system = source;
        }
        if let Some(folder) = env_value(ENV_OUTPUT_FOLDER) {
            self.output_folder = PathBuf::from(folder);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_system.trim().is_empty() {
            return Err(Error::Config("source_system must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Platform config file (~/.config/revdw/config.toml on Linux), if it exists
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("revdw").join("config.toml"))
        .filter(|p| p.exists())
}

/// OS-dependent default warehouse location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("revdw").join("warehouse.db"))
        .unwrap_or_else(|| PathBuf::from("./revdw_data/warehouse.db"))
}
