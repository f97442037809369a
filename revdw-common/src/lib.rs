//! # revdw Common Library
//!
//! Shared code for the review data warehouse loader:
//! - Error and result types
//! - Configuration loading (TOML, environment, defaults)
//! - Warehouse connection and schema bootstrap
//! - Date dimension seeding
//! - Time helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
