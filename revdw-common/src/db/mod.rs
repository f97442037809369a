//! Warehouse connection, schema bootstrap and date dimension helpers

pub mod dates;
pub mod init;

pub use dates::*;
pub use init::*;

/// Author dimension (logical `dim.Author`)
pub const AUTHOR_TABLE: &str = "dim_author";
/// Flight details dimension (logical `dim.FlightDetails`)
pub const FLIGHT_TABLE: &str = "dim_flight_details";
/// Calendar dimension (logical `dim.Date`), populated outside the batch
pub const DATE_TABLE: &str = "dim_date";
