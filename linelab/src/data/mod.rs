//! Core spectroscopic data structures: line tables, cross-sections, bands.

mod bands;
mod select;
mod table;
mod xsc;

pub use bands::{band_index, Band, Bands};
pub use select::{select, Condition, SelectOptions};
pub use table::{Column, Table, TableHeader};
pub use xsc::{parse_xsc, CrossSection, CrossSectionMeta, XscParseError};

use thiserror::Error;

/// Errors raised when reading typed data out of a table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// Table is not present in the cache
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// A required column is missing from the table
    #[error("table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    /// A column holds the wrong kind of values for the operation
    #[error("column '{column}' does not hold {expected} values")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Columns passed to a table constructor differ in length
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A select was asked to write to an unnamed destination
    #[error("destination table name is empty")]
    EmptyDestination,
}
