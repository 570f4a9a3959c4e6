//! Line tables: named sets of spectral line records with a shared column layout.

use super::DataError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header of a line table: row count plus column order.
///
/// The order vector drives serialization and display; `data` lookups go
/// through the column map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHeader {
    /// Number of line records in the table.
    pub number_of_rows: usize,
    /// Column names in their original order.
    pub order: Vec<String>,
}

/// One column of a line table.
///
/// HITRAN-style records mix numeric parameters (`nu`, `sw`, broadening
/// coefficients) with textual ones (quantum-state strings), so columns are
/// typed at the container level rather than parsed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values")]
pub enum Column {
    /// Numeric parameter values, one per line record.
    Float(Vec<f64>),
    /// Textual parameter values, one per line record.
    Text(Vec<String>),
}

impl Column {
    /// Number of rows in this column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Whether the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The numeric values, if this is a float column.
    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Column::Float(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// The textual values, if this is a text column.
    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Column::Float(_) => None,
            Column::Text(v) => Some(v),
        }
    }
}

/// A cached set of spectral line records.
///
/// All columns have the same length, equal to `header.number_of_rows`; the
/// constructor enforces this. Tables are created by fetch or select and only
/// destroyed by explicit removal from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Unique cache key.
    pub name: String,
    /// Row count and column order.
    pub header: TableHeader,
    /// Column data keyed by parameter name.
    pub data: HashMap<String, Column>,
}

impl Table {
    /// Builds a table from columns given in order.
    ///
    /// Fails if the columns differ in length.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<(String, Column)>,
    ) -> Result<Self, DataError> {
        let rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut order = Vec::with_capacity(columns.len());
        let mut data = HashMap::with_capacity(columns.len());
        for (col_name, column) in columns {
            if column.len() != rows {
                return Err(DataError::ColumnLengthMismatch {
                    column: col_name,
                    expected: rows,
                    actual: column.len(),
                });
            }
            order.push(col_name.clone());
            data.insert(col_name, column);
        }
        Ok(Self {
            name: name.into(),
            header: TableHeader {
                number_of_rows: rows,
                order,
            },
            data,
        })
    }

    /// Number of line records.
    pub fn rows(&self) -> usize {
        self.header.number_of_rows
    }

    /// Column names in their original order.
    pub fn parameters(&self) -> &[String] {
        &self.header.order
    }

    /// Looks up a column by parameter name.
    pub fn column(&self, name: &str) -> Result<&Column, DataError> {
        self.data.get(name).ok_or_else(|| DataError::MissingColumn {
            table: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// Looks up a numeric column by parameter name.
    pub fn float_column(&self, name: &str) -> Result<&[f64], DataError> {
        self.column(name)?
            .as_float()
            .ok_or_else(|| DataError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            })
    }

    /// Looks up a textual column by parameter name.
    pub fn text_column(&self, name: &str) -> Result<&[String], DataError> {
        self.column(name)?
            .as_text()
            .ok_or_else(|| DataError::ColumnType {
                column: name.to_string(),
                expected: "text",
            })
    }

    /// Wavenumber bounds of the table, from its `nu` column.
    ///
    /// Returns `None` for an empty table or one without a `nu` column.
    pub fn nu_bounds(&self) -> Option<(f64, f64)> {
        let nu = self.float_column("nu").ok()?;
        let mut iter = nu.iter().copied();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(
            "co2",
            vec![
                ("nu".to_string(), Column::Float(vec![640.0, 641.5, 660.2])),
                ("sw".to_string(), Column::Float(vec![1e-20, 3e-21, 2e-22])),
                (
                    "global_upper_quanta".to_string(),
                    Column::Text(vec!["0 1 1 01".into(), "0 1 1 01".into(), "0 2 2 01".into()]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_table_row_count() {
        let table = sample_table();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.header.order, vec!["nu", "sw", "global_upper_quanta"]);
    }

    #[test]
    fn test_table_rejects_ragged_columns() {
        let err = Table::new(
            "bad",
            vec![
                ("nu".to_string(), Column::Float(vec![1.0, 2.0])),
                ("sw".to_string(), Column::Float(vec![1.0])),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::ColumnLengthMismatch { .. }));
    }

    #[test]
    fn test_float_column_type_check() {
        let table = sample_table();
        assert!(table.float_column("nu").is_ok());
        let err = table.float_column("global_upper_quanta").unwrap_err();
        assert!(matches!(err, DataError::ColumnType { .. }));
    }

    #[test]
    fn test_missing_column() {
        let table = sample_table();
        let err = table.column("gamma_air").unwrap_err();
        assert_eq!(
            err,
            DataError::MissingColumn {
                table: "co2".to_string(),
                column: "gamma_air".to_string(),
            }
        );
    }

    #[test]
    fn test_nu_bounds() {
        let table = sample_table();
        assert_eq!(table.nu_bounds(), Some((640.0, 660.2)));
    }

    #[test]
    fn test_empty_table_has_no_bounds() {
        let table = Table::new("empty", vec![("nu".to_string(), Column::Float(vec![]))]).unwrap();
        assert_eq!(table.nu_bounds(), None);
    }
}
