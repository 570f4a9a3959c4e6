//! Table filtering: derive a new named table from an existing one.

use super::{Column, DataError, Table};

/// Row predicate for [`select`], evaluated against named columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Numeric column value within `[min, max]` inclusive.
    Between { param: String, min: f64, max: f64 },
    /// Numeric column value strictly above the bound.
    Gt { param: String, value: f64 },
    /// Numeric column value strictly below the bound.
    Lt { param: String, value: f64 },
    /// Text column value equal to the given string.
    Eq { param: String, value: String },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    fn matches(&self, table: &Table, row: usize) -> Result<bool, DataError> {
        match self {
            Condition::Between { param, min, max } => {
                let v = table.float_column(param)?[row];
                Ok(v >= *min && v <= *max)
            }
            Condition::Gt { param, value } => Ok(table.float_column(param)?[row] > *value),
            Condition::Lt { param, value } => Ok(table.float_column(param)?[row] < *value),
            Condition::Eq { param, value } => {
                Ok(table.text_column(param)?[row].trim() == value.trim())
            }
            Condition::And(terms) => {
                for term in terms {
                    if !term.matches(table, row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Or(terms) => {
                for term in terms {
                    if term.matches(table, row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Not(term) => Ok(!term.matches(table, row)?),
        }
    }
}

/// What a [`select`] keeps: an optional column subset and an optional row
/// predicate. Leaving both unset copies the table under the new name.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub parameter_names: Option<Vec<String>>,
    pub condition: Option<Condition>,
}

/// Filters `table` into a new table named `destination`.
///
/// Rows failing the condition are dropped; columns outside the projection
/// are dropped. Row order is preserved. The caller is responsible for
/// storing the result, which is how a select becomes a cached table.
pub fn select(
    table: &Table,
    destination: &str,
    options: &SelectOptions,
) -> Result<Table, DataError> {
    if destination.is_empty() {
        return Err(DataError::EmptyDestination);
    }

    let keep_columns: Vec<&String> = match &options.parameter_names {
        Some(names) => {
            // Validate the projection up front so the error names the column.
            for name in names {
                table.column(name)?;
            }
            names.iter().collect()
        }
        None => table.header.order.iter().collect(),
    };

    let mut keep_rows = Vec::new();
    for row in 0..table.rows() {
        let keep = match &options.condition {
            Some(condition) => condition.matches(table, row)?,
            None => true,
        };
        if keep {
            keep_rows.push(row);
        }
    }

    let columns = keep_columns
        .into_iter()
        .map(|name| {
            let column = match table.column(name)? {
                Column::Float(v) => Column::Float(keep_rows.iter().map(|&r| v[r]).collect()),
                Column::Text(v) => {
                    Column::Text(keep_rows.iter().map(|&r| v[r].clone()).collect())
                }
            };
            Ok((name.clone(), column))
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    Table::new(destination, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Table {
        Table::new(
            "src",
            vec![
                ("nu".to_string(), Column::Float(vec![10.0, 20.0, 30.0, 40.0])),
                ("sw".to_string(), Column::Float(vec![1.0, 2.0, 3.0, 4.0])),
                (
                    "global_upper_quanta".to_string(),
                    Column::Text(vec!["a".into(), "b".into(), "a".into(), "c".into()]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_select_between() {
        let out = select(
            &source(),
            "dst",
            &SelectOptions {
                parameter_names: None,
                condition: Some(Condition::Between {
                    param: "nu".into(),
                    min: 15.0,
                    max: 35.0,
                }),
            },
        )
        .unwrap();
        assert_eq!(out.name, "dst");
        assert_eq!(out.rows(), 2);
        assert_eq!(out.float_column("nu").unwrap(), &[20.0, 30.0]);
    }

    #[test]
    fn test_select_projection() {
        let out = select(
            &source(),
            "dst",
            &SelectOptions {
                parameter_names: Some(vec!["nu".into()]),
                condition: None,
            },
        )
        .unwrap();
        assert_eq!(out.parameters(), ["nu"]);
        assert_eq!(out.rows(), 4);
    }

    #[test]
    fn test_select_compound_condition() {
        let out = select(
            &source(),
            "dst",
            &SelectOptions {
                parameter_names: None,
                condition: Some(Condition::And(vec![
                    Condition::Gt {
                        param: "sw".into(),
                        value: 1.0,
                    },
                    Condition::Not(Box::new(Condition::Eq {
                        param: "global_upper_quanta".into(),
                        value: "c".into(),
                    })),
                ])),
            },
        )
        .unwrap();
        assert_eq!(out.float_column("nu").unwrap(), &[20.0, 30.0]);
    }

    #[test]
    fn test_select_requires_destination_name() {
        let err = select(&source(), "", &SelectOptions::default()).unwrap_err();
        assert_eq!(err, DataError::EmptyDestination);
    }

    #[test]
    fn test_select_unknown_projection_column() {
        let err = select(
            &source(),
            "dst",
            &SelectOptions {
                parameter_names: Some(vec!["gamma_air".into()]),
                condition: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }
}
