//! Band grouping: partition a table's lines by upper/lower quantum state.

use super::{DataError, Table};
use std::collections::HashMap;

/// A group of spectral lines sharing one (upper, lower) quantum-state pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Line positions, in table row order within the band.
    pub nu: Vec<f64>,
    /// Line intensities, position-aligned with `nu`.
    pub sw: Vec<f64>,
    /// `"{upper} _ {lower}"` with both quantum strings trimmed.
    pub band_id: String,
}

/// The bands of one source table, in first-occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    pub bands: Vec<Band>,
    /// Name of the table the bands were computed from.
    pub table_name: String,
}

/// Groups a table's lines into bands.
///
/// Lines are scanned in row order; each distinct
/// (`global_upper_quanta`, `global_lower_quanta`) pair opens a new band at
/// the position where it first occurs, and later lines with the same pair
/// append in row order. No sorting happens at any point: downstream
/// consumers (legends, colour assignment) rely on the first-occurrence
/// order being stable across repeated calls on unchanged data.
///
/// A table whose lines all have distinct quanta yields one band per line;
/// an empty table yields no bands.
pub fn band_index(table: &Table) -> Result<Bands, DataError> {
    let upper = table.text_column("global_upper_quanta")?;
    let lower = table.text_column("global_lower_quanta")?;
    let nu = table.float_column("nu")?;
    let sw = table.float_column("sw")?;

    // Key → position in `groups`; the Vec preserves first-seen order.
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<((&str, &str), Vec<usize>)> = Vec::new();

    for row in 0..table.rows() {
        let key = (upper[row].as_str(), lower[row].as_str());
        match seen.get(&key) {
            Some(&at) => groups[at].1.push(row),
            None => {
                seen.insert(key, groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    let bands = groups
        .into_iter()
        .map(|((up, lo), rows)| Band {
            nu: rows.iter().map(|&r| nu[r]).collect(),
            sw: rows.iter().map(|&r| sw[r]).collect(),
            band_id: format!("{} _ {}", up.trim(), lo.trim()),
        })
        .collect();

    Ok(Bands {
        bands,
        table_name: table.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn quanta_table(pairs: &[(&str, &str)]) -> Table {
        let n = pairs.len();
        Table::new(
            "lines",
            vec![
                (
                    "nu".to_string(),
                    Column::Float((0..n).map(|i| 600.0 + i as f64).collect()),
                ),
                (
                    "sw".to_string(),
                    Column::Float((0..n).map(|i| 1e-20 * (i + 1) as f64).collect()),
                ),
                (
                    "global_upper_quanta".to_string(),
                    Column::Text(pairs.iter().map(|(u, _)| u.to_string()).collect()),
                ),
                (
                    "global_lower_quanta".to_string(),
                    Column::Text(pairs.iter().map(|(_, l)| l.to_string()).collect()),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_band_count_and_line_conservation() {
        let table = quanta_table(&[
            (" 0 1 1 01", " 0 0 0 01"),
            (" 0 2 2 01", " 0 1 1 01"),
            (" 0 1 1 01", " 0 0 0 01"),
            (" 0 2 2 01", " 0 1 1 01"),
            (" 1 0 0 11", " 0 0 0 01"),
        ]);
        let bands = band_index(&table).unwrap();
        assert_eq!(bands.bands.len(), 3);
        let total: usize = bands.bands.iter().map(|b| b.nu.len()).sum();
        assert_eq!(total, table.rows());
    }

    #[test]
    fn test_first_occurrence_order() {
        let table = quanta_table(&[("b", "y"), ("a", "x"), ("b", "y"), ("c", "z")]);
        let bands = band_index(&table).unwrap();
        let ids: Vec<&str> = bands.bands.iter().map(|b| b.band_id.as_str()).collect();
        // Keyed by first appearance, never sorted.
        assert_eq!(ids, vec!["b _ y", "a _ x", "c _ z"]);
    }

    #[test]
    fn test_within_band_row_order() {
        let table = quanta_table(&[("a", "x"), ("b", "y"), ("a", "x")]);
        let bands = band_index(&table).unwrap();
        assert_eq!(bands.bands[0].nu, vec![600.0, 602.0]);
        assert_eq!(bands.bands[0].sw, vec![1e-20, 3e-20]);
    }

    #[test]
    fn test_labels_are_trimmed() {
        let table = quanta_table(&[("  0 1 1 01 ", " 0 0 0 01  ")]);
        let bands = band_index(&table).unwrap();
        assert_eq!(bands.bands[0].band_id, "0 1 1 01 _ 0 0 0 01");
    }

    #[test]
    fn test_all_distinct_quanta_one_band_per_line() {
        let table = quanta_table(&[("a", "x"), ("b", "y"), ("c", "z")]);
        let bands = band_index(&table).unwrap();
        assert_eq!(bands.bands.len(), 3);
        assert!(bands.bands.iter().all(|b| b.nu.len() == 1));
    }

    #[test]
    fn test_empty_table_yields_no_bands() {
        let table = quanta_table(&[]);
        let bands = band_index(&table).unwrap();
        assert!(bands.bands.is_empty());
        assert_eq!(bands.table_name, "lines");
    }

    #[test]
    fn test_deterministic_across_runs() {
        let table = quanta_table(&[("b", "y"), ("a", "x"), ("b", "y"), ("a", "z")]);
        let first = band_index(&table).unwrap();
        let second = band_index(&table).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_quanta_column_is_an_error() {
        let table = Table::new(
            "bare",
            vec![("nu".to_string(), Column::Float(vec![1.0]))],
        )
        .unwrap();
        assert!(band_index(&table).is_err());
    }
}
