//! Table reshaping: raw blocks to long-format tidy tables.

use crate::error::TidySheetError;
use crate::reshape::fill::fill_down;
use crate::reshape::header::{resolve_headers, HeaderSpec};
use crate::reshape::normalize::normalize;
use crate::reshape::{ShapeError, ValueError};
use crate::spreadsheet::block::{RawBlock, RawValue};
use crate::table::{Datum, TidyRow, TidyTable};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

/// Declares what the non-group columns of a block are.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSpec {
    /// Melt every non-group column into its dimension key values plus a
    /// single value column with the given name.
    Melt { name: String },
    /// Keep the non-group columns as parallel value columns with the
    /// declared names, one tidy row per data row. The name count must
    /// match the resolved columns.
    Wide { names: Vec<String> },
}

/// Reshapes a raw block into a tidy table.
///
/// 1. Resolve column labels from the leading header rows (group columns
///    are named by the schema, so their header cells are skipped).
/// 2. Hierarchically fill the declared leading group columns of the data
///    rows.
/// 3. Normalize every remaining cell to numeric-or-missing.
/// 4. Emit rows per the [`ValueSpec`]: melted, keys are the group values
///    plus the column label's dimension parts; wide, keys are the group
///    values alone.
///
/// Row order follows the source (row, then column); no implicit sort.
/// Construction is all-or-nothing: any shape violation, including a
/// duplicate key tuple, aborts the whole table.
pub fn reshape(
    block: &RawBlock,
    header: &HeaderSpec,
    group_columns: &[String],
    values: &ValueSpec,
) -> Result<TidyTable, TidySheetError> {
    let header_rows = header.rows();
    if block.height() < header_rows {
        return Err(ShapeError::HeaderRows {
            expected: header_rows,
            observed: block.height(),
        }
        .into());
    }
    let group_count = group_columns.len();
    if group_count >= block.width() {
        return Err(ShapeError::GroupColumns {
            declared: group_count,
            width: block.width(),
        }
        .into());
    }

    let header_block: Vec<&[RawValue]> = block.rows()[..header_rows]
        .iter()
        .map(|row| &row[group_count..])
        .collect();
    let labels = resolve_headers(&header_block, header)?;

    let data_rows = &block.rows()[header_rows..];
    let mut group_values = read_group_cells(block, data_rows, group_count, header_rows)?;
    fill_down(&mut group_values, group_columns)?;

    let table = match values {
        ValueSpec::Melt { name } => {
            let key_columns: Vec<String> = group_columns
                .iter()
                .chain(header.dimensions.iter())
                .map(String::to_owned)
                .collect();
            let mut rows = Vec::with_capacity(data_rows.len() * labels.len());
            for (row, cells) in data_rows.iter().enumerate() {
                for (column, label) in labels.iter().enumerate() {
                    let mut keys: Vec<String> = group_values[row]
                        .iter()
                        .map(|value| value.to_owned().expect("filled group cell"))
                        .collect();
                    keys.extend(label.parts().iter().map(String::to_owned));
                    let value = normalize(&cells[group_count + column]);
                    rows.push(TidyRow::new(keys, vec![value]));
                }
            }
            TidyTable::new(key_columns, vec![name.to_owned()], rows)
        }
        ValueSpec::Wide { names } => {
            if names.len() != labels.len() {
                return Err(ShapeError::ValueColumns {
                    expected: labels.len(),
                    observed: names.len(),
                }
                .into());
            }
            let rows = data_rows
                .iter()
                .enumerate()
                .map(|(row, cells)| {
                    let keys: Vec<String> = group_values[row]
                        .iter()
                        .map(|value| value.to_owned().expect("filled group cell"))
                        .collect();
                    let data: Vec<Datum> =
                        cells[group_count..].iter().map(normalize).collect();
                    TidyRow::new(keys, data)
                })
                .collect();
            TidyTable::new(group_columns.to_vec(), names.to_owned(), rows)
        }
    };

    check_unique_keys(&table)?;
    debug!(
        sheet = block.sheet(),
        rows = table.len(),
        key_columns = table.key_columns().len(),
        "block reshaped"
    );
    Ok(table)
}

/// Reads the leading group cells of each data row as optional labels.
///
/// Group cells must be textual; a workbook error value there poisons the
/// keys of every observation in its row, so it aborts the table with the
/// cell's coordinates.
fn read_group_cells(
    block: &RawBlock,
    data_rows: &[Vec<RawValue>],
    group_count: usize,
    header_rows: usize,
) -> Result<Vec<Vec<Option<String>>>, ValueError> {
    data_rows
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            (0..group_count)
                .map(|column| match &cells[column] {
                    RawValue::Error(message) => Err(ValueError::InvalidCell {
                        position: block.position(header_rows + row, column),
                        message: message.to_owned(),
                    }),
                    cell => Ok(cell.label_text()),
                })
                .collect()
        })
        .collect()
}

/// Rejects tables where two observations share a key tuple.
fn check_unique_keys(table: &TidyTable) -> Result<(), ShapeError> {
    let mut seen: HashSet<&[String]> = HashSet::with_capacity(table.len());
    for row in table.rows() {
        if !seen.insert(row.keys()) {
            return Err(ShapeError::DuplicateKeys {
                keys: row.keys().join(", "),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(values: &[&str]) -> Vec<RawValue> {
        values
            .iter()
            .map(|value| {
                if value.is_empty() {
                    RawValue::Empty
                } else {
                    RawValue::from(*value)
                }
            })
            .collect()
    }

    /// Two group columns, a two-dimension header and noisy values - the
    /// shape of a regional incident table.
    fn incident_block() -> RawBlock {
        RawBlock::new(
            "Table 1",
            (14, 1),
            vec![
                text_row(&["", "", "2019-20", "", "2020-21", ""]),
                text_row(&["", "", "Residential", "Other", "Residential", "Other"]),
                text_row(&["North", "Banyule", "1,234", "≤ 3", "987", "12"]),
                text_row(&["", "Darebin", "456", "—", "654", "21"]),
                text_row(&["South", "Kingston", "789", "8", "321", ""]),
            ],
        )
        .unwrap()
    }

    fn incident_header() -> HeaderSpec {
        HeaderSpec::new(vec!["financial year", "category"])
    }

    fn incident_groups() -> Vec<String> {
        vec!["region".to_owned(), "area".to_owned()]
    }

    #[test]
    fn melt_emits_one_row_per_data_cell() {
        let table = reshape(
            &incident_block(),
            &incident_header(),
            &incident_groups(),
            &ValueSpec::Melt { name: "incidents".to_owned() },
        )
        .unwrap();
        assert_eq!(table.len(), 3 * 4);
        assert_eq!(
            table.key_columns(),
            ["region", "area", "financial year", "category"]
        );
        assert_eq!(table.value_columns(), ["incidents"]);

        let first = &table.rows()[0];
        assert_eq!(first.keys(), ["North", "Banyule", "2019-20", "residential"]);
        assert_eq!(first.values(), [Datum::Number(1234.0)]);

        // Suppressed, filled and blank cells, in source order
        assert_eq!(table.rows()[1].values(), [Datum::Number(3.0)]);
        assert_eq!(table.rows()[4].keys()[0], "North");
        assert_eq!(table.rows()[5].values(), [Datum::Missing]);
        assert_eq!(table.rows()[11].values(), [Datum::Missing]);
    }

    #[test]
    fn wide_keeps_columns_as_parallel_measures() {
        let block = RawBlock::new(
            "Table 4",
            (3, 0),
            vec![
                text_row(&["Region", "Incidents", "Rate"]),
                text_row(&["North", "1,234", "102.5"]),
                text_row(&["South", "789", "96.1"]),
            ],
        )
        .unwrap();
        let table = reshape(
            &block,
            &HeaderSpec::new(vec!["measure"]),
            &["region".to_owned()],
            &ValueSpec::Wide { names: vec!["incidents".to_owned(), "rate".to_owned()] },
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value_columns(), ["incidents", "rate"]);
        assert_eq!(table.rows()[0].values(), [Datum::Number(1234.0), Datum::Number(102.5)]);
    }

    #[test]
    fn wide_name_count_mismatch_reports_expected_vs_observed() {
        let block = RawBlock::new(
            "Table 4",
            (0, 0),
            vec![
                text_row(&["Region", "Incidents", "Rate"]),
                text_row(&["North", "1", "2"]),
            ],
        )
        .unwrap();
        let error = reshape(
            &block,
            &HeaderSpec::new(vec!["measure"]),
            &["region".to_owned()],
            &ValueSpec::Wide { names: vec!["incidents".to_owned()] },
        )
        .unwrap_err();
        assert!(matches!(
            error,
            TidySheetError::ShapeError(ShapeError::ValueColumns { expected: 2, observed: 1 })
        ));
    }

    #[test]
    fn group_error_cell_aborts_with_coordinates() {
        let block = RawBlock::new(
            "Table 1",
            (14, 1),
            vec![
                text_row(&["Region", "Count"]),
                vec![RawValue::Error("#REF!".to_owned()), RawValue::from("12")],
            ],
        )
        .unwrap();
        let error = reshape(
            &block,
            &HeaderSpec::new(vec!["measure"]),
            &["region".to_owned()],
            &ValueSpec::Melt { name: "count".to_owned() },
        )
        .unwrap_err();
        assert!(matches!(
            error,
            TidySheetError::ValueError(ValueError::InvalidCell { position, .. }) if position == "B16"
        ));
    }

    #[test]
    fn duplicate_key_tuples_abort_the_table() {
        let block = RawBlock::new(
            "Table 1",
            (0, 0),
            vec![
                text_row(&["Region", "Count"]),
                text_row(&["North", "1"]),
                text_row(&["North", "2"]),
            ],
        )
        .unwrap();
        let error = reshape(
            &block,
            &HeaderSpec::new(vec!["measure"]),
            &["region".to_owned()],
            &ValueSpec::Melt { name: "count".to_owned() },
        )
        .unwrap_err();
        assert!(matches!(
            error,
            TidySheetError::ShapeError(ShapeError::DuplicateKeys { .. })
        ));
    }

    #[test]
    fn too_few_rows_for_the_declared_header() {
        let block = RawBlock::new(
            "Table 1",
            (0, 0),
            vec![text_row(&["Region", "2019-20"])],
        )
        .unwrap();
        let error = reshape(
            &block,
            &incident_header(),
            &["region".to_owned()],
            &ValueSpec::Melt { name: "count".to_owned() },
        )
        .unwrap_err();
        assert!(matches!(
            error,
            TidySheetError::ShapeError(ShapeError::HeaderRows { expected: 2, observed: 1 })
        ));
    }
}
