//! Joining and aggregating tidy tables for downstream charting.

use crate::table::{Datum, TidyRow, TidyTable};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while joining or aggregating tables.
#[derive(Error, Debug)]
pub enum JoinError {
    /// A named key column is absent from a table
    #[error("Unknown key column '{column}'")]
    UnknownKeyColumn { column: String },

    /// Right-hand rows must be unique on the join keys
    #[error("Join key [{keys}] is not unique in the right-hand table")]
    DuplicateRightKeys { keys: String },

    /// Both sides carry a value column with the same name
    #[error("Value column '{column}' exists on both sides of the join")]
    DuplicateValueColumn { column: String },
}

/// Grouped aggregate operations. Missing values are treated as absent,
/// not zero, matching the normalizer's missing semantics.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOp {
    /// Sum of the present values; all-missing groups stay missing.
    Sum,
    /// Mean of the present values, rounded to the declared decimal
    /// precision for display consistency across charts.
    Mean { precision: u32 },
    /// Count of the present values; an all-missing group counts zero.
    Count,
}

/// Left-joins two tables on shared key columns.
///
/// Every left row is retained. A matching right row contributes its value
/// columns; unmatched rows get missing values. The result owns freshly
/// computed rows - nothing aliases back into either source table.
pub fn join(
    left: &TidyTable,
    right: &TidyTable,
    on_keys: &[String],
) -> Result<TidyTable, JoinError> {
    let left_keys = key_indexes(left, on_keys)?;
    let right_keys = key_indexes(right, on_keys)?;
    for column in right.value_columns() {
        if left.value_columns().contains(column) {
            return Err(JoinError::DuplicateValueColumn {
                column: column.to_owned(),
            });
        }
    }

    let mut matches: HashMap<Vec<&str>, &TidyRow> = HashMap::with_capacity(right.len());
    for row in right.rows() {
        let key: Vec<&str> = right_keys.iter().map(|index| row.keys()[*index].as_str()).collect();
        if matches.insert(key, row).is_some() {
            let keys: Vec<&str> = right_keys.iter().map(|index| row.keys()[*index].as_str()).collect();
            return Err(JoinError::DuplicateRightKeys { keys: keys.join(", ") });
        }
    }

    let value_columns: Vec<String> = left
        .value_columns()
        .iter()
        .chain(right.value_columns())
        .map(String::to_owned)
        .collect();
    let rows = left
        .rows()
        .iter()
        .map(|row| {
            let key: Vec<&str> = left_keys.iter().map(|index| row.keys()[*index].as_str()).collect();
            let mut values = row.values().to_vec();
            match matches.get(&key) {
                Some(matched) => values.extend(matched.values()),
                None => values.extend(vec![Datum::Missing; right.value_columns().len()]),
            }
            TidyRow::new(row.keys().to_vec(), values)
        })
        .collect();
    Ok(TidyTable::new(left.key_columns().to_vec(), value_columns, rows))
}

/// Groups a table by the named key columns and aggregates every value
/// column with the given operation.
///
/// Groups appear in first-seen order, preserving the source ordering the
/// reshaper established.
pub fn aggregate(
    table: &TidyTable,
    group_keys: &[String],
    op: AggregateOp,
) -> Result<TidyTable, JoinError> {
    let key_indexes = key_indexes(table, group_keys)?;
    let width = table.value_columns().len();

    // (sum, count) accumulator per value column, per group
    let mut order: Vec<Vec<String>> = Vec::new();
    let mut groups: HashMap<Vec<String>, Vec<(f64, usize)>> = HashMap::new();
    for row in table.rows() {
        let key: Vec<String> = key_indexes
            .iter()
            .map(|index| row.keys()[*index].to_owned())
            .collect();
        let accumulators = groups.entry(key.to_owned()).or_insert_with(|| {
            order.push(key);
            vec![(0.0, 0); width]
        });
        for (accumulator, value) in accumulators.iter_mut().zip(row.values()) {
            if let Some(value) = value.as_f64() {
                accumulator.0 += value;
                accumulator.1 += 1;
            }
        }
    }

    let rows = order
        .into_iter()
        .map(|key| {
            let values = groups[&key]
                .iter()
                .map(|(sum, count)| match op {
                    AggregateOp::Sum if *count == 0 => Datum::Missing,
                    AggregateOp::Sum => Datum::Number(*sum),
                    AggregateOp::Mean { .. } if *count == 0 => Datum::Missing,
                    AggregateOp::Mean { precision } => {
                        Datum::Number(round_to(sum / *count as f64, precision))
                    }
                    AggregateOp::Count => Datum::Number(*count as f64),
                })
                .collect();
            TidyRow::new(key, values)
        })
        .collect();
    Ok(TidyTable::new(
        group_keys.to_vec(),
        table.value_columns().to_vec(),
        rows,
    ))
}

fn key_indexes(table: &TidyTable, keys: &[String]) -> Result<Vec<usize>, JoinError> {
    keys.iter()
        .map(|name| {
            table.key_index(name).ok_or_else(|| JoinError::UnknownKeyColumn {
                column: name.to_owned(),
            })
        })
        .collect()
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
