//! # Tidy Table Module
//!
//! The relational output model of the reshaping engine: one row per
//! observation, named key columns holding categorical strings, named value
//! columns holding numeric-or-missing data. Tables are immutable once
//! constructed; joins and aggregates always produce new tables.

pub mod join;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// A numeric-or-missing cell value, never raw text.
///
/// `Missing` records that the source expressed "no data"; it is distinct
/// from zero and is ignored (treated as absent) by aggregation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Datum {
    Number(f64),
    #[default]
    Missing,
}

impl Datum {
    /// Returns true when the value is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Datum::Missing)
    }

    /// The numeric value, if present.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Number(value) => Some(*value),
            Datum::Missing => None,
        }
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::Number(value) => write!(f, "{value}"),
            Datum::Missing => write!(f, "NA"),
        }
    }
}

impl Serialize for Datum {
    /// Serializes as a nullable number, so records reach the chart layer
    /// as `{"value": 12.0}` or `{"value": null}`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Datum::Number(value) => serializer.serialize_some(value),
            Datum::Missing => serializer.serialize_none(),
        }
    }
}

/// One observation: key strings parallel to the table's key columns plus
/// one datum per value column.
#[derive(Clone, Debug, PartialEq)]
pub struct TidyRow {
    keys: Vec<String>,
    values: Vec<Datum>,
}

impl TidyRow {
    /// Creates a row. The caller is responsible for matching the owning
    /// table's column counts; [`TidyTable::new`] enforces it.
    pub fn new(keys: Vec<String>, values: Vec<Datum>) -> Self {
        TidyRow { keys, values }
    }

    /// Key values, parallel to the table's key columns.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Data values, parallel to the table's value columns.
    pub fn values(&self) -> &[Datum] {
        &self.values
    }
}

/// An ordered, immutable sequence of [`TidyRow`] with a named schema.
///
/// The reshaping engine produces tables with exactly one value column;
/// joins widen that to the union of both sides' value columns.
#[derive(Clone, Debug)]
pub struct TidyTable {
    key_columns: Vec<String>,
    value_columns: Vec<String>,
    rows: Vec<TidyRow>,
}

impl TidyTable {
    /// Creates a table from a fixed schema and its rows.
    ///
    /// # Panics
    ///
    /// Panics if any row's key or value count disagrees with the schema;
    /// rows are only ever built by this crate's constructors or by callers
    /// mirroring them.
    pub fn new(key_columns: Vec<String>, value_columns: Vec<String>, rows: Vec<TidyRow>) -> Self {
        for row in &rows {
            assert_eq!(row.keys.len(), key_columns.len(), "row key count");
            assert_eq!(row.values.len(), value_columns.len(), "row value count");
        }
        TidyTable {
            key_columns,
            value_columns,
            rows,
        }
    }

    /// Names of the key columns.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Names of the value columns.
    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// The rows, in insertion order.
    pub fn rows(&self) -> &[TidyRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a key column by name.
    pub fn key_index(&self, name: &str) -> Option<usize> {
        self.key_columns.iter().position(|column| column == name)
    }

    /// Position of a value column by name.
    pub fn value_index(&self, name: &str) -> Option<usize> {
        self.value_columns.iter().position(|column| column == name)
    }
}

impl Serialize for TidyTable {
    /// Serializes as an array of records, each mapping column names to
    /// key strings and nullable numbers - the shape the chart layer eats.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record { table: self, row })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    table: &'a TidyTable,
    row: &'a TidyRow,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let width = self.table.key_columns.len() + self.table.value_columns.len();
        let mut map = serializer.serialize_map(Some(width))?;
        for (column, key) in self.table.key_columns.iter().zip(&self.row.keys) {
            map.serialize_entry(column, key)?;
        }
        for (column, value) in self.table.value_columns.iter().zip(&self.row.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
