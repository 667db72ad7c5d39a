//! Declarative extraction schemas and the one-call pipeline.
//!
//! A deck declares one [`TableSchema`] per chart - which sheet, which
//! range, how the headers map to dimensions, which leading columns are
//! grouping labels - and calls [`extract`]. Per-slide code stays limited
//! to declaring schemas and invoking the chart layer.

use crate::error::TidySheetError;
use crate::reshape::header::HeaderSpec;
use crate::reshape::reshaper::{reshape, ValueSpec};
use crate::spreadsheet::Spreadsheet;
use crate::table::TidyTable;
use serde::Deserialize;
use tracing::debug;

/// A declarative description of one spreadsheet range and its shape.
///
/// Deserializable, so a deck can keep its extraction schemas as plain
/// JSON/TOML data next to its slides:
///
/// ```json
/// {
///     "sheet": "Table 1*",
///     "range": "B15:I93",
///     "header": { "dimensions": ["financial year", "category"] },
///     "group_columns": ["region", "area"],
///     "values": { "melt": { "name": "incidents" } }
/// }
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct TableSchema {
    /// Sheet name or glob pattern
    pub sheet: String,
    /// Excel-style range address ("B15:I93")
    pub range: String,
    /// How the leading header rows map to dimensions
    pub header: HeaderSpec,
    /// Names for the leading grouping columns, outermost first
    #[serde(default)]
    pub group_columns: Vec<String>,
    /// What the non-group columns are
    pub values: ValueSpec,
}

/// Reads the schema's range from the workbook and reshapes it into a tidy
/// table.
///
/// All-or-nothing: a failure aborts only this schema's table and reports
/// workbook, sheet and range context; independent schemas against the same
/// workbook are unaffected.
pub fn extract(
    spreadsheet: &mut Spreadsheet,
    schema: &TableSchema,
) -> Result<TidyTable, TidySheetError> {
    let block = spreadsheet.read_range(&schema.sheet, &schema.range)?;
    let table = reshape(&block, &schema.header, &schema.group_columns, &schema.values)?;
    debug!(
        workbook = spreadsheet.name(),
        sheet = schema.sheet.as_str(),
        range = schema.range.as_str(),
        rows = table.len(),
        "table extracted"
    );
    Ok(table)
}
