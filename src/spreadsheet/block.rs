use crate::spreadsheet::range::index_to_reference;
use calamine::Data;
use chrono::NaiveTime;
use thiserror::Error;

/// Errors related to raw block construction.
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Block row {row} has {observed} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        observed: usize,
    },
}

/// A raw cell value as read from a worksheet, before any normalization.
///
/// `Empty` is representable and distinct from zero; `Error` carries the
/// spreadsheet error literal ("#N/A", "#REF!", ...) so callers can tell a
/// workbook error apart from ordinary textual noise.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    Error(String),
}

impl RawValue {
    /// Returns true for cells that read as blank: empty cells and
    /// whitespace-only text, the residue of merged-cell formatting.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the cell as label text, if it has any.
    /// Blank and error cells have none; numbers render via their shortest
    /// display form ("2021", not "2021.0").
    pub fn label_text(&self) -> Option<String> {
        match self {
            RawValue::Text(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
            RawValue::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl From<&Data> for RawValue {
    /// Converts a calamine cell into the engine's raw value model.
    /// Date-typed cells are rendered to ISO strings; booleans to "true"/"false".
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => RawValue::Empty,
            Data::String(text) => RawValue::Text(text.to_owned()),
            Data::Int(value) => RawValue::Number(*value as f64),
            Data::Float(value) => RawValue::Number(*value),
            Data::Bool(value) => RawValue::Text(value.to_string()),
            Data::DateTime(value) => match value.as_datetime() {
                Some(datetime) if datetime.time() == NaiveTime::MIN => {
                    RawValue::Text(datetime.format("%Y-%m-%d").to_string())
                }
                Some(datetime) => RawValue::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => RawValue::Empty,
            },
            Data::DateTimeIso(value) => RawValue::Text(value.to_owned()),
            Data::DurationIso(value) => RawValue::Text(value.to_owned()),
            Data::Error(error) => RawValue::Error(error.to_string()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_owned())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// A rectangular grid of raw cell values cut from a worksheet.
///
/// The block remembers its sheet and the absolute (row, column) origin of
/// the range it was cut from, so downstream errors can name real cell
/// coordinates instead of block offsets.
#[derive(Clone, Debug)]
pub struct RawBlock {
    sheet: String,
    origin: (usize, usize),
    rows: Vec<Vec<RawValue>>,
}

impl RawBlock {
    /// Creates a block, enforcing the rectangular invariant.
    pub fn new(
        sheet: impl Into<String>,
        origin: (usize, usize),
        rows: Vec<Vec<RawValue>>,
    ) -> Result<Self, BlockError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(BlockError::RaggedRow {
                    row,
                    expected,
                    observed: cells.len(),
                });
            }
        }
        Ok(RawBlock {
            sheet: sheet.into(),
            origin,
            rows,
        })
    }

    /// Name of the sheet the block was cut from.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Number of rows in the block.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the block.
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// The block's rows, top to bottom.
    pub fn rows(&self) -> &[Vec<RawValue>] {
        &self.rows
    }

    /// Excel-style absolute reference of the cell at the given block offsets.
    pub fn position(&self, row: usize, col: usize) -> String {
        index_to_reference(self.origin.0 + row, self.origin.1 + col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_rejects_ragged_rows() {
        let rows = vec![
            vec![RawValue::from("a"), RawValue::from("b")],
            vec![RawValue::from("c")],
        ];
        assert!(matches!(
            RawBlock::new("Table 1", (0, 0), rows),
            Err(BlockError::RaggedRow { row: 1, expected: 2, observed: 1 })
        ));
    }

    #[test]
    fn block_positions_are_absolute() {
        let rows = vec![vec![RawValue::Empty, RawValue::Empty]];
        let block = RawBlock::new("Table 1", (14, 1), rows).unwrap();
        assert_eq!(block.position(0, 0), "B15");
        assert_eq!(block.position(0, 1), "C15");
    }

    #[test]
    fn blank_cells_cover_whitespace_text() {
        assert!(RawValue::Empty.is_blank());
        assert!(RawValue::Text("   ".to_owned()).is_blank());
        assert!(!RawValue::Text("North".to_owned()).is_blank());
        assert!(!RawValue::Number(0.0).is_blank());
    }

    #[test]
    fn label_text_renders_numbers_without_fraction() {
        assert_eq!(RawValue::Number(2021.0).label_text(), Some("2021".to_owned()));
        assert_eq!(RawValue::from(" North ").label_text(), Some("North".to_owned()));
        assert_eq!(RawValue::Empty.label_text(), None);
        assert_eq!(RawValue::Error("#N/A".to_owned()).label_text(), None);
    }
}
