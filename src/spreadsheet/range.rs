use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors related to Excel-style range parsing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),
}

static RANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)(\d+)(?::([A-Z]+)(\d+))?$").expect("Hardcode regex pattern"));

/// An Excel-style cell range with both corners bound.
///
/// Unlike open-ended selections, a range here always names its full
/// rectangle ("B15:I93"); a bare cell reference ("B4") is the degenerate
/// one-cell rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Range {
    /// Lower row bound (0-based, inclusive)
    pub row_lower_bound: usize,
    /// Upper row bound (0-based, inclusive)
    pub row_upper_bound: usize,
    /// Lower column bound (0-based, inclusive)
    pub col_lower_bound: usize,
    /// Upper column bound (0-based, inclusive)
    pub col_upper_bound: usize,
}

impl TryFrom<&str> for Range {
    type Error = RangeError;

    /// Parses an Excel-style range string (e.g., "B15:I93", "B4").
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let text = value.trim().to_ascii_uppercase();
        let captures = RANGE_PATTERN
            .captures(text.as_str())
            .ok_or_else(|| RangeError::FormatError(value.to_owned()))?;
        let col_lower_bound = col_to_index(&captures[1]);
        let row_lower_bound =
            row_to_index(&captures[2]).ok_or_else(|| RangeError::FormatError(value.to_owned()))?;
        let (col_upper_bound, row_upper_bound) = match (captures.get(3), captures.get(4)) {
            (Some(col), Some(row)) => (
                col_to_index(col.as_str()),
                row_to_index(row.as_str())
                    .ok_or_else(|| RangeError::FormatError(value.to_owned()))?,
            ),
            _ => (col_lower_bound, row_lower_bound),
        };
        if row_upper_bound < row_lower_bound || col_upper_bound < col_lower_bound {
            return Err(RangeError::FormatError(value.to_owned()));
        }
        Ok(Range {
            row_lower_bound,
            row_upper_bound,
            col_lower_bound,
            col_upper_bound,
        })
    }
}

impl Range {
    /// Number of rows covered by the range.
    pub fn height(&self) -> usize {
        self.row_upper_bound - self.row_lower_bound + 1
    }

    /// Number of columns covered by the range.
    pub fn width(&self) -> usize {
        self.col_upper_bound - self.col_lower_bound + 1
    }
}

/// Converts column letters ("A", "AB") to a 0-based column index.
fn col_to_index(letters: &str) -> usize {
    letters
        .chars()
        .fold(0usize, |index, letter| index * 26 + (letter as usize - 'A' as usize + 1))
        - 1
}

/// Converts a 1-based row number string to a 0-based row index.
/// Row "0" has no spreadsheet meaning and is rejected.
fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Converts 0-based row & column indexes to an Excel-style cell reference.
pub fn index_to_reference(row: usize, col: usize) -> String {
    let mut col = col as u32 + 1;
    let mut reference = String::new();
    while col > 0 {
        col -= 1;
        let digit = char::from_u32(65 + col % 26).expect("Hardcode letters");
        col /= 26;
        reference.insert(0, digit);
    }
    reference.push_str((row + 1).to_string().as_str());
    reference
}
