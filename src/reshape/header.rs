//! Header resolution: multi-row header blocks to composite column labels.

use crate::reshape::ShapeError;
use crate::spreadsheet::block::RawValue;
use serde::Deserialize;

fn default_separator() -> char {
    '_'
}

/// Declares how the header rows of a block map to semantic dimensions.
///
/// One dimension per header row (1-3 observed), in top-to-bottom order,
/// e.g. `["financial year", "category"]` for a year row over a category
/// row. The dimension names become key columns when the block is melted.
#[derive(Clone, Debug, Deserialize)]
pub struct HeaderSpec {
    /// Semantic dimension names, one per header row
    pub dimensions: Vec<String>,
    /// Separator joining composite label keys
    #[serde(default = "default_separator")]
    pub separator: char,
}

impl HeaderSpec {
    /// Creates a spec with the default separator.
    pub fn new<S: Into<String>>(dimensions: Vec<S>) -> Self {
        HeaderSpec {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            separator: default_separator(),
        }
    }

    /// Number of header rows the spec consumes.
    pub fn rows(&self) -> usize {
        self.dimensions.len()
    }
}

/// A resolved column label.
///
/// `parts` carry the normalized per-dimension values used for matching and
/// grouping; `titles` keep the human-readable forms for display; `key` is
/// the separator-joined composite of the parts.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnLabel {
    parts: Vec<String>,
    titles: Vec<String>,
    key: String,
}

impl ColumnLabel {
    /// Normalized per-dimension values, in dimension order.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Human-readable per-dimension values, in dimension order.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// The separator-joined composite key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Reconstructs the full set of column labels from a header block.
///
/// Single dimension: each cell is used verbatim after whitespace collapse.
/// Multi dimension: each header row is forward-filled left to right (a
/// merged header cell stores its label only in the leftmost column), then
/// each column's label is the ordered composite of its per-dimension
/// values - lower-cased, whitespace replaced by the separator - with the
/// title-case originals retained for display.
///
/// # Errors
///
/// [`ShapeError::HeaderRows`] when fewer header rows are available than
/// dimensions declared; [`ShapeError::BlankHeaderCell`] when a row starts
/// blank and there is nothing to fill from.
pub fn resolve_headers(
    header_rows: &[&[RawValue]],
    spec: &HeaderSpec,
) -> Result<Vec<ColumnLabel>, ShapeError> {
    if spec.dimensions.is_empty() {
        return Err(ShapeError::MissingDimensions);
    }
    if header_rows.len() < spec.rows() {
        return Err(ShapeError::HeaderRows {
            expected: spec.rows(),
            observed: header_rows.len(),
        });
    }
    let width = header_rows.first().map(|row| row.len()).unwrap_or(0);
    let single = spec.rows() == 1;

    // One filled label row per dimension
    let mut filled: Vec<Vec<String>> = Vec::with_capacity(spec.rows());
    for (dimension, row) in spec.dimensions.iter().zip(header_rows) {
        let mut labels: Vec<String> = Vec::with_capacity(width);
        for cell in row.iter() {
            match cell.label_text() {
                Some(text) => labels.push(collapse_whitespace(&text)),
                None => match labels.last() {
                    Some(previous) => labels.push(previous.to_owned()),
                    None => {
                        return Err(ShapeError::BlankHeaderCell {
                            dimension: dimension.to_owned(),
                        })
                    }
                },
            }
        }
        filled.push(labels);
    }

    Ok((0..width)
        .map(|column| {
            let titles: Vec<String> = filled.iter().map(|row| row[column].to_owned()).collect();
            let parts: Vec<String> = if single {
                titles.to_owned()
            } else {
                titles
                    .iter()
                    .map(|title| normalize_part(title, spec.separator))
                    .collect()
            };
            let key = parts.join(&spec.separator.to_string());
            ColumnLabel { parts, titles, key }
        })
        .collect())
}

/// Splits a composite key back into its per-dimension values.
///
/// Splits from the left into exactly as many pieces as the spec declares
/// dimensions, so only non-final dimensions must be separator-free - the
/// final dimension may itself contain the separator ("2021-22" +
/// "residential_premises").
pub fn split_key(key: &str, spec: &HeaderSpec) -> Vec<String> {
    key.splitn(spec.rows(), spec.separator)
        .map(str::to_owned)
        .collect()
}

/// Collapses runs of whitespace to single spaces and trims the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-cases a label and replaces its whitespace with the separator.
fn normalize_part(title: &str, separator: char) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}
