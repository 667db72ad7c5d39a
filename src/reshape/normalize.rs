//! Cell normalization: noisy numeric cells to numeric-or-missing values.

use crate::spreadsheet::block::RawValue;
use crate::table::Datum;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Disclosure-control suppression markers: small counts published as an
/// inequality ("≤ 3", "<= 3", "< 3") to protect privacy.
static SUPPRESSION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:≤|<=|<)\s*(\d+(?:\.\d+)?)\s*$").expect("Hardcode regex pattern"));

/// Normalizes a raw cell to a numeric-or-missing datum.
///
/// Statistical tables carry footnote markers, dashes, currency symbols and
/// thousands separators in numeric columns; all of that is noise to be
/// tolerated, never an error. A blank cell is `Missing`, not zero.
///
/// Suppression markers normalize to their numeric ceiling ("≤ 3" becomes
/// 3) - the source agency's convention, preserved exactly because it
/// affects published totals.
pub fn normalize(raw: &RawValue) -> Datum {
    match raw {
        RawValue::Empty => Datum::Missing,
        RawValue::Number(value) => Datum::Number(*value),
        RawValue::Error(_) => Datum::Missing,
        RawValue::Text(text) => normalize_text(text),
    }
}

fn normalize_text(text: &str) -> Datum {
    if let Some(captures) = SUPPRESSION_MARKER.captures(text) {
        if let Ok(ceiling) = captures[1].parse::<f64>() {
            return Datum::Number(ceiling);
        }
    }
    let stripped: String = text
        .chars()
        .filter(|character| character.is_ascii_digit() || *character == '.')
        .collect();
    match stripped.parse::<f64>() {
        Ok(value) => Datum::Number(value),
        Err(_) => {
            if !text.trim().is_empty() {
                debug!(cell = text, "non-numeric cell normalized to missing");
            }
            Datum::Missing
        }
    }
}
