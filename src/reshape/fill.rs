//! Hierarchical fill: merged-cell grouping labels propagated down rows.

use crate::reshape::ShapeError;

/// Fills blank group cells from the nearest non-blank value above.
///
/// `rows` holds the leading group cells of each data row, one entry per
/// declared group column (`None` for blank). This reproduces Excel's
/// merged-cell visual grouping - a "Police Region" shown once over many
/// "Local Government Area" rows - as an explicit per-row value.
///
/// Non-blank cells are never altered. The first row of every group column
/// must be non-blank; the source tables guarantee a value there, so a
/// blank means the declared schema does not match the sheet.
pub fn fill_down(
    rows: &mut [Vec<Option<String>>],
    group_columns: &[String],
) -> Result<(), ShapeError> {
    for (column, name) in group_columns.iter().enumerate() {
        let mut current: Option<String> = None;
        for row in rows.iter_mut() {
            match &row[column] {
                Some(value) => current = Some(value.to_owned()),
                None => match &current {
                    Some(value) => row[column] = Some(value.to_owned()),
                    None => {
                        return Err(ShapeError::BlankGroupCell {
                            column: name.to_owned(),
                        })
                    }
                },
            }
        }
    }
    Ok(())
}
