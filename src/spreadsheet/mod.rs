//! # Workbook Access Module
//!
//! Concrete "spreadsheet reader" capability for the reshaping engine: opens
//! Excel (.xlsx, .xlsm, .xlsb, .xls) and OpenDocument (.ods) workbooks and
//! cuts rectangular ranges of raw cell values out of named sheets. The
//! engine's other modules never touch workbook files; everything downstream
//! of [`Spreadsheet::read_range`] works on [`RawBlock`] values.

pub mod block;
pub mod range;

use crate::error::TidySheetError;
use crate::spreadsheet::block::{RawBlock, RawValue};
use crate::spreadsheet::range::{index_to_reference, Range};
use calamine::{open_workbook, Ods, OdsError, Reader, Xls, XlsError, Xlsb, XlsbError, Xlsx, XlsxError};
use glob::Pattern;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while opening workbooks or locating sheets and ranges.
///
/// Every variant names enough context (workbook, sheet, range) for the
/// caller to report which slide's extraction failed; a failure here never
/// affects other, independent extractions.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Error in Excel 2007+ format (.xlsx, .xlsm)
    #[error("Invalid xlsx file format: {0}")]
    InvalidXlsxFileFormat(#[from] XlsxError),

    /// Error in Excel Binary format (.xlsb)
    #[error("Invalid xlsb file format: {0}")]
    InvalidXlsbFileFormat(#[from] XlsbError),

    /// Error in legacy Excel format (.xls)
    #[error("Invalid xls file format: {0}")]
    InvalidXlsFileFormat(#[from] XlsError),

    /// Error in OpenDocument format (.ods)
    #[error("Invalid ods file format: {0}")]
    InvalidOdsFileFormat(#[from] OdsError),

    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{name}'")]
    InvalidFileFormat { name: String },

    /// Sheet name pattern does not compile as a glob
    #[error("Invalid sheet name pattern '{pattern}': {source}")]
    InvalidSheetPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// No sheet matches the requested name or pattern
    #[error("Sheet '{sheet}' not found in '{workbook}'")]
    SheetNotFound { workbook: String, sheet: String },

    /// Sheet exists but contains no data
    #[error("Sheet '{sheet}' in '{workbook}' is empty")]
    EmptySheet { workbook: String, sheet: String },

    /// Requested range reaches outside the sheet's populated area
    #[error("Range '{range}' is outside the data on sheet '{sheet}' (data covers {observed})")]
    RangeOutOfBounds {
        sheet: String,
        range: String,
        observed: String,
    },
}

/// Type alias for buffered file reader
pub type FileReader = BufReader<File>;

/// Format-specific reader, dispatched on file extension.
enum Format {
    /// Excel 2007+ format reader (.xlsx, .xlsm)
    Xlsx(Xlsx<FileReader>),
    /// Excel Binary format reader (.xlsb)
    Xlsb(Xlsb<FileReader>),
    /// Legacy Excel format reader (.xls)
    Xls(Xls<FileReader>),
    /// OpenDocument format reader (.ods)
    Ods(Ods<FileReader>),
}

/// An open workbook, able to cut rectangular ranges out of its sheets.
pub struct Spreadsheet {
    /// Workbook file name, kept for error context
    name: String,
    /// Underlying format-specific reader
    format: Format,
}

impl Spreadsheet {
    /// Opens a workbook file, detecting the format from the file extension.
    ///
    /// Supported formats:
    /// - `.xlsx`, `.xlsm` - Excel 2007+ format
    /// - `.xlsb` - Excel Binary format
    /// - `.xls` - Legacy Excel format
    /// - `.ods` - OpenDocument format
    pub fn open<P>(path: P) -> Result<Spreadsheet, SourceError>
    where
        P: AsRef<Path>,
    {
        let name = path.as_ref().to_string_lossy().to_string();
        let format = match path.as_ref().extension().and_then(OsStr::to_str) {
            Some("xlsx") | Some("xlsm") => Format::Xlsx(open_workbook(&path)?),
            Some("xlsb") => Format::Xlsb(open_workbook(&path)?),
            Some("xls") => Format::Xls(open_workbook(&path)?),
            Some("ods") => Format::Ods(open_workbook(&path)?),
            _ => return Err(SourceError::InvalidFileFormat { name }),
        };
        Ok(Spreadsheet { name, format })
    }

    /// Workbook file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of all sheets in the workbook, in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        match &self.format {
            Format::Xlsx(xlsx) => xlsx.sheet_names(),
            Format::Xlsb(xlsb) => xlsb.sheet_names(),
            Format::Xls(xls) => xls.sheet_names(),
            Format::Ods(ods) => ods.sheet_names(),
        }
    }

    /// Resolves a sheet name or glob pattern to an actual sheet name.
    ///
    /// An exact match wins; otherwise the request is compiled as a glob
    /// pattern and the first matching sheet (in workbook order) is used.
    /// Agency workbooks pad or rename sheet titles between annual releases,
    /// so schemas usually declare patterns like `"Table 1*"`.
    fn resolve_sheet(&self, request: &str) -> Result<String, SourceError> {
        let names = self.sheet_names();
        if let Some(name) = names.iter().find(|name| name.as_str() == request) {
            return Ok(name.to_owned());
        }
        let pattern = Pattern::new(request).map_err(|source| SourceError::InvalidSheetPattern {
            pattern: request.to_owned(),
            source,
        })?;
        names
            .into_iter()
            .find(|name| pattern.matches(name))
            .ok_or_else(|| SourceError::SheetNotFound {
                workbook: self.name.to_owned(),
                sheet: request.to_owned(),
            })
    }

    /// Loads the populated cell range of a sheet.
    fn worksheet(&mut self, sheet: &str) -> Result<calamine::Range<calamine::Data>, SourceError> {
        Ok(match &mut self.format {
            Format::Xlsx(xlsx) => xlsx.worksheet_range(sheet)?,
            Format::Xlsb(xlsb) => xlsb.worksheet_range(sheet)?,
            Format::Xls(xls) => xls.worksheet_range(sheet)?,
            Format::Ods(ods) => ods.worksheet_range(sheet)?,
        })
    }

    /// Cuts a rectangular block of raw cells out of a sheet.
    ///
    /// `sheet` is a name or glob pattern; `address` is an Excel-style range
    /// ("B15:I93"). The returned block is rectangular with empty cells
    /// materialized, and remembers its origin for error coordinates.
    ///
    /// # Errors
    ///
    /// Fails with a [`SourceError`] if the sheet cannot be found, is empty,
    /// or the requested range reaches outside the sheet's populated area.
    pub fn read_range(&mut self, sheet: &str, address: &str) -> Result<RawBlock, TidySheetError> {
        let name = self.resolve_sheet(sheet)?;
        let range = Range::try_from(address)?;
        let data = self.worksheet(&name)?;
        let (start, end) = data
            .start()
            .zip(data.end())
            .ok_or_else(|| SourceError::EmptySheet {
                workbook: self.name.to_owned(),
                sheet: name.to_owned(),
            })?;
        let (start, end) = (
            (start.0 as usize, start.1 as usize),
            (end.0 as usize, end.1 as usize),
        );
        if range.row_lower_bound < start.0
            || range.col_lower_bound < start.1
            || range.row_upper_bound > end.0
            || range.col_upper_bound > end.1
        {
            return Err(SourceError::RangeOutOfBounds {
                sheet: name,
                range: address.to_owned(),
                observed: format!(
                    "{}:{}",
                    index_to_reference(start.0, start.1),
                    index_to_reference(end.0, end.1)
                ),
            }
            .into());
        }
        let rows = (range.row_lower_bound..=range.row_upper_bound)
            .map(|row| {
                (range.col_lower_bound..=range.col_upper_bound)
                    .map(|col| {
                        data.get_value((row as u32, col as u32))
                            .map(RawValue::from)
                            .unwrap_or(RawValue::Empty)
                    })
                    .collect()
            })
            .collect();
        debug!(
            workbook = self.name.as_str(),
            sheet = name.as_str(),
            range = address,
            rows = range.height(),
            columns = range.width(),
            "range read"
        );
        Ok(RawBlock::new(
            name,
            (range.row_lower_bound, range.col_lower_bound),
            rows,
        )?)
    }
}
