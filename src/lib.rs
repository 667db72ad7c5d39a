//! # Tidy Sheet
//!
//! A tabular extraction and normalization engine for semi-structured
//! spreadsheet regions. Government statistical workbooks publish tables
//! with multi-row headers, merged grouping cells, and noisy numeric
//! columns; this crate reshapes such ranges into tidy long-format tables
//! ready for charting.
//!
//! ## Features
//!
//! - **Multi-format workbooks**: Excel (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`)
//!   and OpenDocument (`.ods`) files via a single reader
//! - **Declarative schemas**: each extraction is a plain data object
//!   (sheet, range, header dimensions, group columns, value names)
//! - **Multi-row headers**: merged header cells forward-filled and
//!   composed into splittable per-dimension labels
//! - **Hierarchical row labels**: merged grouping cells propagated down
//!   to every observation
//! - **Noise-tolerant numbers**: thousands separators, currency symbols,
//!   footnote markers and disclosure-control suppression markers
//!   normalized to numeric-or-missing values
//! - **Table algebra**: left joins and grouped sum/mean/count with
//!   missing-aware semantics
//!
//! Tables are immutable once constructed and are produced all-or-nothing;
//! a failure in one extraction never affects another.

pub mod error;
pub mod extract;
pub mod reshape;
pub mod spreadsheet;
pub mod table;

pub use crate::error::TidySheetError;
pub use crate::extract::{extract, TableSchema};
pub use crate::reshape::header::{resolve_headers, split_key, ColumnLabel, HeaderSpec};
pub use crate::reshape::normalize::normalize;
pub use crate::reshape::reshaper::{reshape, ValueSpec};
pub use crate::reshape::{ShapeError, ValueError};
pub use crate::spreadsheet::block::{RawBlock, RawValue};
pub use crate::spreadsheet::{SourceError, Spreadsheet};
pub use crate::table::join::{aggregate, join, AggregateOp, JoinError};
pub use crate::table::{Datum, TidyRow, TidyTable};
