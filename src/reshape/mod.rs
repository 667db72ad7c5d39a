//! # Reshaping Module
//!
//! The engine core: turns a raw rectangular block of cells into a tidy
//! long-format table. Four cooperating parts, leaves first:
//!
//! - [`normalize`]: noisy numeric cells to numeric-or-missing values
//! - [`header`]: multi-row header blocks to composite column labels
//! - [`fill`]: merged-cell grouping labels propagated down their columns
//! - [`reshaper`]: the orchestrator combining the three and melting wide
//!   columns into one row per observation
//!
//! Reshaping is all-or-nothing per table: any invariant violation aborts
//! the whole construction and no partial table is ever returned.

pub mod fill;
pub mod header;
pub mod normalize;
pub mod reshaper;

use thiserror::Error;

/// A mismatch between the declared extraction schema and the actual
/// spreadsheet layout. Never retried; always reports expected vs. observed.
#[derive(Error, Debug)]
pub enum ShapeError {
    /// Header declared without any dimension
    #[error("Header spec declares no dimensions")]
    MissingDimensions,

    /// Fewer header rows in the block than declared dimensions
    #[error("Expected {expected} header rows, found {observed}")]
    HeaderRows { expected: usize, observed: usize },

    /// Blank header cell with no value to its left to fill from
    #[error("Blank header cell in dimension '{dimension}' with nothing to fill from")]
    BlankHeaderCell { dimension: String },

    /// More group columns declared than the block has columns
    #[error("Declared {declared} group columns but the block is only {width} columns wide")]
    GroupColumns { declared: usize, width: usize },

    /// Blank first cell in a group column, so the fill has no seed value
    #[error("Blank first cell in group column '{column}'")]
    BlankGroupCell { column: String },

    /// Declared value column names disagree with the resolved columns
    #[error("Expected {expected} value column names to match the resolved columns, got {observed}")]
    ValueColumns { expected: usize, observed: usize },

    /// Two observations reshaped to the same key tuple
    #[error("Duplicate key tuple [{keys}] after reshaping")]
    DuplicateKeys { keys: String },
}

/// A non-normalizable cell in a position where normalization is disallowed,
/// reported with its real worksheet coordinates.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("Invalid cell value at '{position}': {message}")]
    InvalidCell { position: String, message: String },
}
