use thiserror::Error;

/// Main error type for the tidy sheet engine.
/// Aggregates errors from workbook access, reshaping, and table algebra,
/// so callers handle one type while each module keeps its own variants.
#[derive(Error, Debug)]
pub enum TidySheetError {
    #[error("{0}")]
    WithContextError(String),

    // Workbook access errors
    #[error("{0}")]
    SourceError(#[from] crate::spreadsheet::SourceError),

    #[error("{0}")]
    RangeError(#[from] crate::spreadsheet::range::RangeError),

    #[error("{0}")]
    BlockError(#[from] crate::spreadsheet::block::BlockError),

    // Reshaping errors
    #[error("{0}")]
    ShapeError(#[from] crate::reshape::ShapeError),

    #[error("{0}")]
    ValueError(#[from] crate::reshape::ValueError),

    // Table algebra errors
    #[error("{0}")]
    JoinError(#[from] crate::table::join::JoinError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, TidySheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| TidySheetError::WithContextError(format!("{}: {}", message, e)))
    }
}
